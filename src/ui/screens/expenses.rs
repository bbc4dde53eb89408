use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::format::format_amount;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

/// Expense table shared by Home and Stats. The cursor row is highlighted.
pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, title: &str) {
    let expenses = &app.state.expenses;

    if expenses.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("Chưa có giao dịch nào", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Press n to add one, or :add <amount> <category> [note]",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(format!(" {title} (0) "), theme::title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Category", "Note", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, expense)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let category = Span::styled(
                format!("{} {}", expense.category.icon(), expense.category.label()),
                Style::default().fg(theme::category_color(expense.category)),
            );

            Row::new(vec![
                Cell::from(format!("  {}", expense.date.format("%d/%m/%Y"))),
                Cell::from(category),
                Cell::from(truncate(&expense.note, 40)),
                Cell::from(Span::styled(
                    format!("-{}đ", format_amount(expense.amount)),
                    theme::expense_style(),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Min(16),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {title} ({}) ", expenses.len()),
                theme::title_style(),
            )),
    );

    f.render_widget(table, area);
}
