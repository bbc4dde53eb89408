use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::analytics;
use crate::format::format_vnd;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{progress_bar, truncate};

/// One row per category plus borders.
pub(crate) const BREAKDOWN_HEIGHT: u16 = 8;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BREAKDOWN_HEIGHT), Constraint::Min(4)])
        .split(area);

    render_breakdown(f, chunks[0], app);
    super::expenses::render(f, chunks[1], app, "Lịch sử chi tiêu");
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Phân loại chi tiêu ", theme::title_style()));

    if app.breakdown.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "Nothing spent yet",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    // label(18) + amount(16) + " nn%"; the bar takes what is left
    let bar_width = area.width.saturating_sub(2 + 18 + 16 + 5 + 2) as usize;

    let items: Vec<ListItem> = app
        .breakdown
        .iter()
        .map(|row| {
            let share = analytics::category_share(row.total, app.total);
            let color = theme::category_color(row.category);
            let label = format!("{} {}", row.category.icon(), row.category.label());
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&label, 17)), theme::normal_style()),
                Span::styled(format!("{:>15} ", format_vnd(row.total)), theme::normal_style()),
                Span::styled(progress_bar(share, bar_width), Style::default().fg(color)),
                Span::styled(
                    format!(" {share:>3}%"),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
