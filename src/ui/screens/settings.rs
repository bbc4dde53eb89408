use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::analytics;
use crate::format::format_vnd;
use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Budget
            Constraint::Length(6), // Danger zone
            Constraint::Min(0),
        ])
        .split(area);

    render_budget(f, chunks[0], app);
    render_reset(f, chunks[1]);
}

fn render_budget(f: &mut Frame, area: Rect, app: &App) {
    let budget = app.state.budget;
    let remaining = analytics::remaining_budget(app.total, budget);
    let remaining_color = if remaining < 0 {
        theme::RED
    } else {
        theme::GREEN
    };

    let limit = if analytics::budget_is_configured(budget) {
        Span::styled(
            format_vnd(budget),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("not set", theme::dim_style())
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Hạn mức chi tiêu   ", theme::dim_style()),
            limit,
        ]),
        Line::from(vec![
            Span::styled("  Đã chi             ", theme::dim_style()),
            Span::styled(format_vnd(app.total), theme::expense_style()),
        ]),
        Line::from(vec![
            Span::styled("  Số dư an toàn      ", theme::dim_style()),
            Span::styled(
                format_vnd(remaining),
                Style::default()
                    .fg(remaining_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Change it with :budget <amount>",
            theme::dim_style(),
        )),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Ngân sách ", theme::title_style())),
    );
    f.render_widget(panel, area);
}

fn render_reset(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Xóa toàn bộ dữ liệu chi tiêu. The budget is kept.",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  Press R (or run :reset), then confirm with y",
            theme::dim_style(),
        )),
    ];
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::RED))
            .title(Span::styled(
                " Dữ liệu ",
                Style::default()
                    .fg(theme::RED)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(panel, area);
}
