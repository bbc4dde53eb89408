use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::analytics;
use crate::format::format_vnd;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::progress_bar;

pub(crate) const CARDS_HEIGHT: u16 = 6;
pub(crate) const ADVICE_HEIGHT: u16 = 8;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CARDS_HEIGHT),
            Constraint::Length(ADVICE_HEIGHT),
            Constraint::Min(4), // Recent expenses
        ])
        .split(area);

    render_cards(f, chunks[0], app);
    render_advice(f, chunks[1], app);
    super::expenses::render(f, chunks[2], app, "Giao dịch gần đây");
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let total = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_vnd(app.total),
            Style::default()
                .fg(theme::RED)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} giao dịch", app.state.expenses.len()),
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(card_block("Tổng chi tiêu"));
    f.render_widget(total, cards[0]);

    let budget = app.state.budget;
    let lines = if analytics::budget_is_configured(budget) {
        let color = theme::budget_color(app.utilization);
        let bar_width = cards[1].width.saturating_sub(12) as usize;
        vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    progress_bar(app.utilization, bar_width),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {}%", app.utilization),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("{} / {}", format_vnd(app.total), format_vnd(budget)),
                theme::dim_style(),
            )),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled("No budget set", theme::dim_style())),
            Line::from(Span::styled(
                "Use :budget <amount> to set one",
                theme::dim_style(),
            )),
        ]
    };
    let budget_card = Paragraph::new(lines)
        .centered()
        .block(card_block("Ngân sách"));
    f.render_widget(budget_card, cards[1]);
}

fn render_advice(f: &mut Frame, area: Rect, app: &App) {
    // The reply is free text and may span several lines
    let body = if app.advice.is_analyzing() {
        Text::styled("Đang phân tích…", theme::dim_style())
    } else {
        match &app.advice_text {
            Some(text) => Text::styled(text.as_str(), theme::normal_style()),
            None => Text::styled(
                "Press a to get spending advice from the AI assistant",
                theme::dim_style(),
            ),
        }
    };

    let panel = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(card_block("Trợ lý AI"));
    f.render_widget(panel, area);
}

fn card_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}
