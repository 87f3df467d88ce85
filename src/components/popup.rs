use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::reminders::Delivery;
use crate::theme;

fn centered(area: Rect, max_w: u16, max_h: u16) -> Rect {
    let popup_w = area.width.min(max_w).max(30.min(area.width));
    let popup_h = area.height.min(max_h).max(6.min(area.height));
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    Rect::new(x, y, popup_w, popup_h)
}

fn framed(frame: &mut Frame, area: Rect, title: &str, color: Color) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Ask whether reminders may show notifications.
pub fn render_permission_prompt(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 52, 8);
    let inner = framed(frame, popup, "Allow Notifications?", Color::Yellow);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from("Weekday reminders need permission to notify you."),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", key_style),
            Span::styled(" Allow    ", theme::DIM_STYLE),
            Span::styled("n", key_style),
            Span::styled(" Don't allow", theme::DIM_STYLE),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Show a reminder that came due.
pub fn render_alert(frame: &mut Frame, area: Rect, delivery: &Delivery) {
    let popup = centered(area, 50, 10);
    let inner = framed(frame, popup, &delivery.trigger.title, Color::Cyan);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("Time: ", theme::DIM_STYLE),
        Span::styled(
            format!(
                "{} {:02}:{:02}",
                delivery.trigger.weekday, delivery.trigger.hour, delivery.trigger.minute
            ),
            Style::default(),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Delivered: ", theme::DIM_STYLE),
        Span::styled(
            delivery.fired_at.format("%a %H:%M").to_string(),
            Style::default(),
        ),
    ]));
    if let Some(ref body) = delivery.trigger.body {
        lines.push(Line::from(""));
        for line in body.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", theme::DIM_STYLE)));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
