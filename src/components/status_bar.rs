use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let w = area.width as usize;

        let mut left = match app.input_mode() {
            InputMode::Prompt => " [Permission]".to_string(),
            InputMode::Form => " [Edit]".to_string(),
            InputMode::Normal => String::new(),
        };
        if app.is_saving() {
            left.push_str(" Saving...");
        } else if app.model.is_dirty() {
            left.push_str(" [modified]");
        }
        if app.notices.badge > 0 {
            left.push_str(&format!(" ({} new)", app.notices.badge));
        }
        left.push(' ');

        // Show status message if present, otherwise show key hints
        let right = if let Some(ref msg) = app.status_message {
            format!(" {} ", msg)
        } else if w >= 70 {
            " jk:Nav n:New e:Edit d:Del s:Save u:Undo q:Quit ".to_string()
        } else if w >= 40 {
            " n:New e:Edit s:Save q:Quit ".to_string()
        } else {
            " q:Quit ".to_string()
        };

        let padding = " ".repeat(w.saturating_sub(left.chars().count() + right.chars().count()));

        let line = Line::from(vec![
            Span::styled(left, theme::STATUS_STYLE),
            Span::styled(padding, theme::STATUS_STYLE),
            Span::styled(right, theme::STATUS_STYLE),
        ]);

        let bar = Paragraph::new(line).style(theme::STATUS_STYLE);
        frame.render_widget(bar, area);
    }
}
