use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::reminders::ReminderDefinition;
use crate::theme;

pub struct ReminderList;

impl ReminderList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        reminders: &[ReminderDefinition],
        selected_index: usize,
        dirty: bool,
    ) {
        let w = area.width as usize;

        let marker = if dirty { "*" } else { "" };
        let title = if w >= 25 {
            format!(" Weekday Reminders ({}){} ", reminders.len(), marker)
        } else {
            format!(" Reminders{} ", marker)
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        if reminders.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No reminders. Press 'n' to add one.").style(theme::DIM_STYLE);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = reminders
            .iter()
            .enumerate()
            .map(|(i, reminder)| format_reminder(reminder, i == selected_index, inner_w))
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_reminder(
    reminder: &ReminderDefinition,
    is_selected: bool,
    max_width: usize,
) -> ListItem<'static> {
    let complete = reminder.is_complete();

    let time_style = if is_selected {
        theme::SELECTED_STYLE
    } else if complete {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        theme::DIM_STYLE
    };
    let title_style = if is_selected {
        theme::SELECTED_STYLE
    } else if complete {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let title = if reminder.has_title() {
        reminder.title.clone()
    } else {
        "(untitled)".to_string()
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", reminder.time_display()), time_style),
        Span::styled(" ", Style::default()),
        Span::styled(truncate(&title, max_width.saturating_sub(10)), title_style),
    ];

    let used: usize = spans.iter().map(|s| s.width()).sum();
    if let Some(ref body) = reminder.body {
        if used + 3 + body.chars().count() <= max_width {
            spans.push(Span::styled(format!(" - {}", body), theme::DIM_STYLE));
        }
    }
    if !complete {
        spans.push(Span::styled(" [incomplete]", theme::WARN_STYLE));
    }

    ListItem::new(Line::from(spans))
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        s.to_string()
    } else if max > 3 {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.chars().take(max).collect()
    }
}
