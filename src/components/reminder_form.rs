use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::reminders::ReminderDefinition;
use crate::theme;

/// Time fields take at most two digits, like a clock face.
const TIME_FIELD_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Body,
    Hour,
    Minute,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Hour,
            FormField::Hour => FormField::Minute,
            FormField::Minute => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Minute,
            FormField::Body => FormField::Title,
            FormField::Hour => FormField::Body,
            FormField::Minute => FormField::Hour,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderFormState {
    pub id: String,
    pub title: String,
    pub body: String,
    pub hour: String,
    pub minute: String,
    pub active_field: FormField,
}

impl ReminderFormState {
    pub fn edit(reminder: &ReminderDefinition) -> Self {
        Self {
            id: reminder.id.clone(),
            title: reminder.title.clone(),
            body: reminder.body.clone().unwrap_or_default(),
            hour: reminder.hour.clone(),
            minute: reminder.minute.clone(),
            active_field: FormField::Title,
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Title => self.title.push(c),
            FormField::Body => self.body.push(c),
            FormField::Hour => push_digit(&mut self.hour, c),
            FormField::Minute => push_digit(&mut self.minute, c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Title => { self.title.pop(); }
            FormField::Body => { self.body.pop(); }
            FormField::Hour => { self.hour.pop(); }
            FormField::Minute => { self.minute.pop(); }
        }
    }

    /// Preview of the edited reminder, for validity hints.
    pub fn preview(&self) -> ReminderDefinition {
        ReminderDefinition {
            id: self.id.clone(),
            title: self.title.clone(),
            body: (!self.body.is_empty()).then(|| self.body.clone()),
            hour: self.hour.clone(),
            minute: self.minute.clone(),
        }
    }
}

fn push_digit(field: &mut String, c: char) {
    if c.is_ascii_digit() && field.len() < TIME_FIELD_LEN {
        field.push(c);
    }
}

pub struct ReminderForm;

impl ReminderForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &ReminderFormState) {
        let form_w = area.width.min(50).max(30);
        let form_h = area.height.min(11).max(9);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" Reminder ")
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // body
            Constraint::Length(1), // hour
            Constraint::Length(1), // minute
            Constraint::Length(1), // validity
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let fields = [
            ("Title:", &state.title, FormField::Title),
            ("Body:", &state.body, FormField::Body),
            ("Hour:", &state.hour, FormField::Hour),
            ("Min:", &state.minute, FormField::Minute),
        ];
        for (row, (label, value, field)) in rows.iter().zip(fields) {
            render_field(frame, *row, label, value, state.active_field == field);
        }

        let preview = state.preview();
        let validity = if preview.is_complete() {
            Span::styled(
                format!("Weekdays at {}", preview.time_display()),
                theme::OK_STYLE,
            )
        } else {
            Span::styled("Incomplete: will not be scheduled", theme::WARN_STYLE)
        };
        frame.render_widget(Paragraph::new(Line::from(validity)), rows[4]);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::DIM_STYLE),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Apply ", theme::DIM_STYLE),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::DIM_STYLE),
        ]);
        frame.render_widget(Paragraph::new(help), rows[6]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };
    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(format!("{:<7}", label), theme::DIM_STYLE),
        Span::styled(format!("{}{}", value, cursor), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
