use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-authored reminder.
///
/// `hour` and `minute` hold the raw text the user typed. They are only
/// interpreted when the reminder is expanded into scheduler triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub hour: String,
    pub minute: String,
}

/// Ordered reminders. Order is presentation order only.
pub type ReminderList = Vec<ReminderDefinition>;

impl ReminderDefinition {
    /// A blank reminder with a fresh id, as created by the "add" action.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            body: None,
            hour: String::new(),
            minute: String::new(),
        }
    }

    /// Hour and minute if both parse and are in range.
    pub fn time_of_day(&self) -> Option<(u32, u32)> {
        let hour = parse_in_range(&self.hour, 23)?;
        let minute = parse_in_range(&self.minute, 59)?;
        Some((hour, minute))
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Whether this reminder will produce triggers when synced.
    pub fn is_complete(&self) -> bool {
        self.has_title() && self.time_of_day().is_some()
    }

    pub fn time_display(&self) -> String {
        match self.time_of_day() {
            Some((h, m)) => format!("{:02}:{:02}", h, m),
            None => "--:--".to_string(),
        }
    }
}

impl Default for ReminderDefinition {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_in_range(text: &str, max: u32) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|v| *v <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(title: &str, hour: &str, minute: &str) -> ReminderDefinition {
        ReminderDefinition {
            title: title.to_string(),
            hour: hour.to_string(),
            minute: minute.to_string(),
            ..ReminderDefinition::new()
        }
    }

    #[test]
    fn new_reminders_are_blank_with_unique_ids() {
        let a = ReminderDefinition::new();
        let b = ReminderDefinition::new();
        assert_ne!(a.id, b.id);
        assert!(a.title.is_empty());
        assert!(a.hour.is_empty() && a.minute.is_empty());
        assert_eq!(a.body, None);
        assert!(!a.is_complete());
    }

    #[test]
    fn time_of_day_accepts_bounds() {
        assert_eq!(reminder("x", "0", "0").time_of_day(), Some((0, 0)));
        assert_eq!(reminder("x", "23", "59").time_of_day(), Some((23, 59)));
        assert_eq!(reminder("x", " 7", "05 ").time_of_day(), Some((7, 5)));
    }

    #[test]
    fn time_of_day_rejects_bad_input() {
        assert_eq!(reminder("x", "24", "0").time_of_day(), None);
        assert_eq!(reminder("x", "12", "60").time_of_day(), None);
        assert_eq!(reminder("x", "", "30").time_of_day(), None);
        assert_eq!(reminder("x", "-1", "30").time_of_day(), None);
        assert_eq!(reminder("x", "1a", "30").time_of_day(), None);
    }

    #[test]
    fn time_display_pads_or_dashes() {
        assert_eq!(reminder("x", "9", "5").time_display(), "09:05");
        assert_eq!(reminder("x", "9", "").time_display(), "--:--");
    }

    #[test]
    fn whitespace_title_is_incomplete() {
        assert!(!reminder("   ", "9", "0").is_complete());
        assert!(reminder("Vitamins", "14", "0").is_complete());
    }
}
