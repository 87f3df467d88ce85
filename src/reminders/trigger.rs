use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::definition::ReminderDefinition;

/// Days every reminder repeats on.
pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// A weekly recurring alarm for a single weekday, as understood by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerTrigger {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
}

/// Expand a reminder into one trigger per weekday.
///
/// Incomplete reminders (empty title, unparseable or out-of-range time)
/// are skipped and yield no triggers.
pub fn expand(reminder: &ReminderDefinition) -> Vec<SchedulerTrigger> {
    if !reminder.has_title() {
        return Vec::new();
    }
    let Some((hour, minute)) = reminder.time_of_day() else {
        return Vec::new();
    };

    WEEKDAYS
        .iter()
        .map(|&weekday| SchedulerTrigger {
            title: reminder.title.clone(),
            body: reminder.body.clone(),
            hour,
            minute,
            weekday,
        })
        .collect()
}

/// Expand every reminder in list order into one flat sequence.
pub fn expand_all(reminders: &[ReminderDefinition]) -> Vec<SchedulerTrigger> {
    reminders.iter().flat_map(expand).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

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
    fn valid_reminder_expands_to_each_weekday_once() {
        let mut r = reminder("Vitamins", "14", "0");
        r.body = Some("with water".to_string());

        let triggers = expand(&r);
        assert_eq!(triggers.len(), 5);

        let days: HashSet<Weekday> = triggers.iter().map(|t| t.weekday).collect();
        assert_eq!(days, WEEKDAYS.into_iter().collect());

        for t in &triggers {
            assert_eq!(t.title, "Vitamins");
            assert_eq!(t.body.as_deref(), Some("with water"));
            assert_eq!((t.hour, t.minute), (14, 0));
        }
    }

    #[test]
    fn weekend_days_are_never_produced() {
        for t in expand(&reminder("Stretch", "8", "30")) {
            assert!(!matches!(t.weekday, Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn every_valid_time_expands() {
        for hour in 0..24 {
            for minute in [0, 1, 30, 59] {
                let r = reminder("x", &hour.to_string(), &minute.to_string());
                assert_eq!(expand(&r).len(), 5, "{}:{}", hour, minute);
            }
        }
    }

    #[test]
    fn incomplete_reminders_are_skipped() {
        let cases = [
            reminder("", "9", "0"),
            reminder("Walk", "", ""),
            reminder("Walk", "9", ""),
            reminder("Walk", "24", "0"),
            reminder("Walk", "9", "60"),
            reminder("Walk", "nine", "0"),
            reminder("Walk", "9", "-5"),
        ];
        for r in &cases {
            assert!(expand(r).is_empty(), "{:?}", r);
        }
    }

    #[test]
    fn expand_all_concatenates_in_list_order() {
        let list = vec![
            reminder("Vitamins", "14", "0"),
            reminder("", "9", "0"),
            reminder("Call Mom", "15", "0"),
        ];
        let triggers = expand_all(&list);
        assert_eq!(triggers.len(), 10);
        assert!(triggers[..5].iter().all(|t| t.title == "Vitamins"));
        assert!(triggers[5..].iter().all(|t| t.title == "Call Mom"));
    }
}
