use std::sync::OnceLock;

use crate::config::NotificationConfig;
use crate::reminders::Delivery;

static PRESENTATION: OnceLock<NotificationConfig> = OnceLock::new();

/// Set how delivered reminders are shown. Only the first call has effect.
pub fn init(config: NotificationConfig) {
    let _ = PRESENTATION.set(config);
}

pub fn current() -> NotificationConfig {
    PRESENTATION.get().copied().unwrap_or_default()
}

/// UI state touched by delivered reminders.
#[derive(Debug, Default)]
pub struct Notices {
    pub alert: Option<Delivery>,
    /// Reminders delivered since the last alert was dismissed.
    pub badge: usize,
    /// Ring the terminal bell on the next frame.
    pub bell: bool,
}

impl Notices {
    pub fn present(&mut self, config: NotificationConfig, delivery: Delivery) {
        if config.set_badge {
            self.badge += 1;
        }
        if config.play_sound {
            self.bell = true;
        }
        if config.show_alert {
            self.alert = Some(delivery);
        }
    }

    pub fn dismiss(&mut self) {
        self.alert = None;
        self.badge = 0;
    }

    /// Whether to ring now. Clears the request.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::*;
    use crate::reminders::trigger::SchedulerTrigger;

    fn delivery(title: &str) -> Delivery {
        Delivery {
            trigger: SchedulerTrigger {
                title: title.to_string(),
                body: None,
                hour: 14,
                minute: 0,
                weekday: Weekday::Mon,
            },
            fired_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
        }
    }

    fn only(show_alert: bool, play_sound: bool, set_badge: bool) -> NotificationConfig {
        NotificationConfig {
            show_alert,
            play_sound,
            set_badge,
        }
    }

    #[test]
    fn alert_flag_shows_latest_delivery() {
        let mut notices = Notices::default();
        notices.present(only(true, false, false), delivery("first"));
        notices.present(only(true, false, false), delivery("second"));

        assert_eq!(notices.alert.as_ref().unwrap().trigger.title, "second");
        assert!(!notices.bell);
        assert_eq!(notices.badge, 0);
    }

    #[test]
    fn sound_flag_requests_one_bell() {
        let mut notices = Notices::default();
        notices.present(only(false, true, false), delivery("a"));

        assert!(notices.alert.is_none());
        assert!(notices.take_bell());
        assert!(!notices.take_bell());
    }

    #[test]
    fn badge_flag_counts_until_dismissed() {
        let mut notices = Notices::default();
        notices.present(only(false, false, true), delivery("a"));
        notices.present(only(false, false, true), delivery("b"));

        assert_eq!(notices.badge, 2);
        assert!(notices.alert.is_none());
        assert!(!notices.bell);

        notices.dismiss();
        assert_eq!(notices.badge, 0);
    }

    #[test]
    fn all_flags_off_leaves_no_trace() {
        let mut notices = Notices::default();
        notices.present(only(false, false, false), delivery("a"));

        assert!(notices.alert.is_none());
        assert!(!notices.bell);
        assert_eq!(notices.badge, 0);
    }
}
