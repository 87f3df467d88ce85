use super::definition::{ReminderDefinition, ReminderList};

/// The working copy of the reminder list the user edits, alongside the
/// last copy that was synced.
///
/// Every edit builds a new list, so snapshots handed out earlier never
/// change underneath their holders.
#[derive(Debug, Clone, Default)]
pub struct ReminderListModel {
    working: ReminderList,
    synced: ReminderList,
}

impl ReminderListModel {
    /// Seed from the persisted list, which is by definition in sync.
    pub fn new(loaded: ReminderList) -> Self {
        Self {
            working: loaded.clone(),
            synced: loaded,
        }
    }

    pub fn reminders(&self) -> &[ReminderDefinition] {
        &self.working
    }

    pub fn get(&self, id: &str) -> Option<&ReminderDefinition> {
        self.working.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn snapshot(&self) -> ReminderList {
        self.working.clone()
    }

    /// Append a blank reminder and return its id.
    pub fn add(&mut self) -> String {
        let reminder = ReminderDefinition::new();
        let id = reminder.id.clone();
        self.working = self
            .working
            .iter()
            .cloned()
            .chain(std::iter::once(reminder))
            .collect();
        id
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.working = self
            .working
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        true
    }

    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        self.replace(id, |r| r.title = title.to_string())
    }

    /// An empty body clears it.
    pub fn set_body(&mut self, id: &str, body: &str) -> bool {
        self.replace(id, |r| {
            r.body = if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            }
        })
    }

    /// Store the raw text; validation happens at expansion time.
    pub fn set_time(&mut self, id: &str, hour: &str, minute: &str) -> bool {
        self.replace(id, |r| {
            r.hour = hour.to_string();
            r.minute = minute.to_string();
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.synced
    }

    /// Record the list a successful sync committed.
    pub fn mark_synced(&mut self, committed: ReminderList) {
        self.synced = committed;
    }

    /// Drop unsaved edits.
    pub fn revert(&mut self) {
        self.working = self.synced.clone();
    }

    fn replace(&mut self, id: &str, edit: impl FnOnce(&mut ReminderDefinition)) -> bool {
        let Some(index) = self.working.iter().position(|r| r.id == id) else {
            return false;
        };
        let mut updated = self.working[index].clone();
        edit(&mut updated);

        let mut next = self.working.clone();
        next[index] = updated;
        self.working = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(model: &ReminderListModel) -> Vec<String> {
        model.reminders().iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn add_appends_blank_reminders() {
        let mut model = ReminderListModel::default();
        let a = model.add();
        let b = model.add();
        assert_eq!(ids(&model), vec![a.clone(), b]);

        let first = model.get(&a).unwrap();
        assert!(first.title.is_empty() && first.hour.is_empty() && first.minute.is_empty());
    }

    #[test]
    fn edits_apply_to_one_reminder_and_keep_order() {
        let mut model = ReminderListModel::default();
        let a = model.add();
        let b = model.add();
        let c = model.add();

        assert!(model.set_title(&b, "Vitamins"));
        assert!(model.set_time(&b, "14", "0"));
        assert!(model.set_body(&b, "with water"));

        assert_eq!(ids(&model), vec![a.clone(), b.clone(), c]);
        let edited = model.get(&b).unwrap();
        assert_eq!(edited.title, "Vitamins");
        assert_eq!((edited.hour.as_str(), edited.minute.as_str()), ("14", "0"));
        assert_eq!(edited.body.as_deref(), Some("with water"));
        assert!(model.get(&a).unwrap().title.is_empty());

        assert!(model.set_body(&b, ""));
        assert_eq!(model.get(&b).unwrap().body, None);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut model = ReminderListModel::default();
        let a = model.add();
        let b = model.add();
        let c = model.add();

        assert!(model.remove(&b));
        assert_eq!(ids(&model), vec![a, c]);
        assert!(!model.remove(&b));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut model = ReminderListModel::default();
        model.add();
        let before = model.snapshot();
        assert!(!model.set_title("missing", "x"));
        assert!(!model.set_time("missing", "1", "2"));
        assert_eq!(model.snapshot(), before);
    }

    #[test]
    fn snapshots_do_not_see_later_edits() {
        let mut model = ReminderListModel::default();
        let id = model.add();
        let snapshot = model.snapshot();
        model.set_title(&id, "Later");
        assert!(snapshot[0].title.is_empty());
    }

    #[test]
    fn dirty_tracks_distance_from_last_sync() {
        let mut model = ReminderListModel::new(Vec::new());
        assert!(!model.is_dirty());

        let id = model.add();
        model.set_title(&id, "Vitamins");
        assert!(model.is_dirty());

        model.mark_synced(model.snapshot());
        assert!(!model.is_dirty());

        model.set_time(&id, "9", "0");
        assert!(model.is_dirty());
        model.revert();
        assert!(!model.is_dirty());
        assert!(model.get(&id).unwrap().hour.is_empty());
    }

    #[test]
    fn invalid_time_text_is_kept_verbatim() {
        let mut model = ReminderListModel::default();
        let id = model.add();
        model.set_time(&id, "99", "ab");
        let r = model.get(&id).unwrap();
        assert_eq!((r.hour.as_str(), r.minute.as_str()), ("99", "ab"));
    }
}
