use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::components::reminder_form::ReminderFormState;
use crate::config;
use crate::presentation::{self, Notices};
use crate::reminders::{
    scheduler, Committed, Delivery, FileKeyValueStore, KeyValueStore, LocalAuthorizer,
    LocalScheduler, PermissionGate, PermissionPrompt, ReminderList, ReminderListModel,
    ReminderStore, SyncEngine, SyncError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Prompt,
}

type SyncOutcome = (ReminderList, Result<Committed, SyncError>);

pub struct App {
    pub running: bool,
    pub model: ReminderListModel,
    pub selected: usize,
    pub form_state: Option<ReminderFormState>,
    pub status_message: Option<String>,
    pub notices: Notices,
    pending_prompt: Option<PermissionPrompt>,
    engine: Arc<SyncEngine>,
    runtime: Handle,
    in_flight: Option<oneshot::Receiver<SyncOutcome>>,
    prompts: mpsc::UnboundedReceiver<PermissionPrompt>,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
}

impl App {
    pub fn new(runtime: Handle) -> Result<Self> {
        let config = config::current();
        let data_dir = config.storage.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&data_dir));
        let (prompt_tx, prompts) = mpsc::unbounded_channel();
        let (delivery_tx, deliveries) = mpsc::unbounded_channel();

        let store = ReminderStore::new(kv.clone(), config.storage.key.clone());
        let authorizer = LocalAuthorizer::new(kv.clone(), config::AUTHORIZATION_KEY, prompt_tx);
        let local_scheduler = Arc::new(LocalScheduler::open(kv, config::SCHEDULED_KEY));
        let engine = SyncEngine::new(
            PermissionGate::new(Arc::new(authorizer)),
            local_scheduler.clone(),
            store.clone(),
        );

        {
            let _guard = runtime.enter();
            scheduler::spawn_delivery(
                local_scheduler,
                Duration::from_secs(config.sync.delivery_interval_secs.max(1)),
                delivery_tx,
            );
        }

        let model = ReminderListModel::new(store.load());
        info!(count = model.len(), data_dir = %data_dir.display(), "reminders loaded");

        let mut app = Self {
            running: true,
            model,
            selected: 0,
            form_state: None,
            status_message: None,
            notices: Notices::default(),
            pending_prompt: None,
            engine: Arc::new(engine),
            runtime,
            in_flight: None,
            prompts,
            deliveries,
        };

        if config.sync.resync_on_startup {
            info!("resyncing saved reminders on startup");
            app.save();
        }

        Ok(app)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.pending_prompt.is_some() {
            InputMode::Prompt
        } else if self.form_state.is_some() {
            InputMode::Form
        } else {
            InputMode::Normal
        }
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Pick up finished syncs, permission questions and due reminders.
    pub fn poll(&mut self) {
        if let Some(rx) = self.in_flight.as_mut() {
            match rx.try_recv() {
                Ok((snapshot, outcome)) => {
                    self.in_flight = None;
                    self.finish_save(snapshot, outcome);
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.in_flight = None;
                    warn!("sync task ended without a result");
                    self.status_message = Some("Save was interrupted".to_string());
                }
            }
        }

        while let Ok(prompt) = self.prompts.try_recv() {
            self.pending_prompt = Some(prompt);
        }

        while let Ok(delivery) = self.deliveries.try_recv() {
            self.notices.present(presentation::current(), delivery);
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.notices.dismiss();
    }

    pub fn answer_prompt(&mut self, allow: bool) {
        if let Some(prompt) = self.pending_prompt.take() {
            let _ = prompt.reply.send(allow);
        }
    }

    /// Sync the current working copy. Only one save runs at a time.
    pub fn save(&mut self) {
        if self.in_flight.is_some() {
            self.status_message = Some(SyncError::AlreadyRunning.to_string());
            return;
        }

        let snapshot = self.model.snapshot();
        let engine = self.engine.clone();
        let (tx, rx) = oneshot::channel();
        self.runtime.spawn(async move {
            let outcome = engine.sync(&snapshot).await;
            let _ = tx.send((snapshot, outcome));
        });
        self.in_flight = Some(rx);
        self.status_message = None;
    }

    fn finish_save(&mut self, snapshot: ReminderList, outcome: Result<Committed, SyncError>) {
        self.status_message = Some(match outcome {
            Ok(committed) => {
                self.model.mark_synced(snapshot);
                saved_message(&committed)
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                e.to_string()
            }
        });
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.model.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn selected_id(&self) -> Option<String> {
        self.model
            .reminders()
            .get(self.selected)
            .map(|r| r.id.clone())
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.model.len().saturating_sub(1));
    }

    pub fn add_reminder(&mut self) {
        self.model.add();
        self.selected = self.model.len() - 1;
        self.open_form();
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.model.remove(&id);
            self.clamp_selection();
            self.status_message = Some("Reminder removed (press s to save)".to_string());
        }
    }

    pub fn revert(&mut self) {
        if self.model.is_dirty() {
            self.model.revert();
            self.clamp_selection();
            self.status_message = Some("Unsaved changes discarded".to_string());
        }
    }

    pub fn open_form(&mut self) {
        if let Some(reminder) = self.model.reminders().get(self.selected) {
            self.form_state = Some(ReminderFormState::edit(reminder));
        }
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
    }

    pub fn submit_form(&mut self) {
        if let Some(form) = self.form_state.take() {
            self.model.set_title(&form.id, &form.title);
            self.model.set_body(&form.id, &form.body);
            self.model.set_time(&form.id, &form.hour, &form.minute);
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut f) = self.form_state {
            f.active_field = f.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut f) = self.form_state {
            f.active_field = f.active_field.prev();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut f) = self.form_state {
            f.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut f) = self.form_state {
            f.backspace();
        }
    }
}

fn saved_message(committed: &Committed) -> String {
    if committed.reminders == 0 {
        return "All reminders cleared".to_string();
    }
    let mut msg = format!(
        "Saved {} reminder{} ({} notifications)",
        committed.reminders,
        if committed.reminders == 1 { "" } else { "s" },
        committed.triggers
    );
    if committed.skipped > 0 {
        msg.push_str(&format!(", {} incomplete", committed.skipped));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_message_describes_outcome() {
        let cleared = Committed {
            reminders: 0,
            triggers: 0,
            skipped: 0,
        };
        assert_eq!(saved_message(&cleared), "All reminders cleared");

        let two = Committed {
            reminders: 2,
            triggers: 5,
            skipped: 1,
        };
        assert_eq!(
            saved_message(&two),
            "Saved 2 reminders (5 notifications), 1 incomplete"
        );
    }
}
