pub mod popup;
pub mod reminder_form;
pub mod reminder_list;
pub mod status_bar;

pub use reminder_form::ReminderForm;
pub use reminder_list::ReminderList;
pub use status_bar::StatusBar;
