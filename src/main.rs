mod app;
mod components;
mod config;
mod event;
mod presentation;
mod reminders;
mod theme;
mod tui;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use app::{App, InputMode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = config::current();
    init_logging(&config.storage.data_dir());
    presentation::init(config.notifications);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    eprintln!("Loading reminders...");
    let mut app = App::new(runtime.handle().clone())?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(format!("{}.log", config::APP_NAME)))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.poll();
        if app.notices.take_bell() {
            tui::bell()?;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

            components::ReminderList::render(
                frame,
                layout[0],
                app.model.reminders(),
                app.selected,
                app.model.is_dirty(),
            );

            if let Some(ref form) = app.form_state {
                components::ReminderForm::render(frame, area, form);
            }
            if let Some(ref delivery) = app.notices.alert {
                components::popup::render_alert(frame, area, delivery);
            }
            if app.input_mode() == InputMode::Prompt {
                components::popup::render_permission_prompt(frame, area);
            }

            components::StatusBar::render(frame, layout[1], app);
        })?;

        if let Some(key) = event::next_key_press(Duration::from_millis(100))? {
            // Clear status message on any key
            app.status_message = None;

            if app.input_mode() == InputMode::Prompt {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_prompt(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        app.answer_prompt(false)
                    }
                    _ => {}
                }
                continue;
            }

            // Alert popup takes priority over editing
            if app.notices.alert.is_some() {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    app.dismiss_alert();
                }
                continue;
            }

            match app.input_mode() {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
                InputMode::Prompt => {}
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Char('n'), _) => app.add_reminder(),
        (KeyCode::Char('e'), _) | (KeyCode::Enter, _) => app.open_form(),
        (KeyCode::Char('d'), _) => app.delete_selected(),
        (KeyCode::Char('s'), _) => app.save(),
        (KeyCode::Char('u'), _) => app.revert(),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}
