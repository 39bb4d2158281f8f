//! Terminal viewer: event loop and terminal lifecycle

pub mod command;
pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::Backend;
use crate::theme::Theme;
use crate::ui;
use crate::viewer::CourseViewerController;
use command::Flow;
use input::Action;
use state::{AppState, Screen};

/// The terminal application
pub struct App {
    theme: Theme,

    state: AppState,

    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(theme: Theme) -> Result<Self> {
        let terminal = Self::setup_terminal()?;

        Ok(Self { theme, state: AppState::default(), terminal })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, &mut self.state, &self.theme))?;
        Ok(())
    }

    /// Load a course and run the viewer until the user quits
    pub async fn run(
        &mut self,
        backend: Arc<dyn Backend>,
        course_id: &str,
        student_email: &str,
    ) -> Result<()> {
        // Restore the terminal on panic
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        self.state.screen = Screen::Loading;
        self.draw()?;

        let mut viewer = match CourseViewerController::load(backend, course_id, student_email).await {
            Ok(viewer) => {
                self.state.sync(&viewer);
                Some(viewer)
            }
            Err(e) => {
                tracing::error!(course_id, "Failed to open course: {}", e);
                self.state.screen = Screen::Fatal(e.to_string());
                None
            }
        };

        loop {
            self.draw()?;

            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(action) = input::key_with_modifier_to_action(key.code, key.modifiers) else {
                continue;
            };

            let flow = match viewer.as_mut() {
                Some(viewer) => command::handle_action(viewer, &mut self.state, action),
                None if matches!(action, Action::Select | Action::Back | Action::Quit) => Flow::Quit,
                None => Flow::Continue,
            };

            match flow {
                Flow::Continue => {}
                Flow::Quit => break,
                Flow::Save(op) => {
                    if let Some(viewer) = viewer.as_mut() {
                        command::mark_saving(&mut self.state);
                        self.draw()?;
                        command::save(viewer, &mut self.state, op).await;
                    }
                }
            }
        }

        self.restore_terminal()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
