use std::io;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::config::AppState;
use crate::error::{Error, Result};
use crate::service::{TaskModel, TaskService, TaskStats};
use crate::storage::Database;
use crate::task::{TaskDocument, TaskFilter};

use super::prompt::{
    Checklist, ChecklistAction, InputAction, InputPrompt, Menu, MenuAction, MenuCommand,
};
use super::view;

const ADD_PROMPT: &str = "Enter task: ";

#[derive(Debug, Clone)]
pub enum Screen {
    Menu,
    Add(InputPrompt),
    Complete(Checklist),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// Shell state; key handling is independent of the terminal
pub struct ShellState<D> {
    service: TaskService<D>,
    state: AppState,
    menu: Menu,
    screen: Screen,
    status: Option<(String, StatusKind)>,
}

impl<D> ShellState<D>
where
    D: Database<TaskDocument>,
{
    pub fn new(service: TaskService<D>, state: AppState) -> Self {
        let menu = Menu::main(service.has_completed());
        Self {
            service,
            state,
            menu,
            screen: Screen::Menu,
            status: None,
        }
    }

    pub fn service(&self) -> &TaskService<D> {
        &self.service
    }

    pub fn show_completed(&self) -> bool {
        self.state.show_completed
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub(crate) fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    pub fn stats(&self) -> TaskStats {
        self.service.get_stats()
    }

    /// Tasks listed above the menu
    pub fn visible_tasks(&self) -> Vec<TaskModel> {
        if self.state.show_completed {
            self.service.search(None)
        } else {
            self.service.search(Some(&TaskFilter::incomplete()))
        }
    }

    /// Handle one key press. Returns `Ok(true)` when the shell should exit.
    ///
    /// Storage failures are reported on the status line; only a menu choice
    /// the shell cannot dispatch is returned as an error.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match std::mem::replace(&mut self.screen, Screen::Menu) {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Add(mut prompt) => {
                match prompt.handle_key(key) {
                    InputAction::None => self.screen = Screen::Add(prompt),
                    InputAction::Cancel => self.set_info("add cancelled"),
                    InputAction::Submit(title) => {
                        let outcome = self.service.add(title).map(|task| {
                            format!("added \"{}\"", task.title)
                        });
                        self.apply_outcome(outcome);
                    }
                }
                Ok(false)
            }
            Screen::Complete(mut checklist) => {
                match checklist.handle_key(key) {
                    ChecklistAction::None => self.screen = Screen::Complete(checklist),
                    ChecklistAction::Cancel => self.set_info("no changes"),
                    ChecklistAction::Apply => {
                        let checked = checklist.checked_ids();
                        let outcome = self
                            .service
                            .set_completion(&checked, &checklist.all_ids())
                            .map(|()| format!("{} task(s) completed", checked.len()));
                        self.apply_outcome(outcome);
                    }
                }
                Ok(false)
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.menu.handle_key(key) {
            MenuAction::None => Ok(false),
            MenuAction::Quit => Ok(true),
            MenuAction::Choose(index) => {
                let command = self
                    .menu
                    .entry(index)
                    .map(|entry| entry.command)
                    .ok_or_else(|| Error::InvalidCommand(format!("menu entry {index}")))?;
                self.dispatch(command)
            }
        }
    }

    fn dispatch(&mut self, command: MenuCommand) -> Result<bool> {
        self.status = None;
        match command {
            MenuCommand::Toggle => {
                self.state.show_completed = !self.state.show_completed;
                info!(show_completed = self.state.show_completed, "display toggled");
            }
            MenuCommand::Add => self.screen = Screen::Add(InputPrompt::new(ADD_PROMPT)),
            MenuCommand::Complete => {
                let tasks = self.service.search(None);
                self.screen = Screen::Complete(Checklist::from_tasks(&tasks));
            }
            MenuCommand::Purge => {
                let removed = self.stats().completed;
                let outcome = self
                    .service
                    .remove_complete()
                    .map(|()| format!("removed {removed} completed task(s)"));
                self.apply_outcome(outcome);
            }
            MenuCommand::Quit => return Ok(true),
        }
        Ok(false)
    }

    fn apply_outcome(&mut self, outcome: Result<String>) {
        match outcome {
            Ok(message) => self.set_info(message),
            Err(err) => {
                warn!(error = %err, "shell action failed");
                self.status = Some((err.to_string(), StatusKind::Error));
            }
        }
        self.menu.refresh(self.service.has_completed());
    }

    fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Info));
    }
}

/// Run the interactive shell until the user quits
pub fn run<D>(service: TaskService<D>, state: AppState) -> Result<()>
where
    D: Database<TaskDocument>,
{
    let mut shell = ShellState::new(service, state);
    run_terminal(&mut shell)
}

fn run_terminal<D>(shell: &mut ShellState<D>) -> Result<()>
where
    D: Database<TaskDocument>,
{
    with_terminal_restored(
        enter_terminal,
        || {
            let backend = CrosstermBackend::new(io::stdout());
            let mut terminal = Terminal::new(backend)?;
            run_loop(&mut terminal, shell)
        },
        leave_terminal,
    )
}

/// Run `body` between `enter` and `leave`. `leave` runs whenever `enter`
/// succeeded, and an error from `body` wins over an error from `leave`.
fn with_terminal_restored<T>(
    enter: impl FnOnce() -> Result<()>,
    body: impl FnOnce() -> Result<T>,
    leave: impl FnOnce() -> Result<()>,
) -> Result<T> {
    enter()?;
    let result = body();
    let restored = leave();
    let value = result?;
    restored?;
    Ok(value)
}

fn enter_terminal() -> Result<()> {
    enable_raw_mode()?;
    if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    Ok(())
}

/// Undo [`enter_terminal`]; both steps are attempted even if one fails
fn leave_terminal() -> Result<()> {
    let screen = execute!(io::stdout(), LeaveAlternateScreen, Show);
    let raw = disable_raw_mode();
    screen?;
    raw?;
    Ok(())
}

fn run_loop<D>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    shell: &mut ShellState<D>,
) -> Result<()>
where
    D: Database<TaskDocument>,
{
    loop {
        terminal.draw(|frame| view::render(frame, shell))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if shell.handle_key(key)? {
                break;
            }
        }
    }
    Ok(())
}
