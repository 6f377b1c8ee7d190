use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::service::TaskModel;

/// What a menu entry does once chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Toggle,
    Add,
    Complete,
    Purge,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub command: MenuCommand,
    pub name: &'static str,
    pub description: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    /// Index of the chosen entry
    Choose(usize),
    Quit,
}

/// Single-choice list where disabled entries cannot be highlighted
#[derive(Debug, Clone)]
pub struct Menu {
    entries: Vec<MenuEntry>,
    selected: usize,
}

impl Menu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        let mut menu = Self {
            entries,
            selected: 0,
        };
        menu.settle_selection();
        menu
    }

    /// Standard menu; toggle and purge only make sense with completed tasks
    pub fn main(has_completed: bool) -> Self {
        Self::new(main_entries(has_completed))
    }

    /// Refresh disabled flags, keeping the cursor where it can stay
    pub fn refresh(&mut self, has_completed: bool) {
        self.entries = main_entries(has_completed);
        if self.selected >= self.entries.len() {
            self.selected = 0;
        }
        self.settle_selection();
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&MenuEntry> {
        self.entries.get(index)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&MenuEntry> {
        self.entries.get(self.selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return MenuAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return MenuAction::Quit;
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => self.move_selection(-1),
            KeyCode::Enter => {
                if let Some(entry) = self.selected_entry() {
                    if !entry.disabled {
                        return MenuAction::Choose(self.selected);
                    }
                }
            }
            _ => {}
        }
        MenuAction::None
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.entries.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        let mut next = self.selected as isize;
        for _ in 0..len {
            next = (next + delta).rem_euclid(len);
            if !self.entries[next as usize].disabled {
                self.selected = next as usize;
                return;
            }
        }
    }

    fn settle_selection(&mut self) {
        let disabled = self
            .selected_entry()
            .map(|entry| entry.disabled)
            .unwrap_or(false);
        if disabled {
            self.move_selection(1);
        }
    }
}

fn main_entries(has_completed: bool) -> Vec<MenuEntry> {
    vec![
        MenuEntry {
            command: MenuCommand::Toggle,
            name: "Show/Hide Completed",
            description: "Show or hide completed todo items",
            disabled: !has_completed,
        },
        MenuEntry {
            command: MenuCommand::Add,
            name: "Add Task",
            description: "Add a new todo item",
            disabled: false,
        },
        MenuEntry {
            command: MenuCommand::Complete,
            name: "Complete Task",
            description: "Mark a todo item as completed",
            disabled: false,
        },
        MenuEntry {
            command: MenuCommand::Purge,
            name: "Remove Completed Task",
            description: "Remove completed todo item",
            disabled: !has_completed,
        },
        MenuEntry {
            command: MenuCommand::Quit,
            name: "Quit",
            description: "Quit application",
            disabled: false,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Cancel,
    Submit(String),
}

/// One-line text prompt
#[derive(Debug, Clone)]
pub struct InputPrompt {
    message: &'static str,
    value: String,
    error: Option<String>,
}

impl InputPrompt {
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            value: String::new(),
            error: None,
        }
    }

    pub fn message(&self) -> &str {
        self.message
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => {
                    self.value.clear();
                    self.error = None;
                }
                KeyCode::Char('c') => return InputAction::Cancel,
                _ => {}
            }
            return InputAction::None;
        }

        match key.code {
            KeyCode::Esc => return InputAction::Cancel,
            KeyCode::Enter => {
                let title = self.value.trim();
                if title.is_empty() {
                    self.error = Some("title is required".to_string());
                    return InputAction::None;
                }
                return InputAction::Submit(title.to_string());
            }
            KeyCode::Backspace => {
                self.value.pop();
                self.error = None;
            }
            KeyCode::Char(ch) => {
                self.value.push(ch);
                self.error = None;
            }
            _ => {}
        }
        InputAction::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistOption {
    pub id: String,
    pub title: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistAction {
    None,
    Cancel,
    Apply,
}

/// Multi-select list seeded from the current completion state
#[derive(Debug, Clone)]
pub struct Checklist {
    options: Vec<ChecklistOption>,
    selected: usize,
}

impl Checklist {
    pub fn from_tasks(tasks: &[TaskModel]) -> Self {
        Self {
            options: tasks
                .iter()
                .map(|task| ChecklistOption {
                    id: task.id.clone(),
                    title: task.title.clone(),
                    checked: task.is_complete,
                })
                .collect(),
            selected: 0,
        }
    }

    pub fn options(&self) -> &[ChecklistOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn checked_ids(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|option| option.checked)
            .map(|option| option.id.clone())
            .collect()
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.options.iter().map(|option| option.id.clone()).collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ChecklistAction {
        match key.code {
            KeyCode::Esc => return ChecklistAction::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ChecklistAction::Cancel;
            }
            KeyCode::Enter => return ChecklistAction::Apply,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => self.toggle_all(),
            _ => {}
        }
        ChecklistAction::None
    }

    fn toggle_selected(&mut self) {
        if let Some(option) = self.options.get_mut(self.selected) {
            option.checked = !option.checked;
        }
    }

    /// Check everything, or uncheck everything when all are already checked
    fn toggle_all(&mut self) {
        let all_checked = self.options.iter().all(|option| option.checked);
        for option in &mut self.options {
            option.checked = !all_checked;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }
}
