//! Task records and the filter/update engine over the task document.
//!
//! All reads go through [`TaskRepository::get_many`]. Bulk updates and removals
//! resolve their id set with one `get_many` pass before mutating, so a record
//! that starts matching because of the update itself is never picked up.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::Database;

/// One persisted to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub is_complete: bool,
}

/// Shape of the task file: `{ "tasks": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Fields of a task before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub is_complete: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, is_complete: bool) -> Self {
        Self {
            title: title.into(),
            is_complete,
        }
    }
}

/// Partial update; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub is_complete: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            is_complete: None,
        }
    }

    pub fn completion(is_complete: bool) -> Self {
        Self {
            title: None,
            is_complete: Some(is_complete),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_complete.is_none()
    }

    fn apply(&self, task: &mut TaskRecord) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(is_complete) = self.is_complete {
            task.is_complete = is_complete;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdFilter {
    One(String),
    Many(HashSet<String>),
}

impl IdFilter {
    fn matches(&self, id: &str) -> bool {
        match self {
            IdFilter::One(expected) => expected == id,
            IdFilter::Many(ids) => ids.contains(id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TitleFilter {
    /// Title contains the text
    Literal(String),
    /// Title matches the regex somewhere
    Pattern(Regex),
}

impl TitleFilter {
    pub fn literal(text: impl Into<String>) -> Self {
        TitleFilter::Literal(text.into())
    }

    /// Compile `pattern`; a bad regex fails here rather than while matching
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(TitleFilter::Pattern(Regex::new(pattern)?))
    }

    fn matches(&self, title: &str) -> bool {
        match self {
            TitleFilter::Literal(text) => title.contains(text.as_str()),
            TitleFilter::Pattern(regex) => regex.is_match(title),
        }
    }
}

/// Conjunction of optional predicates. The default filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub id: Option<IdFilter>,
    pub title: Option<TitleFilter>,
    pub is_complete: Option<bool>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(IdFilter::One(id.into()));
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id = Some(IdFilter::Many(ids.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_title(mut self, title: TitleFilter) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_completion(mut self, is_complete: bool) -> Self {
        self.is_complete = Some(is_complete);
        self
    }

    pub fn completed() -> Self {
        Self::new().with_completion(true)
    }

    pub fn incomplete() -> Self {
        Self::new().with_completion(false)
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        if let Some(id) = &self.id {
            if !id.matches(&task.id) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !title.matches(&task.title) {
                return false;
            }
        }
        if let Some(is_complete) = self.is_complete {
            if task.is_complete != is_complete {
                return false;
            }
        }
        true
    }
}

/// Generate an opaque task id
pub fn generate_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Filter/update engine over a [`TaskDocument`]
#[derive(Debug)]
pub struct TaskRepository<D> {
    db: D,
}

impl<D> TaskRepository<D>
where
    D: Database<TaskDocument>,
{
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn insert_one(&mut self, task: NewTask) -> Result<TaskRecord> {
        let mut inserted = self.insert_many(vec![task])?;
        Ok(inserted.remove(0))
    }

    /// Append all `tasks` in order with one persist
    pub fn insert_many(&mut self, tasks: Vec<NewTask>) -> Result<Vec<TaskRecord>> {
        let mut taken: HashSet<String> = self
            .db
            .data()
            .tasks
            .iter()
            .map(|task| task.id.clone())
            .collect();

        let records: Vec<TaskRecord> = tasks
            .into_iter()
            .map(|task| {
                let mut id = generate_task_id();
                while !taken.insert(id.clone()) {
                    id = generate_task_id();
                }
                TaskRecord {
                    id,
                    title: task.title,
                    is_complete: task.is_complete,
                }
            })
            .collect();

        let appended = records.clone();
        self.db.update(move |doc| doc.tasks.extend(appended))?;

        Ok(records)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&TaskRecord> {
        self.db.data().tasks.iter().find(|task| task.id == id)
    }

    /// Matching records in collection order; `None` matches everything
    pub fn get_many(&self, filter: Option<&TaskFilter>) -> Vec<&TaskRecord> {
        let tasks = self.db.data().tasks.iter();
        match filter {
            Some(filter) => tasks.filter(|task| filter.matches(task)).collect(),
            None => tasks.collect(),
        }
    }

    pub fn update_by_id(&mut self, id: &str, patch: &TaskPatch) -> Result<()> {
        let ids = HashSet::from([id.to_string()]);
        self.update(&ids, patch)
    }

    pub fn update_many(&mut self, filter: &TaskFilter, patch: &TaskPatch) -> Result<()> {
        let ids = self.matching_ids(filter);
        self.update(&ids, patch)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<()> {
        let ids = HashSet::from([id.to_string()]);
        self.remove(&ids)
    }

    pub fn remove_many(&mut self, filter: &TaskFilter) -> Result<()> {
        let ids = self.matching_ids(filter);
        self.remove(&ids)
    }

    fn matching_ids(&self, filter: &TaskFilter) -> HashSet<String> {
        self.get_many(Some(filter))
            .into_iter()
            .map(|task| task.id.clone())
            .collect()
    }

    fn update(&mut self, ids: &HashSet<String>, patch: &TaskPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        self.db.update(|doc| {
            for task in doc.tasks.iter_mut().filter(|task| ids.contains(&task.id)) {
                patch.apply(task);
            }
        })
    }

    fn remove(&mut self, ids: &HashSet<String>) -> Result<()> {
        self.db
            .update(|doc| doc.tasks.retain(|task| !ids.contains(&task.id)))
    }
}
