//! Display-oriented task facade used by the shell and the CLI.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::storage::Database;
use crate::task::{NewTask, TaskDocument, TaskFilter, TaskPatch, TaskRecord, TaskRepository};

/// A task as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskModel {
    pub id: String,
    pub title: String,
    pub is_complete: bool,
}

impl From<&TaskRecord> for TaskModel {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            is_complete: record.is_complete,
        }
    }
}

impl From<TaskRecord> for TaskModel {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            is_complete: record.is_complete,
        }
    }
}

impl fmt::Display for TaskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_complete { "(completed)" } else { "" };
        write!(f, "{}\t{}", self.title, marker)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
}

pub struct TaskService<D> {
    repository: TaskRepository<D>,
}

impl<D> TaskService<D>
where
    D: Database<TaskDocument>,
{
    pub fn new(repository: TaskRepository<D>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &TaskRepository<D> {
        &self.repository
    }

    /// Add a new, incomplete task
    pub fn add(&mut self, title: impl Into<String>) -> Result<TaskModel> {
        let record = self.repository.insert_one(NewTask::new(title, false))?;
        info!(id = %record.id, "task added");
        Ok(record.into())
    }

    /// Add several incomplete tasks with a single write
    pub fn add_many<I, S>(&mut self, titles: I) -> Result<Vec<TaskModel>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks = titles
            .into_iter()
            .map(|title| NewTask::new(title, false))
            .collect();
        let records = self.repository.insert_many(tasks)?;
        info!(count = records.len(), "tasks added");
        Ok(records.into_iter().map(TaskModel::from).collect())
    }

    pub fn get_by_id(&self, id: &str) -> Option<TaskModel> {
        self.repository.get_by_id(id).map(TaskModel::from)
    }

    pub fn search(&self, filter: Option<&TaskFilter>) -> Vec<TaskModel> {
        self.repository
            .get_many(filter)
            .into_iter()
            .map(TaskModel::from)
            .collect()
    }

    pub fn mark_as_complete(&mut self, id: &str) -> Result<()> {
        self.repository
            .update_by_id(id, &TaskPatch::completion(true))
    }

    pub fn mark_as_incomplete(&mut self, id: &str) -> Result<()> {
        self.repository
            .update_by_id(id, &TaskPatch::completion(false))
    }

    /// Apply a checklist: `checked` become complete, the rest of `all` incomplete.
    pub fn set_completion(&mut self, checked: &[String], all: &[String]) -> Result<()> {
        let unchecked: Vec<&String> = all.iter().filter(|id| !checked.contains(id)).collect();

        if !checked.is_empty() {
            self.repository.update_many(
                &TaskFilter::new().with_ids(checked.iter().cloned()),
                &TaskPatch::completion(true),
            )?;
        }
        if !unchecked.is_empty() {
            self.repository.update_many(
                &TaskFilter::new().with_ids(unchecked.into_iter().cloned()),
                &TaskPatch::completion(false),
            )?;
        }

        info!(checked = checked.len(), total = all.len(), "completion updated");
        Ok(())
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<()> {
        self.repository.remove_by_id(id)
    }

    /// Purge every completed task
    pub fn remove_complete(&mut self) -> Result<()> {
        self.repository.remove_many(&TaskFilter::completed())?;
        info!("completed tasks purged");
        Ok(())
    }

    pub fn get_stats(&self) -> TaskStats {
        let total = self.search(None).len();
        let completed = self.search(Some(&TaskFilter::completed())).len();
        TaskStats {
            total,
            completed,
            incomplete: total - completed,
        }
    }

    /// True when at least one task is complete
    pub fn has_completed(&self) -> bool {
        self.search(None).iter().any(|task| task.is_complete)
    }
}
