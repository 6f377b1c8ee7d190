//! One-shot task command implementations.

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::config::AppOptions;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::service::{TaskModel, TaskService};
use crate::storage::JsonFileDatabase;
use crate::task::{TaskDocument, TaskFilter, TaskRepository, TitleFilter};

pub type FileTaskService = TaskService<JsonFileDatabase<TaskDocument>>;

pub struct ListFilters {
    pub ids: Vec<String>,
    pub title: Option<String>,
    pub pattern: Option<String>,
    pub completed: bool,
    pub incomplete: bool,
}

impl ListFilters {
    fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.title.is_none()
            && self.pattern.is_none()
            && !self.completed
            && !self.incomplete
    }

    fn into_filter(self) -> Result<TaskFilter> {
        let mut filter = TaskFilter::new();
        if !self.ids.is_empty() {
            filter = filter.with_ids(self.ids);
        }
        if let Some(title) = self.title {
            filter = filter.with_title(TitleFilter::literal(title));
        }
        if let Some(pattern) = self.pattern {
            filter = filter.with_title(TitleFilter::pattern(&pattern)?);
        }
        if self.completed {
            filter = filter.with_completion(true);
        } else if self.incomplete {
            filter = filter.with_completion(false);
        }
        Ok(filter)
    }
}

#[derive(Serialize)]
struct TaskListOutput {
    tasks: Vec<TaskModel>,
}

#[derive(Serialize)]
struct AffectedOutput {
    requested: usize,
    matched: usize,
}

pub fn open_service(options: &AppOptions) -> Result<FileTaskService> {
    let db = JsonFileDatabase::open(&options.storage_location, options.default_data.clone())?;
    Ok(TaskService::new(TaskRepository::new(db)))
}

pub fn run_add(options: &AppOptions, output: OutputOptions, titles: Vec<String>) -> Result<()> {
    let titles = normalize_titles(titles)?;
    let mut service = open_service(options)?;
    let tasks = service.add_many(titles)?;

    let mut human = HumanOutput::new(format!("Added {} task(s)", tasks.len()));
    for task in &tasks {
        human.push_detail(describe(task));
    }

    emit_success(output, "add", &TaskListOutput { tasks }, Some(&human))
}

pub fn run_list(options: &AppOptions, output: OutputOptions, filters: ListFilters) -> Result<()> {
    let service = open_service(options)?;
    let filter = if filters.is_empty() {
        (!options.state.show_completed).then(TaskFilter::incomplete)
    } else {
        Some(filters.into_filter()?)
    };
    let tasks = service.search(filter.as_ref());

    let stats = service.get_stats();
    let mut human = HumanOutput::new(format!(
        "Todo Lists (total: {}, incomplete: {}, completed: {})",
        stats.total, stats.incomplete, stats.completed
    ));
    for task in &tasks {
        human.push_detail(describe(task));
    }

    emit_success(output, "list", &TaskListOutput { tasks }, Some(&human))
}

pub fn run_set_complete(
    options: &AppOptions,
    output: OutputOptions,
    ids: Vec<String>,
    is_complete: bool,
) -> Result<()> {
    let ids = unique_ids(ids);
    let mut service = open_service(options)?;
    let matched = count_known(&service, &ids);

    for id in &ids {
        if is_complete {
            service.mark_as_complete(id)?;
        } else {
            service.mark_as_incomplete(id)?;
        }
    }
    info!(requested = ids.len(), matched, is_complete, "completion set");

    let (command, verb) = if is_complete {
        ("complete", "Completed")
    } else {
        ("reopen", "Reopened")
    };
    let mut human = HumanOutput::new(format!("{verb} {matched} task(s)"));
    if matched < ids.len() {
        human.push_warning(format!("{} id(s) not found", ids.len() - matched));
    }

    emit_success(
        output,
        command,
        &AffectedOutput {
            requested: ids.len(),
            matched,
        },
        Some(&human),
    )
}

pub fn run_remove(options: &AppOptions, output: OutputOptions, ids: Vec<String>) -> Result<()> {
    let ids = unique_ids(ids);
    let mut service = open_service(options)?;
    let matched = count_known(&service, &ids);

    for id in &ids {
        service.remove_by_id(id)?;
    }
    info!(requested = ids.len(), matched, "tasks removed");

    let mut human = HumanOutput::new(format!("Removed {matched} task(s)"));
    if matched < ids.len() {
        human.push_warning(format!("{} id(s) not found", ids.len() - matched));
    }

    emit_success(
        output,
        "rm",
        &AffectedOutput {
            requested: ids.len(),
            matched,
        },
        Some(&human),
    )
}

pub fn run_purge(options: &AppOptions, output: OutputOptions) -> Result<()> {
    let mut service = open_service(options)?;
    let removed = service.get_stats().completed;
    service.remove_complete()?;

    #[derive(Serialize)]
    struct PurgeOutput {
        removed: usize,
    }

    let human = HumanOutput::new(format!("Removed {removed} completed task(s)"));
    emit_success(output, "purge", &PurgeOutput { removed }, Some(&human))
}

pub fn run_stats(options: &AppOptions, output: OutputOptions) -> Result<()> {
    let service = open_service(options)?;
    let stats = service.get_stats();

    let mut human = HumanOutput::new("Task stats");
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("Incomplete", stats.incomplete.to_string());
    human.push_summary("Completed", stats.completed.to_string());

    emit_success(output, "stats", &stats, Some(&human))
}

/// Trim titles; a blank one rejects the whole batch
fn normalize_titles(titles: Vec<String>) -> Result<Vec<String>> {
    titles
        .into_iter()
        .map(|title| {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                Err(Error::InvalidArgument("title is required".to_string()))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn unique_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

fn count_known(service: &FileTaskService, ids: &[String]) -> usize {
    ids.iter()
        .filter(|id| service.get_by_id(id).is_some())
        .count()
}

fn describe(task: &TaskModel) -> String {
    format!("{}  {}", task.id, task)
}
