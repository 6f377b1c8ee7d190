#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tasklist::task::{TaskDocument, TaskRecord};
use tempfile::TempDir;

/// Isolated home directory holding a task file and an optional config
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn task_file(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_tasks(&self, tasks: &[TaskRecord]) -> Result<(), Box<dyn std::error::Error>> {
        let doc = TaskDocument {
            tasks: tasks.to_vec(),
        };
        fs::write(self.task_file(), serde_json::to_string_pretty(&doc)?)?;
        Ok(())
    }

    pub fn read_tasks(&self) -> Result<Vec<TaskRecord>, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.task_file())?;
        let doc: TaskDocument = serde_json::from_str(&contents)?;
        Ok(doc.tasks)
    }

    /// `tasklist` bound to this home and its task file
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tasklist").expect("tasklist binary");
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("TASKLIST_CONFIG")
            .env_remove("RUST_LOG")
            .env("TASKLIST_FILE", self.task_file());
        cmd
    }

    /// Run with `--json` and return the `data` payload
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }
}

pub fn record(id: &str, title: &str, is_complete: bool) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        title: title.to_string(),
        is_complete,
    }
}
