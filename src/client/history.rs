//! Recently used patterns, most recent first.

use crate::config::rc::{HISTORY_LIMIT_RANGE, clamp};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHistory {
    entries: Vec<String>,
    limit: usize,
    path: Option<PathBuf>,
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: clamp(limit, HISTORY_LIMIT_RANGE),
            path: None,
        }
    }

    /// Load from `path`. A missing or unreadable file starts an empty history.
    pub fn load(path: &Path, limit: usize) -> Self {
        let mut history = Self::new(limit);
        history.path = Some(path.to_path_buf());

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(entries) => {
                    history.entries = entries;
                    history.entries.truncate(history.limit);
                }
                Err(e) => log::warn!("ignoring corrupt history {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not read history {}: {e}", path.display()),
        }
        history
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Move `pattern` to the front, dropping any older copy.
    pub fn add(&mut self, pattern: &str) {
        self.entries.retain(|entry| entry != pattern);
        self.entries.insert(0, pattern.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = clamp(limit, HISTORY_LIMIT_RANGE);
        self.entries.truncate(self.limit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
