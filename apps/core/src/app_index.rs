//! In-memory snapshot of installed applications, fed by a Start Menu
//! shortcut scan on Windows and searched with a cheap case-insensitive
//! substring match. The snapshot is replaced wholesale by each rescan and
//! read concurrently by search workers.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use walkdir::WalkDir;

use crate::model::ResultItem;
use crate::source::{SearchSource, SourceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub path: String,
}

impl AppEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Default)]
pub struct AppIndex {
    entries: RwLock<Vec<AppEntry>>,
}

impl AppIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn replace(&self, entries: Vec<AppEntry>) {
        match self.entries.write() {
            Ok(mut guard) => *guard = entries,
            Err(poisoned) => *poisoned.into_inner() = entries,
        }
    }

    pub fn snapshot(&self) -> Vec<AppEntry> {
        self.read().clone()
    }

    /// Walks the Start Menu shortcut folders and replaces the snapshot with
    /// what it finds. Returns the new entry count. Off Windows there is
    /// nothing to walk and the snapshot is left alone.
    pub fn rescan(&self) -> usize {
        let found = scan_start_menu();
        if found.is_empty() && cfg!(not(target_os = "windows")) {
            return self.len();
        }
        let count = found.len();
        self.replace(found);
        count
    }

    /// Case-insensitive substring match on the application name, preserving
    /// snapshot order. An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<ResultItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.read()
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .map(|entry| ResultItem::app(&entry.name, &entry.path))
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<AppEntry>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub struct AppIndexSource {
    index: Arc<AppIndex>,
}

impl AppIndexSource {
    pub fn new(index: Arc<AppIndex>) -> Self {
        Self { index }
    }
}

impl SearchSource for AppIndexSource {
    fn source_name(&self) -> &'static str {
        "app-index"
    }

    fn search(&self, query: &str) -> Result<Vec<ResultItem>, SourceError> {
        Ok(self.index.search(query))
    }
}

fn scan_start_menu() -> Vec<AppEntry> {
    let mut found = Vec::new();
    for root in start_menu_roots() {
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_shortcut = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("lnk"));
            if !is_shortcut {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                found.push(AppEntry::new(stem, path.to_string_lossy()));
            }
        }
    }
    found
}

fn start_menu_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for var in ["ProgramData", "APPDATA"] {
        if let Ok(base) = std::env::var(var) {
            if !base.is_empty() {
                roots.push(
                    PathBuf::from(base)
                        .join("Microsoft")
                        .join("Windows")
                        .join("Start Menu")
                        .join("Programs"),
                );
            }
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::{AppEntry, AppIndex};
    use crate::model::ResultKind;

    fn seeded() -> AppIndex {
        let index = AppIndex::new();
        index.replace(vec![
            AppEntry::new("Visual Studio Code", "C:\\Apps\\Code.lnk"),
            AppEntry::new("Windows Terminal", "C:\\Apps\\Terminal.lnk"),
            AppEntry::new("Codeium", "C:\\Apps\\Codeium.lnk"),
        ]);
        index
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let index = seeded();
        let hits = index.search("CODE");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Visual Studio Code");
        assert_eq!(hits[0].kind, ResultKind::App);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let index = seeded();
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let index = seeded();
        index.replace(vec![AppEntry::new("Paint", "C:\\Apps\\Paint.lnk")]);
        assert_eq!(index.len(), 1);
        assert!(index.search("code").is_empty());
    }
}
