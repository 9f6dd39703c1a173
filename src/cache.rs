use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::data::cleaner::{self, Cleaned};
use crate::data::loader;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Per-dataset cache entry
// ---------------------------------------------------------------------------

/// Everything loaded for one configured dataset.
pub struct DatasetEntry {
    pub name: String,
    pub source_path: PathBuf,
    pub cleaned_path: PathBuf,
    /// Raw table; empty when loading failed.
    pub raw: Dataset,
    pub load_error: Option<String>,
    /// Cleaned table; `None` when cleaning or writing failed.
    pub cleaned: Option<Cleaned>,
    pub clean_error: Option<String>,
}

impl DatasetEntry {
    /// Load, clean and persist one dataset. Failures are kept on the entry.
    fn build(name: &str, source_path: PathBuf, cleaned_path: PathBuf) -> Self {
        let (raw, load_error) = loader::load_or_empty(&source_path);

        let (cleaned, clean_error) = match cleaner::clean(&raw, &cleaned_path) {
            Ok(c) => (Some(c), None),
            Err(e) => {
                let msg = format!("Failed to clean {name}: {e:#}");
                log::error!("{msg}");
                (None, Some(msg))
            }
        };

        DatasetEntry {
            name: name.to_string(),
            source_path,
            cleaned_path,
            raw,
            load_error,
            cleaned,
            clean_error,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.load_error
            .iter()
            .chain(self.clean_error.iter())
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Datasets keyed by display name. Filled once at startup and never
/// invalidated; restart the process to pick up changed files.
pub struct DatasetCache {
    entries: BTreeMap<String, DatasetEntry>,
    /// Display names in configuration order.
    order: Vec<String>,
}

impl DatasetCache {
    /// Eagerly load and clean every configured dataset.
    pub fn load_all(config: &DashboardConfig) -> Self {
        let mut entries = BTreeMap::new();
        let mut order = Vec::with_capacity(config.datasets.len());

        for source in &config.datasets {
            if entries.contains_key(&source.name) {
                log::warn!("Duplicate dataset name '{}' ignored", source.name);
                continue;
            }
            let entry = DatasetEntry::build(
                &source.name,
                config.source_path(source),
                config.cleaned_path(&source.name),
            );
            order.push(source.name.clone());
            entries.insert(source.name.clone(), entry);
        }

        log::info!("Prepared {} datasets", order.len());
        DatasetCache { entries, order }
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&DatasetEntry> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
