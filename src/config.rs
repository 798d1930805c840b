use crate::arena::Arena;
use crate::dataset::{Dataset, LoadOptions};
use crate::error::DatasetError;
use crate::filter::{filter_by_label, LabelSet};
use crate::mnist::{load_split, MnistSplit, DEFAULT_ARENA_CAPACITY, DEFAULT_DATA_DIR};
use std::path::PathBuf;

/// Where the data comes from and how it is loaded.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    pub split: MnistSplit,
    pub arena_capacity: usize,
    pub options: LoadOptions,
    /// Keep only these labels, if set.
    pub labels: Option<LabelSet>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            split: MnistSplit::Train,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            options: LoadOptions::default(),
            labels: None,
        }
    }
}

impl SourceConfig {
    pub fn new_arena(&self) -> Arena {
        Arena::new(self.arena_capacity)
    }

    /// Load the configured split into `arena`, then apply the label subset.
    pub fn load(&self, arena: &mut Arena) -> Result<Dataset, DatasetError> {
        let dataset = load_split(arena, &self.data_dir, self.split, &self.options)?;
        match &self.labels {
            Some(labels) => filter_by_label(arena, &dataset, labels.predicate()),
            None => Ok(dataset),
        }
    }
}
