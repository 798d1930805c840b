use crate::arena::Arena;
use crate::dataset::{load_with, Dataset, LoadOptions};
use crate::error::DatasetError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const IMAGE_WIDTH: usize = 28;
pub const IMAGE_HEIGHT: usize = 28;
pub const NUM_TRAIN_EXAMPLES: usize = 60_000;
pub const NUM_TEST_EXAMPLES: usize = 10_000;

pub const DEFAULT_DATA_DIR: &str = "./data";
/// Room for both splits and a couple of subsets.
pub const DEFAULT_ARENA_CAPACITY: usize = 200_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MnistSplit {
    Train,
    Test,
}

impl MnistSplit {
    pub fn num_examples(&self) -> usize {
        match self {
            MnistSplit::Train => NUM_TRAIN_EXAMPLES,
            MnistSplit::Test => NUM_TEST_EXAMPLES,
        }
    }

    /// (images, labels) file names.
    pub fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            MnistSplit::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            MnistSplit::Test => ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte"),
        }
    }

    pub fn paths(&self, data_dir: impl AsRef<Path>) -> (PathBuf, PathBuf) {
        let (images, labels) = self.file_names();
        (data_dir.as_ref().join(images), data_dir.as_ref().join(labels))
    }
}

impl fmt::Display for MnistSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnistSplit::Train => write!(f, "train"),
            MnistSplit::Test => write!(f, "test"),
        }
    }
}

impl FromStr for MnistSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(MnistSplit::Train),
            "test" | "t10k" => Ok(MnistSplit::Test),
            other => Err(format!("unknown split '{other}', expected 'train' or 't10k'/'test'")),
        }
    }
}

/// Load one of the standard splits from `data_dir`.
pub fn load_split(
    arena: &mut Arena,
    data_dir: impl AsRef<Path>,
    split: MnistSplit,
    options: &LoadOptions,
) -> Result<Dataset, DatasetError> {
    let (images, labels) = split.paths(data_dir);
    load_with(arena, split.num_examples(), images, labels, options)
}
