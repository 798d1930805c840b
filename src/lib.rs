pub mod arena;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod filter;
pub mod idx;
pub mod inspect;
pub mod mnist;
pub mod preview;

pub use arena::{Arena, ArenaError, Span};
pub use dataset::{load, load_with, Dataset, DatasetView, LoadOptions};
pub use error::DatasetError;
pub use filter::{filter_by_label, filter_by_label_into, LabelSet};
