use crate::config::SourceConfig;
use crate::dataset::DatasetView;
use crate::mnist::MnistSplit;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug)]
pub struct DatasetSummary {
    pub split: MnistSplit,
    pub num_items: usize,
    pub num_rows: usize,
    pub num_cols: usize,
    pub image_bytes: usize,
    pub magic_images: u32,
    pub magic_labels: u32,
    pub mean_intensity: f32,
    pub label_counts: BTreeMap<u8, usize>,
    pub arena_used: usize,
    pub arena_capacity: usize,
}

impl DatasetSummary {
    fn print(&self) {
        println!("[{}] examples: {}", self.split, self.num_items);
        println!("[{}] image shape: {}x{}", self.split, self.num_rows, self.num_cols);
        println!(
            "[{}] magic: images {:#010x}, labels {:#010x}",
            self.split, self.magic_images, self.magic_labels
        );
        println!("[{}] mean intensity: {:.4}", self.split, self.mean_intensity);
        for (label, count) in &self.label_counts {
            println!("[{}] label {}: {}", self.split, label, count);
        }
        println!(
            "[ARENA] {} / {} bytes used",
            self.arena_used, self.arena_capacity
        );
    }
}

/// Mean pixel value scaled to [0, 1], without materializing the feature matrix.
pub fn mean_intensity(view: &DatasetView) -> f32 {
    let images = view.images();
    if images.is_empty() {
        return 0.0;
    }
    let total: u64 = images.iter().map(|&p| p as u64).sum();
    (total as f64 / images.len() as f64 / 255.0) as f32
}

/// Load the configured dataset and report its shape and label distribution
pub fn inspect(config: &SourceConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut arena = config.new_arena();
    let dataset = config.load(&mut arena)?;
    let view = dataset.view(&arena)?;

    let summary = DatasetSummary {
        split: config.split,
        num_items: view.num_items(),
        num_rows: view.num_rows(),
        num_cols: view.num_cols(),
        image_bytes: view.images().len(),
        magic_images: dataset.magic_images(),
        magic_labels: dataset.magic_labels(),
        mean_intensity: mean_intensity(&view),
        label_counts: view.label_counts(),
        arena_used: arena.used(),
        arena_capacity: arena.capacity(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }

    Ok(())
}
