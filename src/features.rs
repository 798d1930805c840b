use crate::dataset::DatasetView;
use ndarray::prelude::*;

impl DatasetView<'_> {
    /// Pixels as a (num_items, rows * cols) matrix, scaled to [0, 1].
    pub fn features(&self) -> Array2<f32> {
        let len = self.image_len();
        let images = self.images();
        Array2::from_shape_fn((self.num_items(), len), |(i, j)| {
            images[i * len + j] as f32 / 255.0
        })
    }

    /// Labels as float class targets.
    pub fn targets(&self) -> Array1<f32> {
        self.labels()
            .iter()
            .take(self.num_items())
            .map(|&label| label as f32)
            .collect()
    }
}
