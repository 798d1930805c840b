use crate::arena::{Arena, ArenaError, Region, Span};
use crate::error::DatasetError;
use crate::idx::{IdxReader, IMAGES_MAGIC, LABELS_MAGIC};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Strictness knobs for the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject files whose magic number is not the IDX images/labels constant.
    pub validate_magic: bool,
    /// Fail when the images and labels files disagree on the item count.
    pub check_counts: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            validate_magic: false,
            check_counts: true,
        }
    }
}

/// An image/label table whose bytes live in an [`Arena`].
///
/// The dataset itself only holds shape metadata and spans; use
/// [`Dataset::view`] with the owning arena to read the buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    num_items: usize,
    num_rows: usize,
    num_cols: usize,
    magic_images: u32,
    magic_labels: u32,
    images: Span,
    labels: Span,
}

impl Dataset {
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn image_len(&self) -> usize {
        self.num_rows * self.num_cols
    }

    pub fn magic_images(&self) -> u32 {
        self.magic_images
    }

    pub fn magic_labels(&self) -> u32 {
        self.magic_labels
    }

    pub fn images_span(&self) -> Span {
        self.images
    }

    pub fn labels_span(&self) -> Span {
        self.labels
    }

    pub fn view<'a>(&self, arena: &'a Arena) -> Result<DatasetView<'a>, ArenaError> {
        self.view_in(arena.region())
    }

    pub fn view_in<'a>(&self, region: Region<'a>) -> Result<DatasetView<'a>, ArenaError> {
        Ok(DatasetView {
            num_items: self.num_items,
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            images: region.get(self.images)?,
            labels: region.get(self.labels)?,
        })
    }

    // Same shape and provenance, different rows.
    pub(crate) fn derive(&self, num_items: usize, images: Span, labels: Span) -> Dataset {
        Dataset {
            num_items,
            images,
            labels,
            ..*self
        }
    }
}

/// Read-only, arena-borrowing view of a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct DatasetView<'a> {
    num_items: usize,
    num_rows: usize,
    num_cols: usize,
    images: &'a [u8],
    labels: &'a [u8],
}

impl<'a> DatasetView<'a> {
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn image_len(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// All pixels, image-major then row-major.
    pub fn images(&self) -> &'a [u8] {
        self.images
    }

    pub fn labels(&self) -> &'a [u8] {
        self.labels
    }

    /// Pixels of example `i`. Panics if `i >= num_items`.
    pub fn image(&self, i: usize) -> &'a [u8] {
        let len = self.image_len();
        &self.images[i * len..(i + 1) * len]
    }

    pub fn label(&self, i: usize) -> u8 {
        self.labels[i]
    }

    /// Examples that have both an image and a label. Only differs from
    /// `num_items` when the item-count check was disabled at load time.
    pub fn num_complete(&self) -> usize {
        self.num_items.min(self.labels.len())
    }

    /// (image, label) pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], u8)> + 'a {
        let view = *self;
        (0..view.num_complete()).map(move |i| (view.image(i), view.label(i)))
    }

    pub fn label_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for &label in self.labels.iter().take(self.num_items) {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }
}

/// Load an images/labels file pair into `arena` with the default options.
pub fn load(
    arena: &mut Arena,
    declared_count: usize,
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
) -> Result<Dataset, DatasetError> {
    load_with(
        arena,
        declared_count,
        images_path,
        labels_path,
        &LoadOptions::default(),
    )
}

pub fn load_with(
    arena: &mut Arena,
    declared_count: usize,
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Dataset, DatasetError> {
    let images = IdxReader::open(images_path)?;
    let labels = IdxReader::open(labels_path)?;
    load_from_readers(arena, declared_count, images, labels, options)
}

/// Decode both streams into buffers provisioned for `declared_count` examples.
///
/// One images allocation and one labels allocation are made, sized from the
/// declared count and the image shape in the images header.
pub fn load_from_readers<I: Read, L: Read>(
    arena: &mut Arena,
    declared_count: usize,
    mut images: IdxReader<I>,
    mut labels: IdxReader<L>,
    options: &LoadOptions,
) -> Result<Dataset, DatasetError> {
    let header = images.read_images_header()?;
    if options.validate_magic {
        images.check_magic(header.magic, IMAGES_MAGIC)?;
    }

    let num_items = header.num_items as usize;
    if num_items > declared_count {
        return Err(DatasetError::DeclaredCountExceeded {
            origin: images.origin().to_string(),
            declared: declared_count,
            found: num_items,
        });
    }

    let (num_rows, num_cols) = (header.num_rows as usize, header.num_cols as usize);
    let images_size = header
        .image_len()
        .and_then(|len| len.checked_mul(declared_count))
        .ok_or_else(|| DatasetError::ShapeOverflow {
            origin: images.origin().to_string(),
            items: declared_count,
            rows: num_rows,
            cols: num_cols,
        })?;

    info!(bytes = images_size, "Loading data requires {images_size} bytes");

    let images_span = arena.allocate(images_size)?;
    let labels_span = arena.allocate(declared_count)?;

    let images_span = images_span.prefix(num_items * num_rows * num_cols);
    images.read_records("image data", arena.get_mut(images_span)?)?;
    drop(images);

    let label_header = labels.read_labels_header()?;
    if options.validate_magic {
        labels.check_magic(label_header.magic, LABELS_MAGIC)?;
    }

    let num_labels = label_header.num_items as usize;
    if num_labels > declared_count {
        return Err(DatasetError::DeclaredCountExceeded {
            origin: labels.origin().to_string(),
            declared: declared_count,
            found: num_labels,
        });
    }

    let labels_span = labels_span.prefix(num_labels);
    labels.read_records("label data", arena.get_mut(labels_span)?)?;

    if options.check_counts && num_labels != num_items {
        return Err(DatasetError::FormatMismatch {
            origin: labels.origin().to_string(),
            detail: format!("{num_labels} labels for {num_items} images"),
        });
    }

    Ok(Dataset {
        num_items,
        num_rows,
        num_cols,
        magic_images: header.magic,
        magic_labels: label_header.magic,
        images: images_span,
        labels: labels_span,
    })
}
