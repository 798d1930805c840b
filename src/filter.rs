use crate::arena::{Arena, Span};
use crate::dataset::{Dataset, DatasetView};
use crate::error::DatasetError;
use std::fmt;
use tracing::info;

/// A set of label values, usable as a filter predicate.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSet {
    bits: [u64; 4],
}

impl LabelSet {
    pub fn new(labels: &[u8]) -> LabelSet {
        labels.iter().copied().collect()
    }

    pub fn insert(&mut self, label: u8) {
        self.bits[(label / 64) as usize] |= 1u64 << (label % 64);
    }

    pub fn contains(&self, label: u8) -> bool {
        self.bits[(label / 64) as usize] & (1u64 << (label % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&l| self.contains(l))
    }

    pub fn predicate(&self) -> impl Fn(u8) -> bool + '_ {
        move |label| self.contains(label)
    }
}

impl FromIterator<u8> for LabelSet {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        let mut set = LabelSet::default();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl fmt::Debug for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Stable subset of `source` (which must live in `arena`) keeping the
/// examples whose label satisfies `predicate`. The subset is allocated from
/// the same arena.
pub fn filter_by_label<P>(
    arena: &mut Arena,
    source: &Dataset,
    predicate: P,
) -> Result<Dataset, DatasetError>
where
    P: Fn(u8) -> bool,
{
    let matched = count_matches(&source.view(arena)?, &predicate);
    let (images, labels) = allocate_subset(arena, source, matched)?;

    // the subset sits after everything the source occupies
    let (before, dst) = arena.split_frontier(images)?;
    let view = source.view_in(before)?;
    copy_matches(&view, &predicate, dst, images.len());

    Ok(source.derive(matched, images, labels))
}

/// Like [`filter_by_label`], but the subset is allocated from `dest`.
pub fn filter_by_label_into<P>(
    source_arena: &Arena,
    source: &Dataset,
    dest: &mut Arena,
    predicate: P,
) -> Result<Dataset, DatasetError>
where
    P: Fn(u8) -> bool,
{
    let view = source.view(source_arena)?;
    let matched = count_matches(&view, &predicate);
    let (images, labels) = allocate_subset(dest, source, matched)?;

    let (_, dst) = dest.split_frontier(images)?;
    copy_matches(&view, &predicate, dst, images.len());

    Ok(source.derive(matched, images, labels))
}

fn count_matches<P: Fn(u8) -> bool>(view: &DatasetView, predicate: &P) -> usize {
    view.iter().filter(|&(_, label)| predicate(label)).count()
}

// Exactly one allocation for the images and one for the labels.
fn allocate_subset(
    arena: &mut Arena,
    source: &Dataset,
    matched: usize,
) -> Result<(Span, Span), DatasetError> {
    let images_size = matched * source.image_len();
    info!(
        matched,
        bytes = images_size,
        "Found {matched} examples that satisfy criteria, {images_size} bytes required"
    );

    let images = arena.allocate(images_size)?;
    let labels = arena.allocate(matched)?;
    Ok((images, labels))
}

// `dst` holds the images block followed directly by the labels block.
fn copy_matches<P: Fn(u8) -> bool>(
    view: &DatasetView,
    predicate: &P,
    dst: &mut [u8],
    images_size: usize,
) {
    let (dst_images, dst_labels) = dst.split_at_mut(images_size);
    let len = view.image_len();

    let matches = view.iter().filter(|&(_, label)| predicate(label));
    for (index, (image, label)) in matches.enumerate() {
        dst_images[index * len..(index + 1) * len].copy_from_slice(image);
        dst_labels[index] = label;
    }
}
