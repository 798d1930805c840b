#![allow(dead_code)]

use mnist_arena::idx::{IMAGES_MAGIC, LABELS_MAGIC};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn images_bytes(magic: u32, num_items: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    for field in [magic, num_items, rows, cols] {
        buf.extend_from_slice(&field.to_be_bytes());
    }
    buf.extend_from_slice(pixels);
    buf
}

pub fn labels_bytes(magic: u32, num_items: u32, labels: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&magic.to_be_bytes());
    buf.extend_from_slice(&num_items.to_be_bytes());
    buf.extend_from_slice(labels);
    buf
}

/// An images/labels pair on disk, removed when dropped.
pub struct IdxPair {
    _dir: TempDir,
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl IdxPair {
    pub fn from_bytes(images: &[u8], labels: &[u8]) -> IdxPair {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let images_path = dir.path().join("images-idx3-ubyte");
        let labels_path = dir.path().join("labels-idx1-ubyte");
        fs::write(&images_path, images).expect("Failed to write images file");
        fs::write(&labels_path, labels).expect("Failed to write labels file");
        IdxPair {
            _dir: dir,
            images: images_path,
            labels: labels_path,
        }
    }

    /// Well-formed pair: `labels.len()` images of `rows` x `cols`.
    pub fn new(rows: u32, cols: u32, pixels: &[u8], labels: &[u8]) -> IdxPair {
        let n = labels.len() as u32;
        IdxPair::from_bytes(
            &images_bytes(IMAGES_MAGIC, n, rows, cols, pixels),
            &labels_bytes(LABELS_MAGIC, n, labels),
        )
    }
}
