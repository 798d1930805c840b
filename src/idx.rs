//! IDX container decoding.
//!
//! Layout of the two variants handled here (all header fields big-endian u32):
//!
//! ```text
//! images: magic | count | rows | cols | count*rows*cols pixel bytes
//! labels: magic | count | count label bytes
//! ```
use crate::error::DatasetError;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

pub const IMAGES_MAGIC: u32 = 0x0000_0803; // 2051
pub const LABELS_MAGIC: u32 = 0x0000_0801; // 2049

pub const IMAGES_HEADER_LEN: usize = 16;
pub const LABELS_HEADER_LEN: usize = 8;

/// Interpret four bytes, most significant first, as a `u32`.
pub fn decode_u32_be(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagesHeader {
    pub magic: u32,
    pub num_items: u32,
    pub num_rows: u32,
    pub num_cols: u32,
}

impl ImagesHeader {
    /// Bytes per image, `None` if rows * cols overflows.
    pub fn image_len(&self) -> Option<usize> {
        (self.num_rows as usize).checked_mul(self.num_cols as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelsHeader {
    pub magic: u32,
    pub num_items: u32,
}

/// Sequential decoder over one IDX stream.
///
/// The reader owns its source; for files this means the handle is closed as
/// soon as the reader is dropped, whichever way the load ends.
pub struct IdxReader<R> {
    inner: R,
    origin: String,
}

impl IdxReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            origin: origin.clone(),
            source,
        })?;
        Ok(IdxReader::new(BufReader::new(file), origin))
    }
}

impl<R: Read> IdxReader<R> {
    pub fn new(inner: R, origin: impl Into<String>) -> Self {
        IdxReader {
            inner,
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn read_images_header(&mut self) -> Result<ImagesHeader, DatasetError> {
        let [magic, num_items, num_rows, num_cols] = self.read_fields::<4>("images header")?;
        let header = ImagesHeader {
            magic,
            num_items,
            num_rows,
            num_cols,
        };
        debug!(origin = %self.origin, ?header, "decoded images header");
        Ok(header)
    }

    pub fn read_labels_header(&mut self) -> Result<LabelsHeader, DatasetError> {
        let [magic, num_items] = self.read_fields::<2>("labels header")?;
        let header = LabelsHeader { magic, num_items };
        debug!(origin = %self.origin, ?header, "decoded labels header");
        Ok(header)
    }

    /// Fill `dst` with the next `dst.len()` record bytes, in stream order.
    pub fn read_records(
        &mut self,
        section: &'static str,
        dst: &mut [u8],
    ) -> Result<(), DatasetError> {
        let available = self.fill(dst)?;
        if available < dst.len() {
            return Err(self.truncated(section, dst.len(), available));
        }
        Ok(())
    }

    pub fn check_magic(&self, found: u32, expected: u32) -> Result<(), DatasetError> {
        if found != expected {
            return Err(DatasetError::FormatMismatch {
                origin: self.origin.clone(),
                detail: format!("magic number {found:#010x}, expected {expected:#010x}"),
            });
        }
        Ok(())
    }

    fn read_fields<const N: usize>(
        &mut self,
        section: &'static str,
    ) -> Result<[u32; N], DatasetError> {
        let mut raw = [[0u8; 4]; N];
        let mut read = 0;
        for field in raw.iter_mut() {
            let n = self.fill(field)?;
            read += n;
            if n < 4 {
                return Err(self.truncated(section, 4 * N, read));
            }
        }
        Ok(raw.map(decode_u32_be))
    }

    // Read until `buf` is full or the stream ends; returns the bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, DatasetError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DatasetError::Io {
                        origin: self.origin.clone(),
                        source,
                    })
                }
            }
        }
        Ok(filled)
    }

    fn truncated(&self, section: &'static str, expected: usize, available: usize) -> DatasetError {
        DatasetError::TruncatedInput {
            origin: self.origin.clone(),
            section,
            expected,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_most_significant_byte_first() {
        assert_eq!(decode_u32_be([0x00, 0x00, 0x00, 0x0A]), 10);
        assert_eq!(decode_u32_be([0x00, 0x00, 0x08, 0x03]), IMAGES_MAGIC);
        assert_eq!(decode_u32_be([0x00, 0x00, 0xEA, 0x60]), 60_000);
        assert_eq!(decode_u32_be([0x12, 0x34, 0x56, 0x78]), 0x1234_5678);
    }

    #[test]
    fn reads_images_header_fields_in_order() {
        let bytes: [u8; 16] = [0, 0, 8, 3, 0, 0, 0, 2, 0, 0, 0, 28, 0, 0, 0, 27];
        let mut reader = IdxReader::new(Cursor::new(bytes), "mem");
        let header = reader.read_images_header().unwrap();
        assert_eq!(
            header,
            ImagesHeader {
                magic: IMAGES_MAGIC,
                num_items: 2,
                num_rows: 28,
                num_cols: 27
            }
        );
        assert_eq!(header.image_len(), Some(28 * 27));
    }

    #[test]
    fn short_header_is_truncated_input() {
        let bytes: [u8; 6] = [0, 0, 8, 1, 0, 0];
        let mut reader = IdxReader::new(Cursor::new(bytes), "mem");
        match reader.read_labels_header() {
            Err(DatasetError::TruncatedInput {
                expected,
                available,
                ..
            }) => {
                assert_eq!(expected, LABELS_HEADER_LEN);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn magic_check_rejects_other_constants() {
        let reader = IdxReader::new(Cursor::new(Vec::<u8>::new()), "mem");
        assert!(reader.check_magic(LABELS_MAGIC, LABELS_MAGIC).is_ok());
        assert!(matches!(
            reader.check_magic(IMAGES_MAGIC, LABELS_MAGIC),
            Err(DatasetError::FormatMismatch { .. })
        ));
    }
}
