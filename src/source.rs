//! Byte sources feeding the document parser.
//!
//! The parser pulls its input through the [`ByteSource`] trait, one byte at
//! a time, so it never cares where a document lives. [`SliceSource`] serves
//! an in-memory buffer; [`InflateSource`] (feature `inflate`) unpacks a
//! deflate-compressed blob, the form in which a document rides inside an
//! FPGA bitstream. Hosts reading from a filesystem implement the trait over
//! their own storage layer.

#[cfg(feature = "inflate")]
use alloc::vec::Vec;

/// Pull-based byte supplier for the document parser.
pub trait ByteSource {
    /// Get the next document byte, or `None` at end of input.
    fn next_byte(&mut self) -> Option<u8>;
}

/// Byte source over a borrowed in-memory buffer.
#[derive(Debug)]
pub struct SliceSource<'a> {
    /// Document bytes
    data: &'a [u8],

    /// Read position
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }
}

/// Byte source over a deflate-compressed buffer.
///
/// The blob is unpacked up front; the parser then streams from the
/// decompressed bytes. Expects a raw deflate stream without a zlib or gzip
/// header.
#[cfg(feature = "inflate")]
#[derive(Debug)]
pub struct InflateSource {
    /// Decompressed document bytes
    data: Vec<u8>,

    /// Read position
    pos: usize,
}

#[cfg(feature = "inflate")]
impl InflateSource {
    /// Unpack `compressed` and create a source over the result.
    ///
    /// Returns `None` on a corrupt stream, which the host treats the same
    /// as a missing document.
    pub fn new(compressed: &[u8]) -> Option<Self> {
        match miniz_oxide::inflate::decompress_to_vec(compressed) {
            Ok(data) => Some(Self { data, pos: 0 }),
            Err(err) => {
                log::warn!("inflate: corrupt document stream: {:?}", err.status);
                None
            }
        }
    }

    /// Size of the decompressed document.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the decompressed document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(feature = "inflate")]
impl ByteSource for InflateSource {
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        byte
    }
}
