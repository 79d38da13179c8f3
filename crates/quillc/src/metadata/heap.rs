//! Append-only metadata heaps.
//!
//! A heap is a byte buffer plus a cursor. Inserting returns the offset at
//! which the entry starts; offsets are never invalidated. There is no
//! deduplication, so inserting the same content twice allocates it twice.
//! Every entry is zero-padded to a 4-byte boundary, which keeps each stream
//! size a multiple of four. Padding bytes read as empty entries.

use crate::constants::metadata::{MAX_BLOB_LENGTH, MAX_USER_STRING_LENGTH};
use crate::diagnostics::{InternalError, Result};

const ENTRY_ALIGNMENT: usize = 4;

/// Raw append-only buffer shared by the four heap kinds.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    data: Vec<u8>,
}

impl Heap {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Appends `bytes` at the current end and returns their offset.
    pub fn insert(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(bytes);
        let padded = crate::bytes::align_up(self.data.len(), ENTRY_ALIGNMENT);
        self.data.resize(padded, 0);
        offset
    }

    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// `#Strings`: NUL-terminated UTF-8 identifiers. Offset 0 is the empty string.
#[derive(Debug, Clone)]
pub struct StringHeap {
    heap: Heap,
}

impl StringHeap {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        heap.insert(&[0]);
        Self { heap }
    }

    pub fn insert(&mut self, s: &str) -> u32 {
        let mut bytes = Vec::with_capacity(s.len() + 1);
        bytes.extend_from_slice(s.as_bytes());
        bytes.push(0);
        self.heap.insert(&bytes)
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }
}

impl Default for StringHeap {
    fn default() -> Self {
        Self::new()
    }
}

/// `#US`: length-prefixed UTF-16LE literals with a trailing flag byte.
#[derive(Debug, Clone)]
pub struct UserStringHeap {
    heap: Heap,
}

impl UserStringHeap {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        heap.insert(&[0]);
        Self { heap }
    }

    /// Inserts a literal and returns its heap offset (not yet a token).
    ///
    /// Only single-byte lengths are encoded, so at most 0x3f UTF-16 code
    /// units are accepted.
    pub fn insert(&mut self, s: &str) -> Result<u32> {
        let units: Vec<u16> = s.encode_utf16().collect();
        if units.len() > MAX_USER_STRING_LENGTH {
            return Err(InternalError::HeapEntryTooLarge {
                heap: "#US",
                len: units.len(),
                limit: MAX_USER_STRING_LENGTH,
            });
        }

        let mut bytes = Vec::with_capacity(units.len() * 2 + 2);
        bytes.push((units.len() * 2 + 1) as u8);
        for unit in &units {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.push(u8::from(units.iter().any(|&u| needs_special_handling(u))));
        Ok(self.heap.insert(&bytes))
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }
}

impl Default for UserStringHeap {
    fn default() -> Self {
        Self::new()
    }
}

// ECMA-335 II.24.2.4: the trailing byte is 1 when any code unit has a
// non-zero high byte or a low byte in one of these ranges.
fn needs_special_handling(unit: u16) -> bool {
    let [low, high] = unit.to_le_bytes();
    high != 0 || matches!(low, 0x01..=0x08 | 0x0e..=0x1f | 0x27 | 0x2d | 0x7f)
}

/// `#Blob`: length-prefixed binary values (signatures, public keys).
#[derive(Debug, Clone)]
pub struct BlobHeap {
    heap: Heap,
}

impl BlobHeap {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        heap.insert(&[0]);
        Self { heap }
    }

    /// Inserts a blob and returns its offset.
    ///
    /// Lengths use the single-byte compressed form only; anything longer
    /// than 0x7f bytes is rejected rather than silently corrupting the heap.
    pub fn insert(&mut self, blob: &[u8]) -> Result<u32> {
        if blob.len() > MAX_BLOB_LENGTH {
            return Err(InternalError::HeapEntryTooLarge {
                heap: "#Blob",
                len: blob.len(),
                limit: MAX_BLOB_LENGTH,
            });
        }
        let mut bytes = Vec::with_capacity(blob.len() + 1);
        bytes.push(blob.len() as u8);
        bytes.extend_from_slice(blob);
        Ok(self.heap.insert(&bytes))
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }
}

impl Default for BlobHeap {
    fn default() -> Self {
        Self::new()
    }
}

/// `#GUID`: 16-byte entries.
#[derive(Debug, Clone, Default)]
pub struct GuidHeap {
    heap: Heap,
}

impl GuidHeap {
    pub fn new() -> Self {
        Self { heap: Heap::new() }
    }

    /// Inserts a GUID (in its little-endian memory layout) and returns its offset.
    pub fn insert(&mut self, guid: [u8; 16]) -> u32 {
        self.heap.insert(&guid)
    }

    /// Number of GUIDs stored; metadata columns index them from 1.
    pub fn count(&self) -> u32 {
        self.heap.len() / 16
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_strictly_increasing_and_size_tracks_the_last_entry() {
        let mut heap = StringHeap::new();
        let words = ["System", "Console", "WriteLine", "a", ""];
        let mut previous = None;
        let mut last = 0;
        for word in words {
            let offset = heap.insert(word);
            if let Some(prev) = previous {
                assert!(offset > prev, "{} should follow {}", offset, prev);
            }
            previous = Some(offset);
            last = offset + crate::bytes::align_up_u32(word.len() as u32 + 1, 4);
        }
        assert_eq!(heap.heap().len(), last);
    }

    #[test]
    fn string_heap_starts_with_the_empty_string() {
        let mut heap = StringHeap::new();
        assert_eq!(heap.heap().as_bytes()[0], 0);
        assert_eq!(heap.insert("Main"), 4);
        assert_eq!(&heap.heap().as_bytes()[4..12], b"Main\0\0\0\0");
    }

    #[test]
    fn identical_strings_are_not_deduplicated() {
        let mut heap = StringHeap::new();
        let first = heap.insert("Main");
        let second = heap.insert("Main");
        assert_ne!(first, second);
    }

    #[test]
    fn user_strings_are_utf16_with_length_and_flag() -> Result<()> {
        let mut heap = UserStringHeap::new();
        let offset = heap.insert("Hi")?;
        assert_eq!(offset, 4);
        assert_eq!(&heap.heap().as_bytes()[4..10], &[5, b'H', 0, b'i', 0, 0]);
        Ok(())
    }

    #[test]
    fn user_string_flag_marks_special_characters() -> Result<()> {
        let mut heap = UserStringHeap::new();
        let offset = heap.insert("é")? as usize;
        let bytes = heap.heap().as_bytes();
        assert_eq!(bytes[offset], 3);
        assert_eq!(bytes[offset + 3], 0);
        let offset = heap.insert("a-b")? as usize;
        let bytes = heap.heap().as_bytes();
        assert_eq!(bytes[offset + 7], 1);
        Ok(())
    }

    #[test]
    fn user_string_length_limit_is_enforced() {
        let mut heap = UserStringHeap::new();
        assert!(heap.insert(&"x".repeat(0x3f)).is_ok());
        let err = heap.insert(&"x".repeat(0x40)).unwrap_err();
        assert!(matches!(
            err,
            InternalError::HeapEntryTooLarge { heap: "#US", len: 0x40, .. }
        ));
    }

    #[test]
    fn blob_length_limit_is_enforced() -> Result<()> {
        let mut heap = BlobHeap::new();
        let offset = heap.insert(&[0u8; 0x7f])?;
        assert_eq!(heap.heap().as_bytes()[offset as usize], 0x7f);
        assert!(heap.insert(&[0u8; 0x80]).is_err());
        Ok(())
    }

    #[test]
    fn guid_heap_counts_entries() {
        let mut heap = GuidHeap::new();
        assert_eq!(heap.insert([1; 16]), 0);
        assert_eq!(heap.insert([2; 16]), 16);
        assert_eq!(heap.count(), 2);
    }
}
