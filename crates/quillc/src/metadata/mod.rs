//! CLI metadata database.
//!
//! Building the database happens in two phases. [`MetadataBuilder`] collects
//! heap entries and table rows; every insertion hands back a stable offset,
//! index or token that can be referenced right away. Once everything is in,
//! [`MetadataBuilder::calculate_offsets`] consumes the builder, serializes
//! and validates the tables, and lays out the root and stream headers. The
//! resulting [`Metadata`] is immutable and can only be serialized.
//!
//! ```text
//! +-----------------------+  offset 0 of the metadata root
//! | root header           |  BSJB, version 1.1, version string
//! | 5 stream headers      |  #Strings #US #Blob #GUID #~
//! | #Strings payload      |
//! | #US payload           |
//! | #Blob payload         |
//! | #GUID payload         |
//! | #~ tables stream      |  header, row counts, rows
//! +-----------------------+
//! ```

pub mod coded;
pub mod heap;
pub mod rows;
pub mod tables;

use crate::bytes::{align_up, ByteWriter};
use crate::constants::metadata::{
    ROOT_MAJOR_VERSION, ROOT_MINOR_VERSION, SIGNATURE, STREAM_COUNT, USER_STRING_TOKEN,
};
use crate::diagnostics::Result;
use heap::{BlobHeap, GuidHeap, StringHeap, UserStringHeap};
use tables::{HeapSizes, Tables};

pub use coded::{CodedIndex, CodedIndexKind};
pub use tables::{Row, TableId};

/// In-progress metadata database.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    version: String,
    strings: StringHeap,
    user_strings: UserStringHeap,
    blobs: BlobHeap,
    guids: GuidHeap,
    tables: Tables,
}

impl MetadataBuilder {
    /// Creates an empty database whose root carries `version`
    /// (for example `v2.0.50727`).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            strings: StringHeap::new(),
            user_strings: UserStringHeap::new(),
            blobs: BlobHeap::new(),
            guids: GuidHeap::new(),
            tables: Tables::default(),
        }
    }

    /// Adds an identifier to `#Strings` and returns its offset.
    pub fn string(&mut self, s: &str) -> u32 {
        self.strings.insert(s)
    }

    /// Adds a literal to `#US` and returns its `ldstr` token.
    pub fn user_string(&mut self, s: &str) -> Result<u32> {
        Ok(USER_STRING_TOKEN | self.user_strings.insert(s)?)
    }

    /// Adds a blob to `#Blob` and returns its offset.
    pub fn blob(&mut self, bytes: &[u8]) -> Result<u32> {
        self.blobs.insert(bytes)
    }

    /// Adds a GUID and returns the 1-based index metadata columns store.
    pub fn guid(&mut self, guid: [u8; 16]) -> u32 {
        self.guids.insert(guid) / 16 + 1
    }

    /// Appends a row and returns its 1-based index in its table.
    pub fn index<R: Row>(&mut self, row: R) -> u32 {
        R::table_mut(&mut self.tables).push(row)
    }

    /// Appends a row and returns its token.
    pub fn token<R: Row>(&mut self, row: R) -> u32 {
        R::TABLE.token(self.index(row))
    }

    /// Mutable access to an already inserted row, for late-bound columns.
    pub fn row_mut<R: Row>(&mut self, index: u32) -> Option<&mut R> {
        R::table_mut(&mut self.tables).get_mut(index)
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Lays out the database and freezes it.
    ///
    /// Fails if any row references a missing row or heap entry, or a
    /// late-bound column was never filled in.
    pub fn calculate_offsets(self) -> Result<Metadata> {
        let heaps = HeapSizes {
            strings: self.strings.heap().len(),
            blobs: self.blobs.heap().len(),
            guids: self.guids.count(),
        };
        let mut tables = self.tables.serialize(heaps)?;
        tables.resize(align_up(tables.len(), 4), 0);

        for table in self.tables.all() {
            if table.row_count() > 0 {
                log::trace!("{} table: {} rows", table.id().name(), table.row_count());
            }
        }

        let mut version = self.version.into_bytes();
        version.push(0);
        version.resize(align_up(version.len(), 4), 0);

        let payloads = [
            (STRINGS, self.strings.heap().as_bytes().to_vec()),
            (USER_STRINGS, self.user_strings.heap().as_bytes().to_vec()),
            (BLOBS, self.blobs.heap().as_bytes().to_vec()),
            (GUIDS, self.guids.heap().as_bytes().to_vec()),
            (TABLES, tables),
        ];

        // signature, major, minor, reserved, length, version, flags, streams
        let root_size = 16 + version.len() + 4;
        let headers_size: usize = payloads
            .iter()
            .map(|(name, _)| 8 + stream_name_size(name))
            .sum();

        let mut offset = (root_size + headers_size) as u32;
        let mut streams = Vec::with_capacity(payloads.len());
        for (name, data) in payloads {
            let header = StreamHeader {
                name,
                offset,
                size: data.len() as u32,
            };
            log::debug!(
                "stream {} at {:#x}, {} bytes",
                header.name,
                header.offset,
                header.size
            );
            offset += header.size;
            streams.push((header, data));
        }

        Ok(Metadata {
            version,
            valid_mask: self.tables.valid_mask(),
            streams,
            size: offset,
        })
    }
}

const STRINGS: &str = "#Strings";
const USER_STRINGS: &str = "#US";
const BLOBS: &str = "#Blob";
const GUIDS: &str = "#GUID";
const TABLES: &str = "#~";

// Name plus NUL terminator, padded to 4.
fn stream_name_size(name: &str) -> usize {
    align_up(name.len() + 1, 4)
}

/// Location of one stream, relative to the metadata root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub name: &'static str,
    pub offset: u32,
    pub size: u32,
}

/// Laid-out metadata database, ready to be written.
#[derive(Debug, Clone)]
pub struct Metadata {
    version: Vec<u8>,
    valid_mask: u64,
    streams: Vec<(StreamHeader, Vec<u8>)>,
    size: u32,
}

impl Metadata {
    /// Total size in bytes of the serialized database.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn valid_mask(&self) -> u64 {
        self.valid_mask
    }

    pub fn streams(&self) -> impl Iterator<Item = &StreamHeader> {
        self.streams.iter().map(|(header, _)| header)
    }

    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.streams().find(|s| s.name == name)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = ByteWriter::new();
        out.write_u32(SIGNATURE);
        out.write_u16(ROOT_MAJOR_VERSION);
        out.write_u16(ROOT_MINOR_VERSION);
        out.write_u32(0);
        out.write_u32(self.version.len() as u32);
        out.write_bytes(&self.version);
        out.write_u16(0);
        out.write_u16(STREAM_COUNT);

        for (header, _) in &self.streams {
            out.write_u32(header.offset);
            out.write_u32(header.size);
            out.write_bytes(header.name.as_bytes());
            out.write_u8(0);
            out.align(4);
        }
        for (_, data) in &self.streams {
            out.write_bytes(data);
        }
        Ok(out.finish())
    }
}

/// Tokens of rows are `(table << 24) | index`; this recovers both parts.
pub fn decode_token(token: u32) -> (u8, u32) {
    ((token >> 24) as u8, token & 0x00ff_ffff)
}
