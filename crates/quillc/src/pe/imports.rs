//! Native import of `mscoree.dll!_CorExeMain`.
//!
//! The image imports exactly one function. Layout inside the section:
//!
//! ```text
//! ILT         [hint/name RVA, 0]
//! hint/name   u16 hint, "_CorExeMain\0"
//! IAT         [hint/name RVA, 0]
//! DLL name    "mscoree.dll\0"
//! directory   one descriptor + null descriptor
//! ```

use super::headers::DataDirectory;
use super::TextSection;
use crate::runtime_functions::imports::{COR_EXE_MAIN, MSCOREE};

const THUNK_TABLE_SIZE: u32 = 8;
const DESCRIPTOR_SIZE: u32 = 20;

/// Where the import structures ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTables {
    pub directory: DataDirectory,
    pub iat: DataDirectory,
}

pub fn write_imports(section: &mut TextSection) -> ImportTables {
    let ilt = section.rva();
    let ilt_slot = section.offset();
    section.data.write_u32(0);
    section.data.write_u32(0);

    let hint_name = section.rva();
    section.data.write_u16(0);
    section.data.write_bytes(COR_EXE_MAIN.as_bytes());
    section.data.write_u8(0);
    section.data.align(4);
    section.data.patch_u32(ilt_slot, hint_name);

    let iat = section.rva();
    section.data.write_u32(hint_name);
    section.data.write_u32(0);

    let dll_name = section.rva();
    section.data.write_bytes(MSCOREE.as_bytes());
    section.data.write_u8(0);
    section.data.align(4);

    let directory = section.rva();
    section.data.write_u32(ilt); // OriginalFirstThunk
    section.data.write_u32(0); // TimeDateStamp
    section.data.write_u32(0); // ForwarderChain
    section.data.write_u32(dll_name);
    section.data.write_u32(iat); // FirstThunk
    section.data.write_zeros(DESCRIPTOR_SIZE as usize);

    ImportTables {
        directory: DataDirectory {
            rva: directory,
            size: DESCRIPTOR_SIZE * 2,
        },
        iat: DataDirectory {
            rva: iat,
            size: THUNK_TABLE_SIZE,
        },
    }
}
