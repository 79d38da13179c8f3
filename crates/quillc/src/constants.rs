//! Magic numbers and fixed layout values of the PE/CLI image format
//!
//! This module centralizes the constants the executable assembler writes so
//! that every magic number is traceable to one definition. Values follow
//! ECMA-335 partition II and the PE/COFF specification.

/// Preferred load address of the image.
pub const IMAGE_BASE: u32 = 0x0040_0000;

/// Alignment of sections once mapped into memory.
pub const SECTION_ALIGNMENT: u32 = 0x2000;

/// Alignment of section data in the file.
pub const FILE_ALIGNMENT: u32 = 0x200;

/// RVA of the single `.text` section (first section-aligned address).
pub const TEXT_SECTION_RVA: u32 = SECTION_ALIGNMENT;

/// File offset of the `.text` section data (headers fill the first block).
pub const TEXT_SECTION_FILE_OFFSET: u32 = FILE_ALIGNMENT;

/// Zero bytes placed before the native entry trampoline. At least one
/// consuming loader reads past the end of the import data.
pub const TRAMPOLINE_PAD: usize = 64;

/// PE/COFF header values
pub mod pe {
    /// `PE\0\0`
    pub const SIGNATURE: u32 = 0x0000_4550;

    /// File offset of the PE signature, stored at 0x3C of the MS-DOS header.
    pub const HEADER_OFFSET: u32 = 0x80;

    /// IMAGE_FILE_MACHINE_I386
    pub const MACHINE_I386: u16 = 0x014c;

    /// IMAGE_FILE_EXECUTABLE_IMAGE | IMAGE_FILE_32BIT_MACHINE
    pub const FILE_CHARACTERISTICS: u16 = 0x0102;

    /// PE32 optional header magic.
    pub const OPTIONAL_HEADER_MAGIC: u16 = 0x010b;

    /// Size of the PE32 optional header including 16 data directories.
    pub const OPTIONAL_HEADER_SIZE: u16 = 0xe0;

    pub const DATA_DIRECTORY_COUNT: usize = 16;

    /// IMAGE_SUBSYSTEM_WINDOWS_CUI
    pub const SUBSYSTEM_CONSOLE: u16 = 3;

    /// `.text\0\0\0`
    pub const TEXT_SECTION_NAME: [u8; 8] = *b".text\0\0\0";

    /// IMAGE_SCN_CNT_CODE | IMAGE_SCN_MEM_EXECUTE | IMAGE_SCN_MEM_READ
    pub const TEXT_CHARACTERISTICS: u32 = 0x6000_0020;

    pub const STACK_RESERVE: u32 = 0x0010_0000;
    pub const STACK_COMMIT: u32 = 0x1000;
    pub const HEAP_RESERVE: u32 = 0x0010_0000;
    pub const HEAP_COMMIT: u32 = 0x1000;
}

/// Data directory slots of the optional header.
pub mod directory {
    pub const IMPORT: usize = 1;
    pub const IAT: usize = 12;
    pub const CLI_HEADER: usize = 14;
}

/// CLI header (ECMA-335 II.25.3.3) values
pub mod cli {
    /// Size of the CLI header in bytes.
    pub const HEADER_SIZE: u32 = 72;

    pub const MAJOR_RUNTIME_VERSION: u16 = 2;
    pub const MINOR_RUNTIME_VERSION: u16 = 0;

    /// COMIMAGE_FLAGS_ILONLY
    pub const FLAGS_IL_ONLY: u32 = 0x0000_0001;
}

/// Metadata root and table stream values
pub mod metadata {
    /// `BSJB`
    pub const SIGNATURE: u32 = 0x424a_5342;

    pub const ROOT_MAJOR_VERSION: u16 = 1;
    pub const ROOT_MINOR_VERSION: u16 = 1;

    /// Always five streams, in this order.
    pub const STREAM_COUNT: u16 = 5;

    pub const TABLES_MAJOR_VERSION: u8 = 2;
    pub const TABLES_MINOR_VERSION: u8 = 0;

    /// String, GUID and Blob heap indexes are all 4 bytes wide.
    pub const HEAP_SIZES: u8 = 0x07;

    /// Reserved byte after `HeapSizes`; always 1.
    pub const RESERVED2: u8 = 1;

    /// Token type of a user string, which addresses the #US heap directly.
    pub const USER_STRING_TOKEN: u32 = 0x7000_0000;

    /// Largest single-byte compressed length.
    pub const MAX_BLOB_LENGTH: usize = 0x7f;

    /// Largest user string: `2 * len + 1` must fit a single-byte length.
    pub const MAX_USER_STRING_LENGTH: usize = 0x3f;
}

/// Method body header values (ECMA-335 II.25.4)
pub mod method {
    /// CorILMethod_TinyFormat
    pub const TINY_FORMAT: u8 = 0x2;

    /// CorILMethod_FatFormat
    pub const FAT_FORMAT: u16 = 0x3;

    /// CorILMethod_InitLocals
    pub const INIT_LOCALS: u16 = 0x10;

    /// Fat header size in 4-byte units, stored in the top nibble of the flags.
    pub const FAT_HEADER_DWORDS: u16 = 3;

    /// Tiny bodies carry a 6-bit code size.
    pub const TINY_MAX_CODE_SIZE: u32 = 0x3f;

    /// Evaluation stack depth implied by the tiny format.
    pub const TINY_MAX_STACK: u16 = 8;
}

/// Row flag values used by the assembler
pub mod flags {
    /// MethodAttributes: Public | Static | HideBySig
    pub const METHOD_PUBLIC_STATIC: u16 = 0x0006 | 0x0010 | 0x0080;

    /// MethodImplAttributes: IL | Managed
    pub const METHOD_IMPL_IL: u16 = 0x0000;

    /// AssemblyHashAlgorithm: SHA1
    pub const HASH_ALGORITHM_SHA1: u32 = 0x8004;
}

/// Signature blob elements (ECMA-335 II.23.2)
pub mod signature {
    pub const CALLCONV_DEFAULT: u8 = 0x00;
    pub const ELEMENT_TYPE_VOID: u8 = 0x01;
    pub const ELEMENT_TYPE_STRING: u8 = 0x0e;
}
