//! Fixed-layout PE/COFF and CLI header records.

use crate::bytes::ByteWriter;
use crate::constants::{self, cli, pe, IMAGE_BASE, SECTION_ALIGNMENT, FILE_ALIGNMENT};

/// RVA and size of a region of the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub rva: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn write(&self, out: &mut ByteWriter) {
        out.write_u32(self.rva);
        out.write_u32(self.size);
    }
}

/// Fields 0x00..0x3c of the MS-DOS header; the remainder is all zero.
const DOS_HEADER: [u8; 0x3c] = {
    let mut h = [0u8; 0x3c];
    h[0x00] = b'M';
    h[0x01] = b'Z';
    h[0x02] = 0x90; // bytes on last page
    h[0x04] = 0x03; // pages in file
    h[0x08] = 0x04; // header size in paragraphs
    h[0x0c] = 0xff; // maximum extra paragraphs
    h[0x0d] = 0xff;
    h[0x10] = 0xb8; // initial SP
    h[0x18] = 0x40; // relocation table offset
    h
};

/// Real-mode program printing the usual refusal and exiting.
const DOS_PROGRAM: &[u8] = b"\x0e\x1f\xba\x0e\x00\xb4\x09\xcd\x21\xb8\x01\x4c\xcd\x21\
This program cannot be run in DOS mode.\r\r\n$";

/// Writes the 128-byte MS-DOS stub whose `e_lfanew` points at the PE signature.
pub fn write_dos_stub(out: &mut ByteWriter) {
    let start = out.len();
    out.write_bytes(&DOS_HEADER);
    out.write_u32(pe::HEADER_OFFSET);
    out.write_bytes(DOS_PROGRAM);
    let written = out.len() - start;
    out.write_zeros(pe::HEADER_OFFSET as usize - written);
}

/// COFF file header.
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            machine: pe::MACHINE_I386,
            number_of_sections: 1,
            time_date_stamp: 0,
            size_of_optional_header: pe::OPTIONAL_HEADER_SIZE,
            characteristics: pe::FILE_CHARACTERISTICS,
        }
    }
}

impl FileHeader {
    pub fn write(&self, out: &mut ByteWriter) {
        out.write_u16(self.machine);
        out.write_u16(self.number_of_sections);
        out.write_u32(self.time_date_stamp);
        out.write_u32(0); // PointerToSymbolTable
        out.write_u32(0); // NumberOfSymbols
        out.write_u16(self.size_of_optional_header);
        out.write_u16(self.characteristics);
    }
}

/// PE32 optional header: standard fields, NT fields and data directories.
#[derive(Debug, Clone)]
pub struct OptionalHeader {
    pub size_of_code: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub data_directories: [DataDirectory; pe::DATA_DIRECTORY_COUNT],
}

impl OptionalHeader {
    pub fn write(&self, out: &mut ByteWriter) {
        out.write_u16(pe::OPTIONAL_HEADER_MAGIC);
        out.write_u8(6); // linker major
        out.write_u8(0); // linker minor
        out.write_u32(self.size_of_code);
        out.write_u32(0); // SizeOfInitializedData
        out.write_u32(0); // SizeOfUninitializedData
        out.write_u32(self.address_of_entry_point);
        out.write_u32(self.base_of_code);
        out.write_u32(0); // BaseOfData

        out.write_u32(IMAGE_BASE);
        out.write_u32(SECTION_ALIGNMENT);
        out.write_u32(FILE_ALIGNMENT);
        out.write_u16(5); // OS major
        out.write_u16(0);
        out.write_u16(0); // image version
        out.write_u16(0);
        out.write_u16(5); // subsystem major
        out.write_u16(0);
        out.write_u32(0); // Win32VersionValue
        out.write_u32(self.size_of_image);
        out.write_u32(self.size_of_headers);
        out.write_u32(0); // CheckSum
        out.write_u16(pe::SUBSYSTEM_CONSOLE);
        out.write_u16(0); // DllCharacteristics
        out.write_u32(pe::STACK_RESERVE);
        out.write_u32(pe::STACK_COMMIT);
        out.write_u32(pe::HEAP_RESERVE);
        out.write_u32(pe::HEAP_COMMIT);
        out.write_u32(0); // LoaderFlags
        out.write_u32(pe::DATA_DIRECTORY_COUNT as u32);

        for directory in &self.data_directories {
            directory.write(out);
        }
    }
}

/// Section table entry.
#[derive(Debug, Clone, Copy)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

impl SectionHeader {
    /// The single code section holding everything.
    pub fn text(size: u32) -> Self {
        Self {
            name: pe::TEXT_SECTION_NAME,
            virtual_size: size,
            virtual_address: constants::TEXT_SECTION_RVA,
            size_of_raw_data: size,
            pointer_to_raw_data: constants::TEXT_SECTION_FILE_OFFSET,
            characteristics: pe::TEXT_CHARACTERISTICS,
        }
    }

    pub fn write(&self, out: &mut ByteWriter) {
        out.write_bytes(&self.name);
        out.write_u32(self.virtual_size);
        out.write_u32(self.virtual_address);
        out.write_u32(self.size_of_raw_data);
        out.write_u32(self.pointer_to_raw_data);
        out.write_u32(0); // PointerToRelocations
        out.write_u32(0); // PointerToLinenumbers
        out.write_u16(0);
        out.write_u16(0);
        out.write_u32(self.characteristics);
    }
}

/// CLI header (ECMA-335 II.25.3.3).
#[derive(Debug, Clone, Copy)]
pub struct CliHeader {
    pub metadata: DataDirectory,
    pub flags: u32,
    pub entry_point_token: u32,
}

impl CliHeader {
    pub fn write(&self, out: &mut ByteWriter) {
        out.write_u32(cli::HEADER_SIZE);
        out.write_u16(cli::MAJOR_RUNTIME_VERSION);
        out.write_u16(cli::MINOR_RUNTIME_VERSION);
        self.metadata.write(out);
        out.write_u32(self.flags);
        out.write_u32(self.entry_point_token);
        // Resources, StrongNameSignature, CodeManagerTable, VTableFixups,
        // ExportAddressTableJumps, ManagedNativeHeader
        for _ in 0..6 {
            DataDirectory::default().write(out);
        }
    }
}
