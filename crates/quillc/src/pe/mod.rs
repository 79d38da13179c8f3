//! PE/CLI executable assembler.
//!
//! The image has a single `.text` section that holds everything: import
//! tables, the entry point's method body, the metadata database, the CLI
//! header and a native trampoline jumping to `_CorExeMain`. The section is
//! built front to back; every structure records its RVA as it is written.
//! RVAs needed by the headers are late-bound and checked when the headers
//! are written.
//!
//! ```text
//! file 0x000  MS-DOS stub, PE signature, file/optional/section headers
//! file 0x200  .text (RVA 0x2000)
//!             ILT, hint/name, IAT, DLL name, import directory
//!             Main method body
//!             metadata root + streams
//!             CLI header
//!             64 zero bytes, jmp [IAT]
//! ```

pub mod headers;
pub mod imports;

use crate::bytes::{align_up_u32, ByteWriter};
use crate::config::BackendOptions;
use crate::constants::{
    self, cli, directory, flags, pe, signature, FILE_ALIGNMENT, IMAGE_BASE, SECTION_ALIGNMENT,
    TEXT_SECTION_RVA, TRAMPOLINE_PAD,
};
use crate::diagnostics::{InternalError, Result};
use crate::il;
use crate::metadata::coded::{MemberRefParent, ResolutionScope};
use crate::metadata::rows;
use crate::metadata::{MetadataBuilder, Row};
use crate::runtime_functions::{names, GREETING};
use headers::{CliHeader, DataDirectory, FileHeader, OptionalHeader, SectionHeader};
use std::path::{Path, PathBuf};

/// Section content plus the RVA its first byte maps to.
#[derive(Debug, Clone)]
pub struct TextSection {
    base_rva: u32,
    pub data: ByteWriter,
}

impl TextSection {
    pub fn new(base_rva: u32) -> Self {
        Self {
            base_rva,
            data: ByteWriter::new(),
        }
    }

    /// RVA of the next byte to be written.
    pub fn rva(&self) -> u32 {
        self.base_rva + self.data.len() as u32
    }

    /// Offset of the next byte to be written, relative to the section start.
    pub fn offset(&self) -> usize {
        self.data.len()
    }
}

/// A console executable for one module.
#[derive(Debug)]
pub struct ExecutableFile {
    source_path: PathBuf,
    module_name: String,
    options: BackendOptions,
    bytecode: TextSection,
    entry_point: Option<u32>,
    import_directory: Option<DataDirectory>,
    iat: Option<DataDirectory>,
    metadata: Option<DataDirectory>,
    cli_header: Option<DataDirectory>,
    entry_point_token: Option<u32>,
}

impl ExecutableFile {
    pub fn new(
        source_path: impl Into<PathBuf>,
        module_name: impl Into<String>,
        options: BackendOptions,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            module_name: module_name.into(),
            options,
            bytecode: TextSection::new(TEXT_SECTION_RVA),
            entry_point: None,
            import_directory: None,
            iat: None,
            metadata: None,
            cli_header: None,
            entry_point_token: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name of the image: module name plus the configured suffix.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.module_name, self.options.output_suffix)
    }

    /// Where the image is written: next to the source file.
    pub fn output_path(&self) -> PathBuf {
        crate::output::output_path(
            &self.source_path,
            &self.module_name,
            &self.options.output_suffix,
        )
    }

    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    pub fn entry_point_token(&self) -> Option<u32> {
        self.entry_point_token
    }

    pub fn metadata_directory(&self) -> Option<DataDirectory> {
        self.metadata
    }

    pub fn iat_directory(&self) -> Option<DataDirectory> {
        self.iat
    }

    /// Builds the section content. Fails if the image was already assembled.
    pub fn assemble(&mut self) -> Result<()> {
        if self.import_directory.is_some() {
            return Err(InternalError::AlreadyAssembled {
                image: self.file_name(),
            });
        }
        let imports = imports::write_imports(&mut self.bytecode);
        self.import_directory = Some(imports.directory);
        self.iat = Some(imports.iat);
        log::debug!(
            "imports at {:#x}, IAT at {:#x}",
            imports.directory.rva,
            imports.iat.rva
        );

        self.write_metadata()?;
        self.write_cli_header()?;
        self.write_trampoline(imports.iat.rva);
        self.bytecode.data.align(FILE_ALIGNMENT as usize);

        log::debug!(
            "{}: .text is {:#x} bytes, entry point {:#x}",
            self.file_name(),
            self.bytecode.data.len(),
            self.bytecode.rva()
        );
        Ok(())
    }

    fn write_metadata(&mut self) -> Result<()> {
        let mut md = MetadataBuilder::new(self.options.metadata_version.as_str());

        let file_name = self.file_name();
        let module_name = md.string(&file_name);
        let mvid = md.guid(self.options.module_guid().to_bytes_le());
        md.index(rows::Module {
            generation: 0,
            name: module_name,
            mvid,
            enc_id: 0,
            enc_base_id: 0,
        });

        let assembly_name = md.string(&self.module_name);
        md.index(rows::Assembly {
            hash_alg_id: flags::HASH_ALGORITHM_SHA1,
            version: [0, 0, 0, 0],
            flags: 0,
            public_key: 0,
            name: assembly_name,
            culture: 0,
        });

        let module_type = md.string(names::MODULE_TYPE);
        md.index(rows::TypeDef {
            flags: 0,
            name: module_type,
            namespace: 0,
            extends: None,
            field_list: 1,
            method_list: 1,
        });

        let token = md.blob(&self.options.runtime_public_key_token)?;
        let library = md.string(&self.options.runtime_library);
        let runtime = md.index(rows::AssemblyRef {
            version: self.options.runtime_library_version,
            flags: 0,
            public_key_or_token: token,
            name: library,
            culture: 0,
            hash_value: 0,
        });

        let console = md.string(names::CONSOLE);
        let system = md.string(names::SYSTEM);
        let console = md.index(rows::TypeRef {
            resolution_scope: ResolutionScope::AssemblyRef(runtime),
            name: console,
            namespace: system,
        });

        let write_line_name = md.string(names::WRITE_LINE);
        let write_line_sig = md.blob(&[
            signature::CALLCONV_DEFAULT,
            1,
            signature::ELEMENT_TYPE_VOID,
            signature::ELEMENT_TYPE_STRING,
        ])?;
        let write_line = md.token(rows::MemberRef {
            class: MemberRefParent::TypeRef(console),
            name: write_line_name,
            signature: write_line_sig,
        });

        let greeting = md.user_string(GREETING)?;

        let main_name = md.string(names::MAIN);
        let main_sig = md.blob(&[signature::CALLCONV_DEFAULT, 0, signature::ELEMENT_TYPE_VOID])?;
        let main = md.index(rows::MethodDef {
            rva: None,
            impl_flags: flags::METHOD_IMPL_IL,
            flags: flags::METHOD_PUBLIC_STATIC,
            name: main_name,
            signature: main_sig,
            param_list: 1,
        });
        self.entry_point_token = Some(<rows::MethodDef as Row>::TABLE.token(main));

        self.bytecode.data.align(4);
        let body_rva = self.bytecode.rva();
        if let Some(row) = md.row_mut::<rows::MethodDef>(main) {
            row.rva = Some(body_rva);
        }
        let body = il::entry_point(greeting, write_line)?;
        self.bytecode.data.write_bytes(&body);
        self.bytecode.data.align(4);

        let metadata = md.calculate_offsets()?;
        let bytes = metadata.serialize()?;
        let rva = self.bytecode.rva();
        self.bytecode.data.write_bytes(&bytes);
        self.metadata = Some(DataDirectory {
            rva,
            size: metadata.size(),
        });
        log::debug!(
            "Main body at {:#x}, metadata at {:#x} ({} bytes)",
            body_rva,
            rva,
            metadata.size()
        );
        Ok(())
    }

    fn write_cli_header(&mut self) -> Result<()> {
        let header = CliHeader {
            metadata: self
                .metadata
                .ok_or_else(|| InternalError::unset("CliHeader", "MetaData"))?,
            flags: cli::FLAGS_IL_ONLY,
            entry_point_token: self
                .entry_point_token
                .ok_or_else(|| InternalError::unset("CliHeader", "EntryPointToken"))?,
        };
        self.bytecode.data.align(4);
        let rva = self.bytecode.rva();
        header.write(&mut self.bytecode.data);
        self.cli_header = Some(DataDirectory {
            rva,
            size: cli::HEADER_SIZE,
        });
        Ok(())
    }

    // jmp dword ptr [IAT slot of _CorExeMain]
    fn write_trampoline(&mut self, iat_rva: u32) {
        self.bytecode.data.write_zeros(TRAMPOLINE_PAD);
        self.entry_point = Some(self.bytecode.rva());
        self.bytecode.data.write_bytes(&[0xff, 0x25]);
        self.bytecode.data.write_u32(IMAGE_BASE + iat_rva);
    }

    /// Headers followed by the section content.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let section_size = self.bytecode.data.len() as u32;

        let mut data_directories = [DataDirectory::default(); pe::DATA_DIRECTORY_COUNT];
        data_directories[directory::IMPORT] = self
            .import_directory
            .ok_or_else(|| InternalError::unset("OptionalHeader", "ImportTable"))?;
        data_directories[directory::IAT] = self
            .iat
            .ok_or_else(|| InternalError::unset("OptionalHeader", "IAT"))?;
        data_directories[directory::CLI_HEADER] = self
            .cli_header
            .ok_or_else(|| InternalError::unset("OptionalHeader", "CLIHeader"))?;

        let optional = OptionalHeader {
            size_of_code: section_size,
            address_of_entry_point: self
                .entry_point
                .ok_or_else(|| InternalError::unset("OptionalHeader", "AddressOfEntryPoint"))?,
            base_of_code: TEXT_SECTION_RVA,
            size_of_image: TEXT_SECTION_RVA + align_up_u32(section_size, SECTION_ALIGNMENT),
            size_of_headers: constants::TEXT_SECTION_FILE_OFFSET,
            data_directories,
        };

        let mut out = ByteWriter::new();
        headers::write_dos_stub(&mut out);
        out.write_u32(pe::SIGNATURE);
        FileHeader::default().write(&mut out);
        optional.write(&mut out);
        SectionHeader::text(section_size).write(&mut out);
        out.align(FILE_ALIGNMENT as usize);
        out.write_bytes(self.bytecode.data.as_bytes());
        Ok(out.finish())
    }
}
