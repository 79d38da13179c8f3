//! Runtime names referenced by the generated executable
//!
//! This module centralizes the names the CLI backend writes into the import
//! tables and the metadata string heap, so it is obvious what the emitted
//! image binds to when reading the assembler.

/// Names used in the PE import tables
pub mod imports {
    /// Native module that hosts the CLI runtime loader.
    pub const MSCOREE: &str = "mscoree.dll";

    /// Entry point of `mscoree.dll` that boots a managed executable.
    pub const COR_EXE_MAIN: &str = "_CorExeMain";
}

/// Names used in the metadata tables
pub mod names {
    /// Name of the pseudo-type that owns global methods.
    pub const MODULE_TYPE: &str = "<Module>";

    /// Entry point method.
    pub const MAIN: &str = "Main";

    /// Namespace of the console type.
    pub const SYSTEM: &str = "System";

    /// Console type: `System.Console`
    pub const CONSOLE: &str = "Console";

    /// Console output: `void System.Console::WriteLine(string)`
    pub const WRITE_LINE: &str = "WriteLine";
}

/// Literal printed by the generated entry point.
pub const GREETING: &str = "Hello World";
