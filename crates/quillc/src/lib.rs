pub mod backend;
pub mod bytes;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod env;
pub mod il;
pub mod ir;
pub mod lower;
pub mod metadata;
pub mod output;
pub mod pe;
pub mod runtime_functions;

pub use backend::{Backend, CliBackend, NullBackend};
pub use config::BackendOptions;
pub use diagnostics::InternalError;
pub use output::{FileSink, MemorySink, OutputSink};

use anyhow::Result;
use quill_ast as ast;
use std::path::PathBuf;

/// Generates the console executable for `program` with the binary CLI
/// backend and hands it to `sink`.
///
/// This is the main entry point for embedding the backend. Internal errors
/// are reported to stderr as diagnostics and returned.
pub fn generate(
    program: &ast::Program,
    options: &BackendOptions,
    sink: &mut dyn OutputSink,
) -> Result<PathBuf> {
    let backend = CliBackend::new(options.clone());
    log::debug!(
        "{} backend: generating module {}",
        backend.name(),
        program.module_name
    );
    let path = backend.generate(program, sink)?;
    path.ok_or_else(|| anyhow::anyhow!("{} backend produced no output", backend.name()))
}

/// Looks up a backend by its name.
pub fn backend_by_name(name: &str, options: &BackendOptions) -> Option<Box<dyn Backend>> {
    match name {
        "cli" => Some(Box::new(CliBackend::new(options.clone()))),
        "null" => Some(Box::new(NullBackend)),
        _ => None,
    }
}
