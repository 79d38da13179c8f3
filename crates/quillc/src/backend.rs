//! Code generation backends
//!
//! - [`CliBackend`]: lowers the program and assembles a console executable
//! - [`NullBackend`]: lowers the program and writes nothing

use crate::config::BackendOptions;
use crate::diagnostics::{self, report_internal_error};
use crate::lower::LoweringContext;
use crate::output::OutputSink;
use crate::pe::ExecutableFile;
use anyhow::Result;
use quill_ast as ast;
use std::path::PathBuf;

/// A code generation backend.
pub trait Backend {
    /// Generate the artifact for `program` and hand it to `sink`.
    ///
    /// Returns the path written, or `None` when the backend produces nothing.
    fn generate(&self, program: &ast::Program, sink: &mut dyn OutputSink)
        -> Result<Option<PathBuf>>;

    /// Get backend name
    fn name(&self) -> &'static str;
}

/// Runs the lowering pass over every top-level declaration.
fn lower(program: &ast::Program) {
    let mut cx = LoweringContext::new(program);
    cx.lower_program();
}

/// The binary CLI backend.
#[derive(Debug, Clone, Default)]
pub struct CliBackend {
    pub options: BackendOptions,
}

impl CliBackend {
    pub fn new(options: BackendOptions) -> Self {
        Self { options }
    }

    fn assemble(&self, program: &ast::Program) -> diagnostics::Result<ExecutableFile> {
        let mut exe = ExecutableFile::new(
            program.source_path.clone(),
            program.module_name.clone(),
            self.options.clone(),
        );
        exe.assemble()?;
        Ok(exe)
    }
}

impl Backend for CliBackend {
    fn generate(
        &self,
        program: &ast::Program,
        sink: &mut dyn OutputSink,
    ) -> Result<Option<PathBuf>> {
        lower(program);

        let file = program.source_path.to_string_lossy();
        let path = crate::output::output_path(
            &program.source_path,
            &program.module_name,
            &self.options.output_suffix,
        );
        let note = format!("generating {}", path.display());
        let bytes = self
            .assemble(program)
            .and_then(|exe| exe.to_bytes())
            .map_err(|err| {
                report_internal_error(Some(file.as_ref()), err, Some(note.as_str()))
            })?;

        sink.write_output(&path, &bytes)?;
        Ok(Some(path))
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}

/// Validates that the program lowers; produces no output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn generate(
        &self,
        program: &ast::Program,
        _sink: &mut dyn OutputSink,
    ) -> Result<Option<PathBuf>> {
        lower(program);
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
