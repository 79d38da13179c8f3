//! Where generated artifacts go.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Receives the bytes of each generated artifact.
pub trait OutputSink {
    fn write_output(&mut self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Writes artifacts to the file system, creating parent directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSink;

impl OutputSink for FileSink {
    fn write_output(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// Keeps artifacts in memory. Used by tests and by callers that post-process
/// the image themselves.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub outputs: Vec<(PathBuf, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the artifact written to `path`, the last one if written twice.
    pub fn get(&self, path: &Path) -> Option<&[u8]> {
        self.outputs
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl OutputSink for MemorySink {
    fn write_output(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.outputs.push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }
}

/// `<source dir>/<module name><suffix>`
pub fn output_path(source_path: &Path, module_name: &str, suffix: &str) -> PathBuf {
    let dir = source_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}{}", module_name, suffix))
}
