//! Diagnostic reporting for the Quill backends.
//!
//! Everything the backends receive has already passed type checking, so the
//! only failures that can happen here are internal ones: a generation method
//! that has no behaviour yet, a metadata reference to a row that does not
//! exist, a field that was never filled in, or a heap entry that exceeds the
//! encodings this assembler supports. All of them are represented by
//! [`InternalError`] and abort the generation pass.
//!
//! # Error Formatting
//!
//! - **Error messages**: Red "error:" prefix with clear description
//! - **Notes**: Blue "note:" annotation naming the offending construct

use std::sync::atomic::{AtomicBool, Ordering};

/// Result type alias for all fallible backend operations
pub type Result<T> = std::result::Result<T, InternalError>;

/// Internal inconsistency detected while generating code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// A generation method was reached that has no behaviour for this construct.
    #[error("code generation for {construct} is not implemented")]
    Unimplemented { construct: String },

    /// `generate_call` on something that does not denote a callable.
    #[error("{construct} is not callable")]
    NotCallable { construct: String },

    /// Heap entry larger than the single-byte length encoding allows.
    #[error("{heap} heap entry of length {len} exceeds the supported maximum of {limit}")]
    HeapEntryTooLarge {
        heap: &'static str,
        len: usize,
        limit: usize,
    },

    /// Heap offset that does not point inside the heap.
    #[error("{table} row {row} column {column}: {heap} heap offset {offset:#x} is out of range")]
    BadHeapReference {
        table: &'static str,
        row: u32,
        column: &'static str,
        heap: &'static str,
        offset: u32,
    },

    /// Row index that does not name an existing row of the target table.
    #[error("{table} row {row} column {column}: {target} row {index} does not exist")]
    DanglingReference {
        table: &'static str,
        row: u32,
        column: &'static str,
        target: &'static str,
        index: u32,
    },

    /// Coded index whose target table has no tag in its kind.
    #[error("{table} row {row} column {column}: {target} cannot be referenced through {kind}")]
    InvalidCodedIndex {
        table: &'static str,
        row: u32,
        column: &'static str,
        kind: &'static str,
        target: &'static str,
    },

    /// Late-bound field that was never filled in before serialization.
    #[error("{record} field {field} was never set")]
    UnsetField {
        record: &'static str,
        field: &'static str,
    },

    /// Image content was already laid out; assembling again would duplicate it.
    #[error("{image} was already assembled")]
    AlreadyAssembled { image: String },

    /// Instruction popped more values than the evaluation stack holds.
    #[error("instruction {opcode} pops {pops} values but the evaluation stack holds {depth}")]
    StackUnderflow {
        opcode: &'static str,
        pops: u16,
        depth: u16,
    },
}

impl InternalError {
    pub fn unimplemented(construct: impl Into<String>) -> Self {
        InternalError::Unimplemented {
            construct: construct.into(),
        }
    }

    pub fn unset(record: &'static str, field: &'static str) -> Self {
        InternalError::UnsetField { record, field }
    }
}

/// Shorthand for generation methods that have no behaviour yet.
pub fn unimplemented<T>(construct: impl Into<String>) -> Result<T> {
    Err(InternalError::unimplemented(construct))
}

/// Prints a compact, rustc-style diagnostic message to stderr.
///
/// # Example Output
/// ```text
/// error: internal compiler error: code generation for numeric addition is not implemented
///   --> hello.quill
/// note: generating hello.exe
/// ```
pub fn report_error(file: Option<&str>, message: &str, note: Option<&str>) {
    if !DIAGNOSTICS_ENABLED.load(Ordering::SeqCst) {
        return;
    }

    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    eprintln!("{}error{}: {}", red, reset, message);
    if let Some(path) = file {
        eprintln!("  --> {}", sanitize_file_path(path));
    }

    if let Some(note) = note {
        let blue = "\x1b[34m";
        eprintln!("{}note{}: {}", blue, reset, note);
    }
}

/// Reports an internal error and converts it for callers that terminate via `?`.
pub fn report_internal_error(
    file: Option<&str>,
    err: InternalError,
    note: Option<&str>,
) -> anyhow::Error {
    report_error(file, &format!("internal compiler error: {}", err), note);
    anyhow::Error::new(err)
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(true);

// Only the file name is shown; the rest of the path is environment noise.
fn sanitize_file_path(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string()
}

/// Temporarily suppresses diagnostic output for testing scenarios.
///
/// The returned guard restores the previous state when dropped.
///
/// ```rust
/// let _guard = quillc::diagnostics::suppress();
/// // Diagnostics are now silenced within this scope
/// ```
pub fn suppress() -> SuppressGuard {
    let prev = DIAGNOSTICS_ENABLED.swap(false, Ordering::SeqCst);
    SuppressGuard { prev }
}

/// Whether diagnostics are currently printed.
pub fn diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::SeqCst)
}

/// RAII guard that manages diagnostic output state.
pub struct SuppressGuard {
    prev: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        DIAGNOSTICS_ENABLED.store(self.prev, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimplemented_names_the_construct() {
        let err = unimplemented::<()>("numeric addition").unwrap_err();
        assert_eq!(
            err.to_string(),
            "code generation for numeric addition is not implemented"
        );
    }

    #[test]
    fn dangling_reference_message_locates_the_column() {
        let err = InternalError::DanglingReference {
            table: "MemberRef",
            row: 1,
            column: "class",
            target: "TypeRef",
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "MemberRef row 1 column class: TypeRef row 3 does not exist"
        );
    }

    #[test]
    fn sanitize_keeps_only_the_file_name() {
        assert_eq!(sanitize_file_path("/home/user/src/hello.quill"), "hello.quill");
        assert_eq!(sanitize_file_path("/"), "file");
    }
}
