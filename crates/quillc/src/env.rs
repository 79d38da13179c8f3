//! Environment variable name constants and accessors
//!
//! All environment variables read by the backends are named here and should
//! be accessed through these functions rather than `std::env::var()`.

/// Environment variable names
pub mod names {
    /// Fixed module version GUID: `QUILL_MODULE_GUID`
    /// Makes the emitted executable byte-for-byte reproducible
    pub const MODULE_GUID: &str = "QUILL_MODULE_GUID";

    /// Metadata version string: `QUILL_METADATA_VERSION`
    /// Overrides the runtime version written into the metadata root
    pub const METADATA_VERSION: &str = "QUILL_METADATA_VERSION";
}

/// Get the fixed module GUID from environment
/// Returns `None` if not set
pub fn get_module_guid() -> Option<String> {
    std::env::var(names::MODULE_GUID).ok()
}

/// Get the metadata version string from environment
/// Returns `None` if not set
pub fn get_metadata_version() -> Option<String> {
    std::env::var(names::METADATA_VERSION).ok()
}
