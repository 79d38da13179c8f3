//! Environment overrides of the backend options.
//!
//! Everything runs in one test: the process environment is shared by all
//! tests of a binary.

mod common;

use anyhow::Result;
use common::*;
use quillc::env::names::{METADATA_VERSION, MODULE_GUID};
use quillc::{generate, BackendOptions, MemorySink};
use uuid::Uuid;

#[test]
fn environment_overrides_options() -> Result<()> {
    std::env::remove_var(MODULE_GUID);
    std::env::remove_var(METADATA_VERSION);
    let untouched = BackendOptions::default().with_env_overrides()?;
    assert_eq!(untouched, BackendOptions::default());

    // valid GUID
    std::env::set_var(MODULE_GUID, " 2c1b0d3a-8f6e-4b8e-9a43-0f8a7c4d2e11 ");
    let options = BackendOptions::default().with_env_overrides()?;
    let guid = Uuid::parse_str("2c1b0d3a-8f6e-4b8e-9a43-0f8a7c4d2e11")?;
    assert_eq!(options.module_guid, Some(guid));
    assert_eq!(options.module_guid(), guid);

    // malformed GUID
    std::env::set_var(MODULE_GUID, "not-a-guid");
    let err = BackendOptions::default().with_env_overrides().unwrap_err();
    assert!(err.to_string().contains(MODULE_GUID), "{}", err);
    std::env::remove_var(MODULE_GUID);

    // metadata version reaches the metadata root
    std::env::set_var(METADATA_VERSION, "v4.0.30319");
    let options = fixed_options().with_env_overrides()?;
    std::env::remove_var(METADATA_VERSION);
    assert_eq!(options.metadata_version, "v4.0.30319");

    let mut sink = MemorySink::new();
    let path = generate(&program("hello", Vec::new()), &options, &mut sink)?;
    let image = sink.get(&path).ok_or_else(|| anyhow::anyhow!("no output"))?;
    let (cli, _) = data_directory(image, 14);
    let root = file_offset(read_u32(image, file_offset(cli) + 8));
    assert_eq!(&image[root..root + 4], b"BSJB");
    assert_eq!(read_u32(image, root + 12), 12);
    assert_eq!(&image[root + 16..root + 28], b"v4.0.30319\0\0");
    Ok(())
}
