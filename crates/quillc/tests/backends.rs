mod common;

use anyhow::Result;
use common::*;
use quillc::{backend_by_name, Backend, BackendOptions, CliBackend, FileSink, MemorySink, NullBackend};
use tempfile::tempdir;

#[test]
fn null_backend_writes_nothing() -> Result<()> {
    let x = global("x", number());
    let program = program("quiet", vec![assign(&x, num(3.0))]);
    let mut sink = MemorySink::new();
    let written = NullBackend.generate(&program, &mut sink)?;
    assert!(written.is_none());
    assert!(sink.outputs.is_empty());
    Ok(())
}

#[test]
fn backends_are_found_by_name() {
    let options = BackendOptions::default();
    let names: Vec<_> = ["cli", "null"]
        .iter()
        .filter_map(|name| backend_by_name(name, &options))
        .map(|backend| backend.name())
        .collect();
    assert_eq!(names, ["cli", "null"]);
    assert!(backend_by_name("c", &options).is_none());
}

#[test]
fn file_sink_writes_next_to_the_source() -> Result<()> {
    let dir = tempdir()?;
    let mut program = program("app", Vec::new());
    program.source_path = dir.path().join("src").join("app.quill");

    let mut sink = FileSink;
    let path = CliBackend::new(fixed_options())
        .generate(&program, &mut sink)?
        .ok_or_else(|| anyhow::anyhow!("no output"))?;
    assert_eq!(path, dir.path().join("src").join("app.exe"));

    let bytes = std::fs::read(&path)?;
    assert_eq!(&bytes[..2], b"MZ");
    assert_eq!(bytes.len() % 0x200, 0);
    Ok(())
}

#[test]
fn output_suffix_is_configurable() -> Result<()> {
    let options = BackendOptions {
        output_suffix: ".dll.exe".to_string(),
        ..fixed_options()
    };
    let mut sink = MemorySink::new();
    let path = quillc::generate(&program("lib", Vec::new()), &options, &mut sink)?;
    assert_eq!(path.to_string_lossy(), "lib.dll.exe");
    assert_eq!(sink.outputs.len(), 1);
    Ok(())
}

#[test]
fn options_load_from_a_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("backend.toml");
    std::fs::write(
        &path,
        "metadata_version = \"v4.0.30319\"\nmodule_guid = \"00000000-0000-0000-0000-000000000001\"\n",
    )?;
    let options = BackendOptions::load(&path)?;

    let mut sink = MemorySink::new();
    let out = quillc::generate(&program("v4", Vec::new()), &options, &mut sink)?;
    let image = sink.get(&out).ok_or_else(|| anyhow::anyhow!("no output"))?;
    assert!(image.windows(11).any(|w| w == b"v4.0.30319\0"));
    Ok(())
}
