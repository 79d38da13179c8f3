mod common;

use anyhow::Result;
use common::*;
use quillc::{generate, MemorySink};
use std::path::Path;

fn hello_world() -> Result<Vec<u8>> {
    let mut sink = MemorySink::new();
    let program = program("hello", vec![null_stmt()]);
    let path = generate(&program, &fixed_options(), &mut sink)?;
    assert_eq!(path, Path::new("hello.exe"));
    sink.get(&path)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| anyhow::anyhow!("nothing written to {}", path.display()))
}

#[test]
fn image_starts_with_dos_and_pe_headers() -> Result<()> {
    let image = hello_world()?;
    assert_eq!(&image[..2], b"MZ");
    let pe = read_u32(&image, 0x3c) as usize;
    assert_eq!(pe, 0x80);
    assert_eq!(&image[pe..pe + 4], b"PE\0\0");
    assert_eq!(read_u16(&image, pe + 4), 0x14c);
    assert_eq!(read_u16(&image, pe + 6), 1);
    assert_eq!(read_u16(&image, pe + 24), 0x10b);

    let section = pe + 24 + 0xe0;
    assert_eq!(&image[section..section + 8], b".text\0\0\0");
    assert_eq!(read_u32(&image, section + 12), 0x2000);
    assert_eq!(read_u32(&image, section + 20), 0x200);
    assert_eq!(read_u32(&image, section + 36), 0x6000_0020);

    let raw_size = read_u32(&image, section + 16) as usize;
    assert_eq!(image.len(), 0x200 + raw_size);
    assert_eq!(raw_size % 0x200, 0);
    Ok(())
}

#[test]
fn import_directories_point_at_mscoree() -> Result<()> {
    let image = hello_world()?;
    assert_eq!(data_directory(&image, 1), (0x202c, 40));
    assert_eq!(data_directory(&image, 12), (0x2018, 8));

    let (import, _) = data_directory(&image, 1);
    let name = read_u32(&image, file_offset(import) + 12);
    let at = file_offset(name);
    assert_eq!(&image[at..at + 12], b"mscoree.dll\0");
    Ok(())
}

#[test]
fn entry_point_is_a_jump_through_the_iat() -> Result<()> {
    let image = hello_world()?;
    let pe = read_u32(&image, 0x3c) as usize;
    let entry = read_u32(&image, pe + 24 + 16);
    let at = file_offset(entry);
    assert_eq!(&image[at..at + 2], &[0xff, 0x25]);
    assert_eq!(read_u32(&image, at + 2), 0x0040_0000 + 0x2018);
    assert!(image[at - 64..at].iter().all(|b| *b == 0));
    Ok(())
}

#[test]
fn cli_header_locates_the_metadata_root() -> Result<()> {
    let image = hello_world()?;
    let (cli, size) = data_directory(&image, 14);
    assert_eq!(size, 72);

    let header = file_offset(cli);
    assert_eq!(read_u32(&image, header), 72);
    assert_eq!(read_u16(&image, header + 4), 2);
    assert_eq!(read_u16(&image, header + 6), 0);
    assert_eq!(read_u32(&image, header + 16), 1);
    assert_eq!(read_u32(&image, header + 20), 0x0600_0001);

    let root = file_offset(read_u32(&image, header + 8));
    assert_eq!(&image[root..root + 4], b"BSJB");
    assert_eq!(read_u32(&image, root + 12), 12);
    assert_eq!(&image[root + 16..root + 26], b"v2.0.50727");
    assert_eq!(read_u16(&image, root + 30), 5);
    assert_eq!(&image[root + 40..root + 49], b"#Strings\0");
    Ok(())
}

#[test]
fn tables_stream_lists_the_populated_tables() -> Result<()> {
    let image = hello_world()?;
    let (cli, _) = data_directory(&image, 14);
    let root = file_offset(read_u32(&image, file_offset(cli) + 8));

    // stream headers follow the 32-byte root; #~ is the fifth
    let mut at = root + 32;
    for name in ["#Strings", "#US", "#Blob", "#GUID"] {
        at += 8 + (name.len() + 1 + 3) / 4 * 4;
    }
    assert_eq!(&image[at + 8..at + 11], b"#~\0");
    let tables = root + read_u32(&image, at) as usize;

    assert_eq!(read_u32(&image, tables), 0);
    assert_eq!(&image[tables + 4..tables + 8], &[2, 0, 0x07, 1]);
    let valid = u64::from(read_u32(&image, tables + 8))
        | u64::from(read_u32(&image, tables + 12)) << 32;
    assert_eq!(valid, 0x0000_0009_0000_0447);
    let sorted = u64::from(read_u32(&image, tables + 16))
        | u64::from(read_u32(&image, tables + 20)) << 32;
    assert_eq!(sorted, 0x0000_1600_3301_fa00);

    // one row each, in ascending table order
    for i in 0..7 {
        assert_eq!(read_u32(&image, tables + 24 + i * 4), 1);
    }
    Ok(())
}

#[test]
fn main_prints_the_greeting() -> Result<()> {
    let image = hello_world()?;
    assert_eq!(
        &image[0x254..0x260],
        &[0x2e, 0x72, 0x04, 0, 0, 0x70, 0x28, 0x01, 0, 0, 0x0a, 0x2a]
    );

    // "Hello World" in UTF-16 somewhere in #US
    let greeting: Vec<u8> = "Hello World"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    assert!(image
        .windows(greeting.len())
        .any(|w| w == greeting.as_slice()));
    Ok(())
}
