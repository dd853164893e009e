use byteorder::{ByteOrder, LE};
use std::fs;
use std::path::{Path, MAIN_SEPARATOR};
use std::process::Command;

/// PE32+ image with NT headers at 0x80.
fn image(stamp: u32, size: u32, sum: u32) -> Vec<u8> {
    let mut img = vec![0u8; 0x80 + 4 + 20 + 240];
    LE::write_u16(&mut img, 0x5a4d);
    LE::write_u32(&mut img[0x3c..], 0x80);
    img[0x80..0x84].copy_from_slice(b"PE\0\0");
    LE::write_u32(&mut img[0x84 + 4..], stamp);
    LE::write_u16(&mut img[0x84 + 16..], 240);
    let opt = 0x84 + 20;
    LE::write_u16(&mut img[opt..], 0x20b);
    LE::write_u32(&mut img[opt + 56..], size);
    LE::write_u32(&mut img[opt + 64..], sum);
    img
}

/// Dump with a single module-list stream holding one record at offset 48.
fn dump() -> Vec<u8> {
    let mut d = vec![0u8; 32 + 12 + 4 + 108];
    d[..4].copy_from_slice(b"MDMP");
    LE::write_u32(&mut d[8..], 1);
    LE::write_u32(&mut d[12..], 32);
    LE::write_u32(&mut d[16..], 0xffff_ffff);
    LE::write_u32(&mut d[32..], 4);
    LE::write_u32(&mut d[36..], 112);
    LE::write_u32(&mut d[40..], 44);
    LE::write_u32(&mut d[44..], 1);
    d
}

fn remapdump(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_remapdump"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn remaps_every_dump_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.exe"), image(0x1111, 0x2222, 0x3333)).unwrap();
    fs::write(dir.path().join("one.dmp"), dump()).unwrap();
    fs::write(dir.path().join("two.dmp"), b"not a dump").unwrap();

    let out = remapdump(dir.path(), &["app.exe"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("one.dmp to app.exe"));
    assert!(stdout.contains("** Failed to remap two.dmp"));

    let patched = fs::read(dir.path().join("one.dmp")).unwrap();
    assert_eq!(LE::read_u32(&patched[16..]), 0);
    assert_eq!(LE::read_u32(&patched[48 + 8..]), 0x2222);
    assert_eq!(LE::read_u32(&patched[48 + 12..]), 0x3333);
    assert_eq!(LE::read_u32(&patched[48 + 16..]), 0x1111);
    assert_eq!(LE::read_u32(&patched[48 + 20..]), dump().len() as u32);
    assert_eq!(patched.last(), Some(&0));
    assert_eq!(fs::read(dir.path().join("two.dmp")).unwrap(), b"not a dump");
}

#[test]
fn invalid_executable_aborts_before_touching_dumps() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.exe"), b"#!/bin/sh\necho hi\n").unwrap();
    fs::write(dir.path().join("one.dmp"), dump()).unwrap();

    let out = remapdump(dir.path(), &["app.exe"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to lookup checksum for exe 'app.exe'"));
    assert_eq!(fs::read(dir.path().join("one.dmp")).unwrap(), dump());
}

#[test]
fn wrong_argument_count_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.dmp"), dump()).unwrap();

    for args in [&[][..], &["a.exe", "b.exe"][..]] {
        let out = remapdump(dir.path(), args);
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
    }
    assert_eq!(fs::read(dir.path().join("one.dmp")).unwrap(), dump());
}

#[test]
fn scan_directory_does_not_change_path_base() {
    let cwd = tempfile::tempdir().unwrap();
    let sub = cwd.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(cwd.path().join("app.exe"), image(5, 6, 7)).unwrap();
    fs::write(sub.join("one.dmp"), dump()).unwrap();
    fs::write(cwd.path().join("top.dmp"), dump()).unwrap();

    let out = remapdump(cwd.path(), &["--dir", "sub", "app.exe"]);
    assert!(out.status.success());

    assert_eq!(fs::read(cwd.path().join("top.dmp")).unwrap(), dump());

    let patched = fs::read(sub.join("one.dmp")).unwrap();
    let original_len = dump().len();
    assert_eq!(LE::read_u32(&patched[48 + 12..]), 7);
    assert_eq!(LE::read_u32(&patched[48 + 20..]), original_len as u32);

    let text = &patched[original_len + 4..patched.len() - 1];
    let mut wide = vec![0u16; text.len() / 2];
    LE::read_u16_into(text, &mut wide);
    let appended = String::from_utf16(&wide).unwrap();

    // The child resolves its working directory, which may differ from the
    // tempdir path by symlinks.
    let expected = |base: &Path| format!("{}{}app.exe", base.display(), MAIN_SEPARATOR);
    let resolved = cwd.path().canonicalize().unwrap();
    assert!(
        appended == expected(cwd.path()) || appended == expected(&resolved),
        "unexpected path record {appended:?}"
    );
}
