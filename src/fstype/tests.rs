use super::*;
use std::fs;

#[test]
fn classifies_regular_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    fs::write(&path, b"hi").unwrap();
    let c = classify(&path).unwrap();
    assert_eq!(c.kind, FileKind::Regular);
    assert_eq!(c.size, 2);
}

#[test]
fn classifies_directory() {
    let dir = tempfile::tempdir().unwrap();
    let c = classify(dir.path()).unwrap();
    assert_eq!(c.kind, FileKind::Directory);
}

#[cfg(unix)]
#[test]
fn classifies_symlink_without_dereferencing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"hi").unwrap();
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();
    let c = classify(&link).unwrap();
    assert_eq!(c.kind, FileKind::Symlink);
}

#[cfg(unix)]
#[test]
fn classifies_fifo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fifo");
    let cpath = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
    let rc = unsafe { libc::mkfifo(cpath.as_ptr(), 0o600) };
    assert_eq!(rc, 0);
    let c = classify(&path).unwrap();
    assert_eq!(c.kind, FileKind::Pipe);
}

#[test]
fn missing_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(classify(&dir.path().join("nope")).is_err());
}
