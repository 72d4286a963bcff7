use std::io;
use std::path::Path;

/// Read an entire file into memory. Used for hash-list files, which are
/// small relative to the subjects being hashed and are read once at startup.
pub fn read_file_bytes(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path)
}
