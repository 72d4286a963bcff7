//! Winpe-mode file peek (§4.G): is this an MZ/PE executable?
//!
//! Grounded on the teacher's buffered-read idiom in `common/io.rs`; reads
//! only the first 8 KiB, never the whole file, since this is a gate run
//! before the real hashing pass.

use std::io::Read;
use std::path::Path;

const PEEK_LEN: usize = 8 * 1024;

/// True if `path`'s first bytes form a valid MZ header whose `e_lfanew`
/// points to a `PE\0\0` signature within the peeked window.
pub fn looks_like_pe(path: &Path) -> std::io::Result<bool> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; PEEK_LEN];
    let n = file.read(&mut buf)?;
    buf.truncate(n);
    Ok(is_mz_pe(&buf))
}

fn is_mz_pe(buf: &[u8]) -> bool {
    if buf.len() < 0x40 || &buf[0..2] != b"MZ" {
        return false;
    }
    let e_lfanew = u32::from_le_bytes(buf[0x3c..0x40].try_into().unwrap()) as usize;
    if e_lfanew.checked_add(4).is_none_or(|end| end > buf.len()) {
        return false;
    }
    &buf[e_lfanew..e_lfanew + 4] == b"PE\0\0"
}

/// Common executable extensions; used only to decide whether a detected PE
/// file without one of these deserves a diagnostic (§4.G).
pub fn has_recognized_executable_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("exe") | Some("dll") | Some("sys") | Some("scr") | Some("ocx") | Some("cpl")
    )
}
