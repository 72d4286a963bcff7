pub mod io;

/// Format an IO error message without the "(os error N)" suffix.
///
/// GNU-style tools print `No such file or directory` rather than
/// `No such file or directory (os error 2)`; every bin in this crate routes
/// its error reporting through this helper for that reason.
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        format!("{os_err}").replace(&format!(" (os error {raw})"), "")
    } else {
        format!("{e}")
    }
}

/// Reset SIGPIPE to its default disposition on unix.
///
/// Rust installs `SIG_IGN` for SIGPIPE at startup so that writes to a closed
/// pipe return `EPIPE` instead of killing the process; GNU tools rely on the
/// opposite behavior (silent death on `| head`), so every bin restores the
/// default action before doing any output.
#[cfg(unix)]
pub fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
pub fn reset_sigpipe() {}

/// Strip a personality prefix/suffix to get the GNU-compatible base name,
/// e.g. for diagnostics that want "md5deep" regardless of how the binary
/// was invoked.
#[inline]
pub fn gnu_name(binary_name: &str) -> &str {
    binary_name.strip_suffix(".exe").unwrap_or(binary_name)
}

/// Compile-time generated 2-byte hex pair lookup table.
/// Each byte maps directly to its 2-char hex representation — a single
/// lookup per byte, rather than two divmod-by-16 operations.
const fn generate_hex_table() -> [[u8; 2]; 256] {
    let hex = b"0123456789abcdef";
    let mut table = [[0u8; 2]; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = [hex[i >> 4], hex[i & 0xf]];
        i += 1;
    }
    table
}

const HEX_TABLE: [[u8; 2]; 256] = generate_hex_table();

/// Fast lowercase hex encoding using the 2-byte pair lookup table.
pub fn hex_encode(bytes: &[u8]) -> String {
    let len = bytes.len() * 2;
    let mut hex = String::with_capacity(len);
    // SAFETY: we write exactly `len` valid ASCII hex bytes into the String's buffer.
    unsafe {
        let buf = hex.as_mut_vec();
        buf.set_len(len);
        let ptr = buf.as_mut_ptr();
        for (i, &b) in bytes.iter().enumerate() {
            let pair = *HEX_TABLE.get_unchecked(b as usize);
            *ptr.add(i * 2) = pair[0];
            *ptr.add(i * 2 + 1) = pair[1];
        }
    }
    hex
}

/// Panic with a consistent "this is a bug" message for invariant violations
/// that §7 classifies as internal errors (directory double-insert,
/// finalize-before-init, etc.) rather than recoverable user/IO errors.
#[track_caller]
pub fn invariant_violation(what: &str) -> ! {
    panic!("internal invariant violation: {what} — please contact the developer");
}
