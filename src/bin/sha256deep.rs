//! The single-algorithm SHA-256 personality.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::SHA256DEEP)
}
