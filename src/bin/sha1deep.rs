//! The single-algorithm SHA-1 personality.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::SHA1DEEP)
}
