//! The single-algorithm MD5 personality.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::MD5DEEP)
}
