//! The single-algorithm Tiger personality.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::TIGERDEEP)
}
