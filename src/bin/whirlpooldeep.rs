//! The single-algorithm Whirlpool personality.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::WHIRLPOOLDEEP)
}
