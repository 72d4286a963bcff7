//! The full personality: hashing, hash-list matching, audit, DFXML.

fn main() -> ! {
    hashdeep_core::session::main_for(hashdeep_core::cli::HASHDEEP)
}
