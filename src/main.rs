//! `ib` - issue board with optimistic writes
//!
//! Issues live in a JSONL file under `.issueboard/`; every change is applied
//! locally first and rolled back if the backend rejects it.

use issueboard::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
