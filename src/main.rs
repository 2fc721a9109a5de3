//! `zed-prompts` - Import and export Zed prompt libraries
//!
//! Converts the editor's LMDB prompt store to a JSON snapshot and back.
//! Purely local: no daemon, no network, one pipeline run per invocation.

use zed_prompts::cli::error_hint;
use zed_prompts::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        if let Some(hint) = error_hint(&e) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}
