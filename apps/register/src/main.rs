//! # Till Register Entry Point
//!
//! Opens the configured store, applies migrations and first-run defaults,
//! logs its status and exits. The setup lives in lib.rs so a UI shell can
//! reuse it.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match till_register::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("till-register: {}", e);
            ExitCode::FAILURE
        }
    }
}
