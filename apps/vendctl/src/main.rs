//! # vendctl Entry Point
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

use vendctl::Outcome;

#[tokio::main]
async fn main() -> ExitCode {
    match vendctl::run(std::env::args().skip(1)).await {
        Ok(Outcome::Json(value)) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to render output: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(Outcome::Text(text)) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match serde_json::to_string(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
