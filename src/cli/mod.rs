//! CLI module for the relay binary.
//!
//! The dispatcher runs early in `main()`, before the server starts:
//!
//! ```ignore
//! use citation_relay::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if let Some(code) = run_cli_command(&command) {
//!     std::process::exit(code);
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{version_string, USAGE, VERSION};

/// Handle commands that finish without starting the server.
///
/// Returns the process exit code, or `None` when the server should run.
pub fn run_cli_command(command: &CliCommand) -> Option<i32> {
    match command {
        CliCommand::Version => {
            println!("{}", version_string());
            Some(0)
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(0)
        }
        CliCommand::Invalid(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            Some(2)
        }
        CliCommand::Serve { .. } => None,
    }
}
