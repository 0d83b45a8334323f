//! Command-line argument parsing for the relay binary.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run the relay server (default), optionally overriding the bind address
    Serve { bind: Option<String> },
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first item is the program name and is skipped. `--version` and
/// `--help` win as soon as they are seen.
///
/// # Examples
///
/// ```
/// use citation_relay::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["citation-relay".to_string(), "--bind".to_string(), "0.0.0.0:8080".to_string()];
/// assert_eq!(
///     parse_args(args.into_iter()),
///     CliCommand::Serve { bind: Some("0.0.0.0:8080".to_string()) }
/// );
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut bind = None;
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--bind" | "-b" => match args.next() {
                Some(addr) => bind = Some(addr),
                None => return CliCommand::Invalid("--bind requires an address".to_string()),
            },
            other => {
                if let Some(addr) = other.strip_prefix("--bind=") {
                    bind = Some(addr.to_string());
                } else {
                    return CliCommand::Invalid(format!("unknown argument: {}", other));
                }
            }
        }
    }
    CliCommand::Serve { bind }
}
