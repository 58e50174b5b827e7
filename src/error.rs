//! Error handling for tmpl-renderer.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for tmpl-renderer operations.
///
/// Every error is fatal: the top-level driver prints it to stderr and
/// terminates the process with a nonzero status.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors raised by the template engine during execution
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents invalid command-line usage
    #[error("{0}")]
    UsageError(String),

    /// The template file given on the command line does not exist
    #[error("Template file does not exist: {path}.")]
    TemplateNotFound { path: String },

    /// The template file could not be parsed
    #[error("Unable to process template {path}: {source}.")]
    TemplateParseError { path: String, source: minijinja::Error },

    /// The output file could not be created
    #[error("Unable to create {path}: {source}.")]
    OutputError { path: String, source: io::Error },
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{}", err);
    std::process::exit(1);
}
