//! tmpl-renderer is a single-shot template rendering tool.
//! It reads one template file, executes it once against an empty context
//! with a set of built-in helper functions, and writes the result to a
//! file or standard output.

/// Command-line interface module for tmpl-renderer
pub mod cli;

/// Error types and handling for tmpl-renderer
pub mod error;

/// Helper functions exposed to the template language
/// (environment lookup, file access, encoding, arithmetic, stdin capture,
/// secrets decryption)
pub mod functions;

/// Template loading, parsing and rendering
/// Handles the actual template processing logic
pub mod renderer;
