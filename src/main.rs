//! tmpl-renderer's main application entry point.
//! Parses command-line arguments (with environment fallback), renders the
//! given template file once, and writes the result to the chosen sink.

use std::io::Write;

use tmpl_renderer::{
    cli::{get_args, template_arg, Args},
    error::{default_error_handler, Error, Result},
    renderer::{open_output, MiniJinjaRenderer},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates that a template path was provided
/// 2. Loads and parses the template, binding the helper functions
/// 3. Renders it once against an empty context
/// 4. Writes the result to the `--out` file or stdout
fn run(args: Args) -> Result<()> {
    let template_file = template_arg(&args)?;

    log::debug!("rendering template {}", template_file.display());
    let renderer = MiniJinjaRenderer::from_file(template_file)?;
    let rendered = renderer.render()?;

    if let Some(out) = &args.out {
        log::debug!("writing output to {}", out.display());
    }
    let mut sink = open_output(args.out.as_deref())?;
    sink.write_all(rendered.as_bytes()).map_err(Error::IoError)?;
    sink.flush().map_err(Error::IoError)?;

    Ok(())
}
