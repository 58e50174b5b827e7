//! Template loading and rendering for tmpl-renderer.
//! Parses one template file with MiniJinja, binds the helper function
//! registry, and renders it exactly once against an empty context.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use minijinja::Environment;

use crate::error::{Error, Result};
use crate::functions::FunctionRegistry;

/// MiniJinja-based template renderer bound to a single template file.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
    template_name: String,
}

impl MiniJinjaRenderer {
    /// Loads and parses the template file, binding the helper functions.
    /// Relative paths used by file-access helpers resolve against the
    /// template file's directory.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if the file does not exist
    /// * `Error::IoError` if the file cannot be read
    /// * `Error::TemplateParseError` on template syntax errors
    pub fn from_file(template_file: &Path) -> Result<Self> {
        if !template_file.exists() {
            return Err(Error::TemplateNotFound {
                path: template_file.display().to_string(),
            });
        }

        let source = std::fs::read_to_string(template_file).map_err(Error::IoError)?;
        let template_name = template_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());

        let mut env = Environment::new();
        FunctionRegistry::new(base_dir(template_file)).install(&mut env);
        env.add_template_owned(template_name.clone(), source).map_err(|e| {
            Error::TemplateParseError {
                path: template_file.display().to_string(),
                source: e,
            }
        })?;

        Ok(Self { env, template_name })
    }

    /// Renders the template against an empty context.
    pub fn render(&self) -> Result<String> {
        let tmpl =
            self.env.get_template(&self.template_name).map_err(Error::MinijinjaError)?;
        tmpl.render(minijinja::context! {}).map_err(Error::MinijinjaError)
    }
}

/// Directory containing the template file; a bare file name resolves
/// against the current directory.
fn base_dir(template_file: &Path) -> PathBuf {
    match template_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Opens the output sink: the given file (created or truncated) when set,
/// standard output otherwise.
pub fn open_output(out: Option<&Path>) -> Result<Box<dyn Write>> {
    match out {
        Some(path) => {
            let file = File::create(path).map_err(|e| Error::OutputError {
                path: path.display().to_string(),
                source: e,
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}
