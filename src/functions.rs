//! Helper functions exposed inside the template language.
//!
//! Every helper is a thin adapter over a host primitive (environment,
//! filesystem, compression, encoding, external process). Helpers never
//! terminate the process themselves; failures are returned as template
//! errors and surface through the single top-level error handler.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::write::GzEncoder;
use flate2::Compression;
use minijinja::value::Value;
use minijinja::{Environment, Error, ErrorKind};

/// Memoized standard input buffer.
///
/// The fill closure runs at most once per cache regardless of how many
/// times `getStdin` is invoked during a render. One cache is created per
/// run, not per process.
#[derive(Debug, Default)]
pub struct StdinCache {
    buf: OnceLock<Vec<u8>>,
}

impl StdinCache {
    pub fn new() -> Self {
        Self { buf: OnceLock::new() }
    }

    /// Returns the cached bytes, running `fill` on first use only.
    pub fn get_or_fill<F>(&self, fill: F) -> &[u8]
    where
        F: FnOnce() -> Vec<u8>,
    {
        self.buf.get_or_init(fill)
    }
}

/// Reads all of standard input when it is a pipe; anything else yields no
/// bytes, as does a read failure.
fn read_piped_stdin() -> Vec<u8> {
    if !stdin_is_pipe() {
        return Vec::new();
    }
    let mut buf = Vec::new();
    if std::io::stdin().lock().read_to_end(&mut buf).is_err() {
        return Vec::new();
    }
    buf
}

/// A pipe is the only stdin source `getStdin` captures; terminals and
/// regular-file redirections are ignored.
#[cfg(unix)]
fn stdin_is_pipe() -> bool {
    use std::os::fd::AsFd;
    use std::os::unix::fs::FileTypeExt;

    std::io::stdin()
        .as_fd()
        .try_clone_to_owned()
        .map(std::fs::File::from)
        .and_then(|file| file.metadata())
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false)
}

/// Without a FIFO file type to inspect, fall back to treating any
/// non-terminal stdin as piped.
#[cfg(not(unix))]
fn stdin_is_pipe() -> bool {
    use std::io::IsTerminal;

    !std::io::stdin().is_terminal()
}

/// The set of helper functions injected into the template namespace.
///
/// Path-taking helpers resolve relative paths against the directory that
/// contains the template file, so templates can reference sibling files
/// independently of the process working directory.
pub struct FunctionRegistry {
    base_dir: PathBuf,
    stdin: Arc<StdinCache>,
}

impl FunctionRegistry {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            stdin: Arc::new(StdinCache::new()),
        }
    }

    /// Installs every helper into the environment's function namespace.
    /// The registry is consulted once per template parse and is immutable
    /// afterwards.
    pub fn install(&self, env: &mut Environment<'static>) {
        env.add_function("getenv", getenv);
        env.add_function("getEnv", getenv);
        env.add_function("encodeJSON", encode_json);
        env.add_function("encodeBase64", encode_base64);
        env.add_function("gzip", gzip_bytes);
        env.add_function("toInt", to_int);
        env.add_function("add", add);
        env.add_function("sub", sub);

        let base = self.base_dir.clone();
        env.add_function("getFileContent", move |path: &str| -> Result<String, Error> {
            let resolved = base.join(path);
            std::fs::read_to_string(&resolved).map_err(|e| read_error(&resolved, e))
        });

        let base = self.base_dir.clone();
        env.add_function(
            "getFileContentBytes",
            move |path: &str| -> Result<Value, Error> {
                let resolved = base.join(path);
                let data = std::fs::read(&resolved).map_err(|e| read_error(&resolved, e))?;
                Ok(Value::from_bytes(data))
            },
        );

        let stdin = Arc::clone(&self.stdin);
        env.add_function("getStdin", move || -> Value {
            Value::from_bytes(stdin.get_or_fill(read_piped_stdin).to_vec())
        });

        let base = self.base_dir.clone();
        env.add_function("sopsDecrypt", move |path: &str| -> Result<Value, Error> {
            sops_decrypt(&base.join(path))
        });
    }
}

fn getenv(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn encode_json(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("unable to encode value as JSON: {}", e),
        )
    })
}

fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}

fn gzip_bytes(data: &[u8]) -> Result<Value, Error> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, format!("gzip write failed: {}", e))
    })?;
    let compressed = encoder.finish().map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, format!("gzip close failed: {}", e))
    })?;
    Ok(Value::from_bytes(compressed))
}

fn to_int(s: &str) -> Result<i64, Error> {
    s.parse::<i64>().map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("unable to parse {:?} as integer: {}", s, e),
        )
    })
}

fn add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

fn sub(a: i64, b: i64) -> i64 {
    a.wrapping_sub(b)
}

/// Runs `sops -d <path>` and returns its stdout. Stderr is captured and
/// surfaced only on failure. The call blocks without a timeout.
fn sops_decrypt(path: &Path) -> Result<Value, Error> {
    let output = Command::new("sops")
        .arg("-d")
        .arg(path)
        .output()
        .map_err(|e| {
            Error::new(ErrorKind::InvalidOperation, format!("unable to run sops: {}", e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            format!(
                "sops -d {} failed with {}: {}",
                path.display(),
                output.status,
                stderr.trim()
            ),
        ));
    }

    Ok(Value::from_bytes(output.stdout))
}

fn read_error(path: &Path, err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("unable to read {}: {}", path.display(), err),
    )
}
