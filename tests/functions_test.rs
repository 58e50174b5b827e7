use std::fs;
use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;
use tempfile::TempDir;
use tmpl_renderer::error::Result;
use tmpl_renderer::renderer::MiniJinjaRenderer;

/// Writes `template` into a fresh temp directory and renders it. The temp
/// directory differs from the process working directory, so path-taking
/// helpers only succeed when they resolve against the template's base
/// directory.
fn render_in(dir: &TempDir, template: &str) -> Result<String> {
    let template_path = dir.path().join("test.tmpl");
    fs::write(&template_path, template).unwrap();
    MiniJinjaRenderer::from_file(&template_path)?.render()
}

#[test]
fn test_getenv_unset_is_empty() {
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"[{{ getenv("TMPL_RENDERER_TEST_UNSET_VAR") }}]"#).unwrap();
    assert_eq!(out, "[]");
}

#[test]
fn test_getenv_alias() {
    let dir = TempDir::new().unwrap();
    // Both spellings resolve to the same helper
    let out = render_in(
        &dir,
        r#"{{ getenv("TMPL_RENDERER_TEST_UNSET_VAR") }}{{ getEnv("TMPL_RENDERER_TEST_UNSET_VAR") }}ok"#,
    )
    .unwrap();
    assert_eq!(out, "ok");
}

#[test]
fn test_encode_json() {
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"{{ encodeJSON([1, 2, 3]) }}"#).unwrap();
    assert_eq!(out, "[1,2,3]");

    let out = render_in(&dir, r#"{{ encodeJSON("hi") }}"#).unwrap();
    assert_eq!(out, "\"hi\"");
}

#[test]
fn test_get_file_content_resolves_against_template_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sibling.txt"), "sibling content").unwrap();

    let out = render_in(&dir, r#"{{ getFileContent("sibling.txt") }}"#).unwrap();
    assert_eq!(out, "sibling content");
}

#[test]
fn test_get_file_content_missing_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = render_in(&dir, r#"{{ getFileContent("no-such-file.txt") }}"#);
    assert!(result.is_err());
}

#[test]
fn test_encode_base64_of_file_bytes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("payload.bin"), b"abc").unwrap();

    let out =
        render_in(&dir, r#"{{ encodeBase64(getFileContentBytes("payload.bin")) }}"#).unwrap();
    assert_eq!(out, "YWJj");
}

#[test]
fn test_gzip_base64_is_deterministic_and_reversible() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("payload.bin"), b"hello gzip world").unwrap();
    let template = r#"{{ encodeBase64(gzip(getFileContentBytes("payload.bin"))) }}"#;

    let first = render_in(&dir, template).unwrap();
    let second = render_in(&dir, template).unwrap();
    assert_eq!(first, second);

    let compressed = BASE64.decode(&first).unwrap();
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).unwrap();
    assert_eq!(decompressed, b"hello gzip world");
}

#[test]
fn test_to_int() {
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"{{ toInt("42") }}"#).unwrap();
    assert_eq!(out, "42");
}

#[test]
fn test_to_int_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let result = render_in(&dir, r#"{{ toInt("abc") }}"#);
    assert!(result.is_err());
}

#[test]
fn test_add_sub() {
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"{{ add(40, 2) }} {{ sub(add(40, 2), 2) }}"#).unwrap();
    assert_eq!(out, "42 40");
}

#[test]
fn test_helpers_compose_in_pipelines() {
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"{{ add(toInt("40"), toInt("2")) }}"#).unwrap();
    assert_eq!(out, "42");
}

#[test]
fn test_get_stdin_empty_without_pipe() {
    // Under the test harness stdin is a terminal or /dev/null, neither of
    // which is a pipe, so the helper yields no bytes and never errors.
    let dir = TempDir::new().unwrap();
    let out = render_in(&dir, r#"[{{ encodeBase64(getStdin()) }}]"#).unwrap();
    assert_eq!(out, "[]");
}

#[test]
fn test_sops_decrypt_failure_is_fatal() {
    // Whether sops is absent or the file does not exist, the helper
    // must fail the render rather than return silently.
    let dir = TempDir::new().unwrap();
    let result = render_in(&dir, r#"{{ sopsDecrypt("no-such-file.enc") }}"#);
    assert!(result.is_err());
}
