use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_compat-json"))
}

fn create_temp_dir(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target");
    path.push("tmp");
    path.push(name);
    fs::create_dir_all(&path).expect("Failed to create tmp dir");
    path
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(get_binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn compat-json binary");

    // The child may exit on an argument error before reading its input.
    if let Some(mut pipe) = child.stdin.take() {
        let _ = pipe.write_all(stdin.as_bytes());
    }

    child.wait_with_output().expect("Failed to wait for child")
}

fn stdout_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("Each line should be JSON"))
        .collect()
}

#[test]
fn test_cli_to_json_compress() {
    let output = Command::new(get_binary_path())
        .args(["to-json", "--compress", r#"{"a": 1}"#, r#"[true, null]"#])
        .output()
        .expect("Failed to execute compat-json binary");

    println!("Stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.status.success(), "to-json should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "{\"a\":1}\n[true,null]\n");
}

#[test]
fn test_cli_to_json_indented_by_default() {
    let output = Command::new(get_binary_path())
        .args(["to-json", r#"{"Name":"pwsh","Version":"7.0.0"}"#])
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(output.status.success(), "to-json should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "{\n  \"Name\": \"pwsh\",\n  \"Version\": \"7.0.0\"\n}\n");
}

#[test]
fn test_cli_to_json_streams_stdin() {
    let output = run_with_stdin(&["to-json", "-c"], "{\"x\":1}\n{\"x\": 2}\n3\n");

    println!("Stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.status.success(), "stdin streaming should succeed");
    assert_eq!(stdout_lines(&output), vec![json!({"x": 1}), json!({"x": 2}), json!(3)]);
}

#[test]
fn test_cli_to_json_empty_stdin() {
    let output = run_with_stdin(&["to-json"], "");

    assert!(output.status.success(), "empty input is not an error");
    assert!(output.stdout.is_empty(), "no output expected");
}

#[test]
fn test_cli_to_json_stops_at_bad_item() {
    let output = run_with_stdin(&["to-json", "-c"], "{\"x\":1}\n{oops");

    assert!(!output.status.success(), "malformed input should fail");
    assert_eq!(stdout_lines(&output), vec![json!({"x": 1})]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Invalid JSON in stdin"), "stderr was: {}", stderr);
}

#[test]
fn test_cli_to_json_negative_number_item() {
    let output = Command::new(get_binary_path())
        .args(["to-json", "-c", "-1", "-2.5"])
        .output()
        .expect("Failed to execute compat-json binary");

    println!("Stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.status.success(), "negative numbers are valid items");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "-1\n-2.5\n");
}

#[test]
fn test_cli_from_json_negative_number_source() {
    let output = Command::new(get_binary_path())
        .args(["from-json", "-7"])
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(output.status.success(), "negative numbers are valid sources");
    assert_eq!(stdout_lines(&output), vec![json!(-7)]);
}

#[test]
fn test_cli_from_json_stdin_only_once() {
    let output = run_with_stdin(&["from-json", "-", "-"], "{\"a\":1}\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "nothing is converted");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("can only be given once"), "stderr was: {}", stderr);
}

#[test]
fn test_cli_from_json_sources() {
    let output = Command::new(get_binary_path())
        .args(["from-json", r#"{"x":1}"#, r#"{"x":2}"#])
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(output.status.success(), "from-json should succeed");
    assert_eq!(stdout_lines(&output), vec![json!({"x": 1}), json!({"x": 2})]);
}

#[test]
fn test_cli_from_json_stdin_reader() {
    let output = run_with_stdin(&["from-json", "-"], "{\n  \"Edition\": \"Core\"\n}\n");

    assert!(output.status.success(), "from-json with stdin should succeed");
    assert_eq!(stdout_lines(&output), vec![json!({"Edition": "Core"})]);
}

#[test]
fn test_cli_from_json_paths_to_output_file() {
    let dir = create_temp_dir("cli_from_json_paths");
    let f1 = dir.join("f1.json");
    let f2 = dir.join("f2.json");
    let out = dir.join("out.jsonl");
    fs::write(&f1, r#"{"x":1}"#).unwrap();
    fs::write(&f2, "{\n  \"x\": 2\n}").unwrap();
    let _ = fs::remove_file(&out);

    let output = Command::new(get_binary_path())
        .arg("from-json")
        .arg("--path")
        .arg(&f1)
        .arg(&f2)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("Failed to execute compat-json binary");

    println!("Stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.status.success(), "from-json --path should succeed");
    assert!(output.stdout.is_empty(), "output goes to the file");

    let written = fs::read_to_string(&out).expect("Failed to read output file");
    assert_eq!(written, "{\"x\":1}\n{\"x\":2}\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_from_json_relative_path() {
    let dir = create_temp_dir("cli_from_json_relative");
    fs::write(dir.join("profile.json"), r#"{"Platform":{"Name":"Ubuntu"}}"#).unwrap();

    let output = Command::new(get_binary_path())
        .current_dir(&dir)
        .args(["from-json", "-p", "./profile.json"])
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(output.status.success(), "relative path should resolve");
    assert_eq!(stdout_lines(&output), vec![json!({"Platform": {"Name": "Ubuntu"}})]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_from_json_missing_path_fails() {
    let output = Command::new(get_binary_path())
        .args(["from-json", "--path", "/nonexistent/compat-json/missing.json"])
        .output()
        .expect("Failed to execute compat-json binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot resolve path"), "stderr was: {}", stderr);
}

#[test]
fn test_cli_from_json_rejects_both_parameter_sets() {
    let output = Command::new(get_binary_path())
        .args(["from-json", r#"{"x":1}"#, "--path", "a.json"])
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(!output.status.success(), "conflicting parameters should fail");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_from_json_requires_input() {
    let output = Command::new(get_binary_path())
        .arg("from-json")
        .output()
        .expect("Failed to execute compat-json binary");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_from_json_rejects_empty_path() {
    let output = Command::new(get_binary_path())
        .args(["from-json", "--path", ""])
        .output()
        .expect("Failed to execute compat-json binary");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_help_command() {
    let output = Command::new(get_binary_path())
        .arg("--help")
        .output()
        .expect("Failed to execute compat-json binary");

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("to-json") && stdout.contains("from-json"));
}
