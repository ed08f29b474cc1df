//! Integration tests for mailorigin.
//!
//! These tests drive the compiled binary end to end with inline lists,
//! input files, domain maps and config files. Plot rendering is disabled
//! except where a test checks the written plot set.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str;
use tempfile::NamedTempFile;

const SAMPLE: &str = "dummy_mail@pm.me <dummy_mail@pm.me>; dummy_mail@googlemail.com; foo@bar.de";

/// Helper to get the path to the compiled binary
fn get_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    if path.ends_with("deps") {
        path.pop(); // Remove "deps" directory
    }
    path.push("mailorigin");
    path
}

/// Helper to create a temporary file with the given suffix and content
fn create_temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = Command::new(get_binary_path())
        .args(args)
        .args(["--no-plots", "--report", "json", "--verbose=0"])
        .output()
        .expect("Failed to execute binary");
    assert!(
        output.status.success(),
        "stderr: {}",
        str::from_utf8(&output.stderr).unwrap()
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_sample_list_json_report() {
    let report = run_json(&[SAMPLE]);

    let records = report["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["address"], "dummy_mail@protonmail.com");
    assert_eq!(records[0]["domain"], "protonmail.com");
    assert_eq!(records[1]["domain"], "gmail.com");
    assert_eq!(records[2]["country"], "Germany");
    assert_eq!(records[2]["country_code"], "DEU");

    assert_eq!(report["input"]["aliases_applied"], 2);
    assert_eq!(report["statistics"]["countries"][0]["label"], "DEU");
    assert_eq!(report["statistics"]["countries"][0]["count"], 1);

    let tlds = report["statistics"]["top_level_domains"].as_array().unwrap();
    assert_eq!(tlds[0]["label"], "com");
    assert_eq!(tlds[0]["count"], 2);
}

#[test]
fn test_no_aliases_keeps_original_domains() {
    let report = run_json(&[SAMPLE, "--no-aliases"]);
    assert_eq!(report["records"][0]["domain"], "pm.me");
    assert_eq!(report["records"][0]["top_level_domain"], "me");
    assert_eq!(report["input"]["aliases_applied"], 0);
}

#[test]
fn test_domain_plot_statistics() {
    let report = run_json(&["a@gmail.com; b@gmail.com; c@web.de; d@example.fr"]);
    let bars = report["statistics"]["domain_plot"].as_array().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0]["label"], "gmail.com");
    assert_eq!(bars[0]["count"], 2);
    assert_eq!(bars[1]["label"], "unique domains");
    assert_eq!(bars[1]["count"], 2);
}

#[test]
fn test_input_file_and_domain_map() {
    let list = create_temp_file(".txt", "alice@gmail.com;\nbob@corp.example.com;\ncarol@bar.de\n");
    let map = create_temp_file(".yaml", "gmail.com: United States\nexample.com: France\n");

    let report = run_json(&[
        "--input",
        list.path().to_str().unwrap(),
        "--domain-map",
        map.path().to_str().unwrap(),
    ]);

    let records = report["records"].as_array().unwrap();
    assert_eq!(records[0]["country_code"], "USA");
    assert_eq!(records[0]["matched_by"], "domain");
    assert_eq!(records[1]["country_code"], "FRA");
    assert_eq!(records[1]["matched_by"], "parent_domain");
    assert_eq!(records[2]["matched_by"], "top_level_domain");
    assert_eq!(report["input"]["known_origins"], 3);
    assert!(
        report["input"]["source"]
            .as_str()
            .unwrap()
            .ends_with(".txt")
    );
}

#[test]
fn test_stdin_input() {
    let mut child = Command::new(get_binary_path())
        .args(["--input", "-", "--no-plots", "--report", "csv", "--verbose=0"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute binary");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"x@example.fr; y@bar.de")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines[0], "address,domain,top_level_domain,country,country_code");
    assert_eq!(lines[1], "x@example.fr,example.fr,fr,France,FRA");
    assert_eq!(lines[2], "y@bar.de,bar.de,de,Germany,DEU");
}

#[test]
fn test_plain_text_output() {
    let output = Command::new(get_binary_path())
        .args([SAMPLE, "--no-plots", "--plain", "--verbose=0"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("foo@bar.de\tGermany\tDEU"));
    assert!(stdout.contains("Top-level domains:"));
    assert!(!stdout.contains('\u{1b}'));
}

#[test]
fn test_invalid_input_exits_with_error() {
    let output = Command::new(get_binary_path())
        .args(["not-an-address; also wrong", "--no-plots", "--verbose=1"])
        .output()
        .expect("Failed to execute binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = str::from_utf8(&output.stderr).unwrap();
    assert!(
        stderr.contains("No email addresses found"),
        "Should report missing addresses: {}",
        stderr
    );
}

#[test]
fn test_missing_input() {
    let output = Command::new(get_binary_path())
        .arg("--no-plots")
        .output()
        .expect("Failed to execute binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(str::from_utf8(&output.stderr).unwrap().contains("no address list given"));
}

#[test]
fn test_missing_input_file() {
    let output = Command::new(get_binary_path())
        .args(["--input", "/nonexistent/addresses.txt", "--no-plots"])
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(str::from_utf8(&output.stderr).unwrap().contains("/nonexistent/addresses.txt"));
}

#[test]
fn test_rejected_entries_are_reported() {
    let output = Command::new(get_binary_path())
        .args([
            "foo@bar.de; broken-entry",
            "--no-plots",
            "--report",
            "json",
            "--verbose=2",
        ])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rejected"][0]["entry"], "broken-entry");
    assert!(str::from_utf8(&output.stderr).unwrap().contains("broken-entry"));
}

#[test]
fn test_invalid_config_file() {
    let config = create_temp_file(".yaml", "input:\n  delimiter: '@'\n");
    let output = Command::new(get_binary_path())
        .args([SAMPLE, "--config", config.path().to_str().unwrap()])
        .output()
        .expect("Failed to execute binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(str::from_utf8(&output.stderr).unwrap().contains("Configuration error"));
}

#[test]
fn test_config_file_delimiter() {
    let config = create_temp_file(".json", r#"{"input": {"delimiter": ","}}"#);
    let report = run_json(&[
        "a@bar.de, b@example.fr",
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert_eq!(report["records"].as_array().unwrap().len(), 2);
}

#[test]
fn test_yaml_report() {
    let output = Command::new(get_binary_path())
        .args([SAMPLE, "--no-plots", "--report", "yaml", "--verbose=0"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("tool_name: mailorigin"));
    assert!(stdout.contains("country_code: DEU"));
}

#[test]
fn test_schema_generation() {
    let output = Command::new(get_binary_path())
        .arg("--generate-schema")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["title"], "MailOriginReport");
}

#[test]
fn test_plot_set_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(get_binary_path())
        .args([
            "a@gmail.com; b@gmail.com; c@bar.de; d@example.fr",
            "--output-dir",
            dir.path().to_str().unwrap(),
            "--format",
            "svg",
            "--report",
            "json",
            "--verbose=0",
        ])
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        str::from_utf8(&output.stderr).unwrap()
    );
    for title in ["Domains", "top_level_domains", "origin_worldmap", "origin_pieplot"] {
        let path = dir.path().join(format!("{title}.svg"));
        assert!(path.exists(), "missing plot {}", path.display());
    }
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["plots"].as_array().unwrap().len(), 4);
}

#[test]
fn test_png_plot_set_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(get_binary_path())
        .args([
            "a@gmail.com; c@bar.de",
            "--output-dir",
            dir.path().to_str().unwrap(),
            "--plain",
            "--verbose=0",
        ])
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        str::from_utf8(&output.stderr).unwrap()
    );
    let stdout = str::from_utf8(&output.stdout).unwrap();
    for title in ["Domains", "top_level_domains", "origin_worldmap", "origin_pieplot"] {
        let path = dir.path().join(format!("{title}.png"));
        assert!(path.exists(), "missing plot {}", path.display());
        assert!(stdout.contains(&format!("Plot: {}", path.display())));
    }
}

#[test]
fn test_domain_map_covers_full_country_list() {
    let map = create_temp_file(
        ".yaml",
        "a.qa: Qatar\nb.by: Belarus\nc.ir: Iran, Islamic Republic of\nd.cu: Cuba\n",
    );
    let output = Command::new(get_binary_path())
        .args([
            "x@a.qa; x@b.by; x@c.ir; x@d.cu",
            "--domain-map",
            map.path().to_str().unwrap(),
            "--no-plots",
            "--report",
            "json",
            "--verbose=2",
        ])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = report["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["country_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["QAT", "BLR", "IRN", "CUB"]);
    assert_eq!(report["input"]["known_origins"], 4);
    assert!(report.get("warnings").is_none(), "{}", report["warnings"]);
}
}
