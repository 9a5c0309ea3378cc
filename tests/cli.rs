mod common;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Command running in an empty directory with no credential in the environment.
fn cmd(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("contract-guardian");
    cmd.current_dir(dir)
        .env_remove("LANGEXTRACT_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn schema_prints_response_schema() {
    let tmp = TempDir::new().unwrap();
    let out = cmd(tmp.path()).arg("schema").assert().success();
    let v: Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(v["type"], "OBJECT");
    assert!(v["properties"]["high_risk_clauses"].is_object());
}

#[test]
fn doctor_reports_credential_without_leaking_it() {
    let tmp = TempDir::new().unwrap();
    let out = cmd(tmp.path())
        .env("GOOGLE_API_KEY", "super-secret")
        .arg("doctor")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&out.get_output().stdout).to_string();
    assert!(!stdout.contains("super-secret"));
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["credential_found"], true);
    assert_eq!(v["credential_source"], "GOOGLE_API_KEY");
}

#[test]
fn extract_writes_text() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("nda.pdf");
    common::write_pdf(&pdf, &["Clause 1...", "Clause 2..."]);
    let out_file = tmp.path().join("text").join("nda.txt");

    cmd(tmp.path())
        .args(["extract", "--input"])
        .arg(&pdf)
        .arg("--out")
        .arg(&out_file)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out_file).unwrap();
    assert!(text.starts_with("Clause 1..."));
    assert!(text.ends_with("Clause 2..."));
}

#[test]
fn extract_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let out = cmd(tmp.path())
        .args(["extract", "--input", "missing.pdf"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("not found"), "{stderr}");
}

#[test]
fn analyze_without_key_fails_and_records_error() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("lease.pdf");
    common::write_pdf(&pdf, &["The lease renews automatically."]);
    let out_dir = tmp.path().join("out");

    let out = cmd(tmp.path())
        .args(["analyze", "--input"])
        .arg(&pdf)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("missing API key"), "{stderr}");

    let job_dir = std::fs::read_dir(&out_dir)
        .unwrap()
        .next()
        .expect("job dir")
        .unwrap()
        .path();
    let index: Value =
        serde_json::from_str(&std::fs::read_to_string(job_dir.join("index.json")).unwrap())
            .unwrap();
    assert_eq!(index["status"], "error");
    assert!(!job_dir.join("analysis.json").exists());
}

#[test]
fn analyze_from_stdin_cleans_up_staged_upload() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("upload.pdf");
    common::write_pdf(&pdf, &["Confidential information stays confidential."]);
    let bytes = std::fs::read(&pdf).unwrap();

    cmd(tmp.path())
        .args(["analyze", "--input", "-", "--out-dir", "out"])
        .write_stdin(bytes)
        .assert()
        .failure();

    let work_dir = tmp.path().join(".contract-guardian-work");
    let leftovers: Vec<_> = std::fs::read_dir(&work_dir)
        .map(|rd| rd.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
}

fn only_job_dir(out_dir: &Path) -> std::path::PathBuf {
    std::fs::read_dir(out_dir)
        .unwrap()
        .next()
        .expect("job dir")
        .unwrap()
        .path()
}

#[test]
fn analyze_missing_file_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    let out = cmd(tmp.path())
        .args(["analyze", "--input", "missing.pdf", "--api-key", "k", "--out-dir", "out"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("not found"), "{stderr}");
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn analyze_unreadable_pdf_records_error_index() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("broken.pdf"), b"this is not a pdf at all").unwrap();

    let out = cmd(tmp.path())
        .args(["analyze", "--input", "broken.pdf", "--api-key", "k", "--out-dir", "out"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("unreadable"), "{stderr}");

    let job_dir = only_job_dir(&tmp.path().join("out"));
    let index: Value =
        serde_json::from_str(&std::fs::read_to_string(job_dir.join("index.json")).unwrap())
            .unwrap();
    assert_eq!(index["status"], "error");
    assert!(index["error"].as_str().unwrap().contains("unreadable"));
}

#[test]
fn analyze_rejects_oversized_stdin() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("contract-guardian.toml"),
        "[ingestion]\nmax_input_file_bytes = 16\nreject_url_inputs = true\nrequire_pdf_extension = false\n",
    )
    .unwrap();

    let out = cmd(tmp.path())
        .args(["analyze", "--input", "-", "--api-key", "k", "--out-dir", "out"])
        .write_stdin(vec![b'x'; 64])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("max_input_file_bytes"), "{stderr}");
    assert!(!tmp.path().join(".contract-guardian-work").join("upload_stdin.pdf").exists());
}

#[test]
fn doctor_reports_key_loaded_from_dotenv() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".env"), "GOOGLE_API_KEY=from-dotenv\n").unwrap();

    let out = cmd(tmp.path()).arg("doctor").assert().success();
    let stdout = String::from_utf8_lossy(&out.get_output().stdout).to_string();
    assert!(!stdout.contains("from-dotenv"));
    let v: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["credential_found"], true);
    assert_eq!(v["credential_source"], "GOOGLE_API_KEY");
    let dotenv = v["dotenv"].as_str().unwrap();
    assert!(dotenv.starts_with("loaded") && dotenv.ends_with(".env"), "{dotenv}");
}
