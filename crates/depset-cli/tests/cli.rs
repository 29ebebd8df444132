//! End-to-end runs of the `depset` binary against a local mirror.

use serde_json::Value;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn depset(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depset"))
        .args(args)
        .current_dir(workdir)
        .env("DEPSET_HOME", workdir.join("home"))
        .env_remove("DEPSET_CONFIG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run depset")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_settings(mirror: &Path, id: &str, json: &str) {
    let (owner, name) = id.split_once('/').unwrap();
    std::fs::create_dir_all(mirror.join(owner)).unwrap();
    std::fs::write(mirror.join(owner).join(format!("{name}.json")), json).unwrap();
}

fn mirror() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mirror = dir.path().join("mirror");
    write_settings(
        &mirror,
        "contoso/app",
        r#"{
            "appDependencyProbingPaths": [
                { "repo": "https://github.com/contoso/common", "version": "2.1", "release_status": "prerelease" }
            ],
            "appDependencies": ["https://cdn.example.com/apps/Base.app?sig=abc"]
        }"#,
    );
    write_settings(
        &mirror,
        "contoso/common",
        r#"{ "appDependencyProbingPaths": [ { "repo": "contoso/gone" } ] }"#,
    );
    dir
}

fn package(path: &Path, name: &str, deps: &[&str]) -> PathBuf {
    let deps: String = deps
        .iter()
        .map(|d| format!(r#"<Dependency Name="{d}" Publisher="Microsoft" MinVersion="18.0.0.0" />"#))
        .collect();
    let xml = format!(
        r#"<Package><App Name="{name}" Publisher="Contoso" Version="1.0.0.0" /><Dependencies>{deps}</Dependencies></Package>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("NavxManifest.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let file = path.join(format!("{name}.app"));
    std::fs::write(&file, bytes).unwrap();
    file
}

#[test]
fn test_resolve_json_lists_working_set() {
    let dir = mirror();
    let output = depset(
        dir.path(),
        &["resolve", "contoso/app", "--source", "mirror", "--json"],
    );
    assert!(output.status.success(), "{output:?}");

    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let ids: Vec<&str> = json["repos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["contoso/app", "contoso/common", "contoso/gone"]);
    assert_eq!(json["repos"][1]["versionConstraint"], "2.1");
    assert_eq!(json["repos"][1]["releaseChannel"], "prerelease");
    assert_eq!(json["files"][0]["name"], "Base.app");
    assert_eq!(json["files"][0]["contentHash"], "pending");
}

#[test]
fn test_resolve_reports_tree_and_failures() {
    let dir = mirror();
    let output = depset(dir.path(), &["resolve", "contoso/app", "--source", "mirror"]);
    assert!(output.status.success(), "{output:?}");

    let out = stdout(&output);
    assert!(out.contains("contoso/app"));
    assert!(out.contains("contoso/common"));
    assert!(out.contains("Base.app"));
    assert!(out.contains("No descriptor found for 'contoso/gone'"));
    assert!(out.contains("3 repositories, 1 files"));
}

#[test]
fn test_resolve_with_packages() {
    let dir = mirror();
    let sales = package(dir.path(), "Sales", &["Base", "Payroll"]);
    let output = depset(
        dir.path(),
        &[
            "resolve",
            "contoso/app",
            "--source",
            "mirror",
            "--app",
            sales.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{output:?}");

    let out = stdout(&output);
    assert!(out.contains("Sales.app depends on Payroll"));
    assert!(!out.contains("depends on Base "));
}

#[test]
fn test_inspect_prints_manifests() {
    let dir = tempfile::tempdir().unwrap();
    let base = package(dir.path(), "BaseApp_18.0.0.0", &[]);
    let sales = package(dir.path(), "Sales", &["BaseApp", "Payroll"]);

    let output = depset(
        dir.path(),
        &["inspect", base.to_str().unwrap(), sales.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");

    let out = stdout(&output);
    assert!(out.contains("Contoso"));
    assert!(out.contains("BaseApp by Microsoft (>= 18.0.0.0)"));
    assert!(out.contains("Sales.app depends on Payroll"));
    assert!(!out.contains("depends on BaseApp"));
}

#[test]
fn test_unknown_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = depset(dir.path(), &["resolve", "contoso/app", "--source", "nowhere"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("neither 'github' nor a directory"));
}

#[test]
fn test_project_config_is_read() {
    let dir = mirror();
    std::fs::write(
        dir.path().join("depset.toml"),
        "[engine]\nmax_concurrent_fetches = \"many\"\n",
    )
    .unwrap();
    let output = depset(dir.path(), &["resolve", "contoso/app", "--source", "mirror"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("depset.toml"));
}
