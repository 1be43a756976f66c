//! CLI test cases.
//!
//! These run the binary with `--engine sidecar`, so each "image" only needs a
//! transcript file next to it and no OCR models are loaded.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    Command::cargo_bin("fichas").unwrap()
}

/// Write a placeholder image and, when given, its transcript.
fn card(dir: &Path, image: &str, transcript: Option<&str>) {
    let path = dir.join(image);
    fs::write(&path, b"not decoded by the sidecar engine").unwrap();
    if let Some(text) = transcript {
        fs::write(path.with_extension("txt"), text).unwrap();
    }
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_batch_sidecar() {
    let cards = tempfile::tempdir().unwrap();
    card(
        cards.path(),
        "1.jpg",
        Some("Nombre: Ana\nApellido: García\nTeléfono: 300 123 4567\nBarrio: Centro"),
    );
    card(cards.path(), "2.jpg", None);
    card(cards.path(), "3.png", Some("Nombre: Luis\nCiudad: Cali"));

    let out = tempfile::tempdir().unwrap();
    let report = out.path().join("personas.txt");

    cmd()
        .arg("batch")
        .arg(cards.path())
        .arg("--engine")
        .arg("sidecar")
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    let report_text = fs::read_to_string(&report).unwrap();
    assert!(report_text.contains("REGISTRO #3"));
    assert!(report_text.contains("Archivo: 2.jpg"));
    assert!(report_text.contains("ERROR:"));

    let json = fs::read_to_string(out.path().join("personas.json")).unwrap();
    let docs: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0]["given_name"], "Ana");
    assert_eq!(docs[1]["kind"], "transcription");

    let csv = fs::read_to_string(out.path().join("personas.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().next().unwrap().ends_with("source_id,Barrio"));
}

#[test]
fn test_batch_refuses_to_overwrite() {
    let cards = tempfile::tempdir().unwrap();
    card(cards.path(), "1.jpg", Some("Nombre: Ana"));

    let out = tempfile::tempdir().unwrap();
    let report = out.path().join("personas.txt");
    fs::write(&report, "old").unwrap();

    cmd()
        .arg("batch")
        .arg(cards.path())
        .args(["--engine", "sidecar"])
        .arg("--output")
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    cmd()
        .arg("batch")
        .arg(cards.path())
        .args(["--engine", "sidecar", "--force"])
        .arg("--output")
        .arg(&report)
        .assert()
        .success();

    assert!(fs::read_to_string(&report).unwrap().contains("Archivo: 1.jpg"));
}

#[test]
fn test_batch_without_images_fails() {
    let cards = tempfile::tempdir().unwrap();
    fs::write(cards.path().join("readme.md"), "nothing here").unwrap();

    cmd()
        .arg("batch")
        .arg(cards.path())
        .args(["--engine", "sidecar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching images"));
}

#[test]
fn test_process_sidecar_json() {
    let cards = tempfile::tempdir().unwrap();
    card(
        cards.path(),
        "7.jpeg",
        Some("Nombre: Marta\nFecha de nacimiento: 1990-02-03\nProfesión: Docente"),
    );

    let output = cmd()
        .arg("process")
        .arg(cards.path().join("7.jpeg"))
        .args(["--engine", "sidecar", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["source_id"], "7.jpeg");
    assert_eq!(doc["given_name"], "Marta");
    assert_eq!(doc["birth_date"], "1990-02-03");
    assert_eq!(doc["extra_fields"]["Profesión"], "Docente");
}

#[test]
fn test_process_missing_transcript_fails() {
    let cards = tempfile::tempdir().unwrap();
    card(cards.path(), "8.jpg", None);

    cmd()
        .arg("process")
        .arg(cards.path().join("8.jpg"))
        .args(["--engine", "sidecar"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "export.missing_placeholder", "n/d"])
        .assert()
        .success();

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "export.missing_placeholder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"n/d\""));
}

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("personas_extraidas"));
}
