//! End-to-end tests running the discgatherer binary

use crate::fixtures::sample_tree;
use discgatherer::io::store::CatalogFile;
use discgatherer::services::catalog::Catalog;
use discgatherer::{DeviceProperties, Disc};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(catalog: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_discgatherer"))
        .arg("--catalog")
        .arg(catalog)
        .args(args)
        .env_remove("DISCGATHERER_DEVICE")
        .env_remove("DISCGATHERER_MOUNT_ROOT")
        .env_remove("DISCGATHERER_MOUNT_PATH")
        .output()
        .expect("Failed to execute discgatherer")
}

fn seed_catalog(path: &Path) {
    let mut catalog = Catalog::new();
    catalog.add(Disc::new(
        "HOLIDAYS_2019".to_string(),
        DeviceProperties::new(),
        sample_tree(),
    ));
    catalog.add(Disc::new(
        "WORK_BACKUP".to_string(),
        DeviceProperties::new(),
        sample_tree(),
    ));
    CatalogFile::new(path).save(&catalog).unwrap();
}

#[test]
fn test_help_lists_modes() {
    let output = Command::new(env!("CARGO_BIN_EXE_discgatherer"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--add"));
    assert!(stdout.contains("--search"));
    assert!(stdout.contains("--strict"));
}

#[test]
fn test_brief_on_empty_catalog_does_not_create_file() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");

    let output = run(&catalog, &["--brief"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(!catalog.exists());
}

#[test]
fn test_remove_unknown_id_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["--remove", "9"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no such disc ID"));
    assert_eq!(CatalogFile::new(&catalog).load().unwrap().len(), 2);
}

#[test]
fn test_remove_persists_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["-r", "1"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 -> HOLIDAYS_2019"));

    let reloaded = CatalogFile::new(&catalog).load().unwrap();
    let ids: Vec<_> = reloaded.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, [2]);
}

#[test]
fn test_add_without_drive_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");

    let output = run(&catalog, &["--add", "--device", "/definitely/not/a/drive"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no drive present"));
    assert!(!catalog.exists());
}

#[test]
fn test_search_prints_pruned_trees() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["-s", "girl", "-S"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = "[ID 1] disc HOLIDAYS_2019 [size: 3.7 KB]:
    a folder photos:
        a folder 2019:
            a file party-girl.jpg
";
    assert!(stdout.starts_with(expected), "unexpected output:\n{stdout}");
    assert!(stdout.contains("[ID 2] disc WORK_BACKUP"));
    assert!(!stdout.contains("girlfriend"));
}

#[test]
fn test_list_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["--list", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["label"], "WORK_BACKUP");
}

#[test]
fn test_non_numeric_remove_exits_with_two() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["-r", "abc"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input"));
    assert_eq!(CatalogFile::new(&catalog).load().unwrap().len(), 2);
}

#[test]
fn test_modes_run_in_fixed_order() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["-r", "1", "-b"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let brief = stdout.find("[ID 1] disc HOLIDAYS_2019").unwrap();
    let removed = stdout.find("1 -> HOLIDAYS_2019").unwrap();
    assert!(brief < removed, "brief should print before removal:\n{stdout}");
}

#[test]
fn test_failure_keeps_earlier_output_clean() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["-b", "-r", "9"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "[ID 1] disc HOLIDAYS_2019\n[ID 2] disc WORK_BACKUP\n\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("aborting"));
}

#[test]
fn test_first_failure_stops_remaining_modes() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = run(&catalog, &["--add", "--device", "/definitely/not/a/drive", "-b", "-r", "1"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(CatalogFile::new(&catalog).load().unwrap().len(), 2);
}

#[test]
fn test_blank_search_lists_every_disc() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    for words in ["", "   "] {
        let output = run(&catalog, &["-s", words]);

        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[ID 1] disc HOLIDAYS_2019"));
        assert!(stdout.contains("[ID 2] disc WORK_BACKUP"));
        assert_eq!(stdout.matches("a file party-girl.jpg").count(), 2);
        assert_eq!(stdout.matches("a file track01.mp3").count(), 2);
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_removal_is_saved_when_output_fails() {
    use std::fs::OpenOptions;
    use std::process::Stdio;

    let Ok(full) = OpenOptions::new().write(true).open("/dev/full") else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    let catalog = temp_dir.path().join("catalog.parquet");
    seed_catalog(&catalog);

    let output = Command::new(env!("CARGO_BIN_EXE_discgatherer"))
        .arg("--catalog")
        .arg(&catalog)
        .args(["-r", "1"])
        .stdout(Stdio::from(full))
        .output()
        .expect("Failed to execute discgatherer");

    assert_eq!(output.status.code(), Some(4));
    let reloaded = CatalogFile::new(&catalog).load().unwrap();
    let ids: Vec<_> = reloaded.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, [2]);
}
