//! CLI end-to-end tests
//!
//! Tests for the bin-to-ecs-converter command-line interface.

use assert_cmd::prelude::*;
use bin_to_ecs_converter::catalog::content_digest;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the converter binary
#[allow(deprecated)]
fn converter_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bin-to-ecs-converter").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_game(dir: &Path, name: &str, words: usize, cfg: Option<&str>) {
    fs::write(dir.join(format!("{}.bin", name)), vec![0x11u8; words * 2]).unwrap();
    if let Some(cfg) = cfg {
        fs::write(dir.join(format!("{}.cfg", name)), cfg).unwrap();
    }
}

#[test]
fn test_cli_no_args_shows_help() {
    converter_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    converter_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bin-to-ecs-converter"));
}

#[test]
fn test_cli_convert_with_cfg() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "game", 0x1000, Some("[mapping]\n$0000 - $0FFF = $5000\n"));

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "game.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 converted, 0 failed"));

    let ecs = fs::read(dir.path().join("game.ecs")).unwrap();
    assert_eq!(&ecs[0..8], b"ECSINTV0");
    assert_eq!(ecs.len(), 0x70 + 2 * 4096);
}

#[test]
fn test_cli_unknown_image_fails_but_batch_continues() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "known", 0x800, Some("[mapping]\n$0000 - $07FF = $6000\n"));
    write_game(dir.path(), "unknown", 0x800, None);

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "."])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 converted, 1 failed"))
        .stderr(predicate::str::contains("Unknown format"));

    assert!(dir.path().join("known.ecs").exists());
    assert!(!dir.path().join("unknown.ecs").exists());
}

#[test]
fn test_cli_convert_quoted_pattern() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "one", 0x800, Some("[mapping]\n$0000 - $07FF = $5000\n"));
    write_game(dir.path(), "two", 0x800, Some("[mapping]\n$0000 - $07FF = $6000\n"));
    fs::write(dir.path().join("notes.txt"), "not a rom").unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "*.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 converted, 0 failed"));

    assert!(dir.path().join("one.ecs").exists());
    assert!(dir.path().join("two.ecs").exists());
}

#[test]
fn test_cli_pattern_without_matches_fails() {
    let dir = tempdir().unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "*.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .bin files found"));
}

#[test]
fn test_cli_fallback_mapper() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "plain", 0x4000, None);

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "--mapper", "0", "plain.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mapper 0"));

    let ecs = fs::read(dir.path().join("plain.ecs")).unwrap();
    assert_eq!(ecs.len(), 0x70 + 0x8000);
}

#[test]
fn test_cli_catalog_lookup() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "title", 0x2000, None);
    let image = fs::read(dir.path().join("title.bin")).unwrap();
    fs::write(
        dir.path().join("titles.toml"),
        format!("[[title]]\nname = \"Test Title\"\ndigest = \"{}\"\nmapper = \"6\"\n", content_digest(&image)),
    )
    .unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "--catalog", "titles.toml", "title.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Title"));
}

#[test]
fn test_cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "game", 0x800, Some("[mapping]\n$0000 - $07FF = $5000\n"));
    fs::write(dir.path().join("game.ecs"), b"keep").unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "game.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read(dir.path().join("game.ecs")).unwrap(), b"keep");

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "--force", "game.bin"])
        .assert()
        .success();
    assert_ne!(fs::read(dir.path().join("game.ecs")).unwrap(), b"keep");
}

#[test]
fn test_cli_config_file_fallback() {
    let dir = tempdir().unwrap();
    write_game(dir.path(), "plain", 0x2000, None);
    fs::write(dir.path().join("bin2ecs.toml"), "fallback_mapper = \"7\"\noutput_dir = \"out\"\n").unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "plain.bin"])
        .assert()
        .success();
    assert!(dir.path().join("out").join("plain.ecs").exists());
}

#[test]
fn test_cli_inspect() {
    let dir = tempdir().unwrap();
    write_game(
        dir.path(),
        "paged",
        0x1000,
        Some("[mapping]\n$0000 - $07FF = $5000\n$0800 - $0FFF = $9000 PAGE 2\n[memattr]\n$D000 - $D3FF = RAM 8\n"),
    );

    converter_cmd()
        .current_dir(dir.path())
        .args(["convert", "paged.bin"])
        .assert()
        .success();

    converter_cmd()
        .current_dir(dir.path())
        .args(["inspect", "paged.ecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$5000-$57FF  static"))
        .stdout(predicate::str::contains("$9000-$97FF  paged [2]"))
        .stdout(predicate::str::contains("$D000-$D7FF  RAM 8-bit"));
}

#[test]
fn test_cli_inspect_rejects_garbage() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("junk.ecs"), b"not an ecs file").unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["inspect", "junk.ecs"])
        .assert()
        .failure();
}

#[test]
fn test_cli_mappers() {
    converter_cmd()
        .arg("mappers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mapper 0"))
        .stdout(predicate::str::contains("$0000-$1FFF -> $5000"));
}

#[test]
fn test_cli_digest() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty.bin"), b"").unwrap();

    converter_cmd()
        .current_dir(dir.path())
        .args(["digest", "empty.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ));
}
