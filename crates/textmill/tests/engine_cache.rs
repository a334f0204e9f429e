//! End-to-end engine behavior around the result cache.

use std::path::{Path, PathBuf};
use textmill::{Capabilities, DocumentEngine, EngineConfig};

fn engine(dir: &Path) -> DocumentEngine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = EngineConfig {
        cache_dir: dir.join("cache"),
        log_dir: dir.join("logs"),
        ..EngineConfig::default()
    };
    DocumentEngine::new(config, Capabilities::none()).unwrap()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_utf8_text_file_round_trip_with_cache_hit() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine(dir.path());
    let report = write_file(dir.path(), "report.txt", "Hello\nWorld");

    let first = engine.extract_text(&report);
    assert!(first.success);
    assert_eq!(first.text, "Hello\nWorld");

    // Swap the content for something else of identical size, restoring the
    // mtime. A fresh decode would see the new bytes; the cache must not.
    let mtime = std::fs::metadata(&report).unwrap().modified().unwrap();
    std::fs::write(&report, "Other\nBytes").unwrap();
    filetime::set_file_mtime(&report, filetime::FileTime::from_system_time(mtime)).unwrap();

    let second = engine.extract_text(&report);
    assert!(second.success);
    assert_eq!(second.text, "Hello\nWorld");
}

#[test]
fn test_changed_file_invalidates_and_re_extracts() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine(dir.path());
    let report = write_file(dir.path(), "report.txt", "version one");

    assert_eq!(engine.extract_text(&report).text, "version one");
    std::fs::write(&report, "version two is longer").unwrap();
    assert_eq!(engine.extract_text(&report).text, "version two is longer");
}

#[test]
fn test_blank_extraction_fails_and_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine(dir.path());
    let blank = write_file(dir.path(), "blank.txt", " \n\t \n");

    let result = engine.extract_text(&blank);
    assert!(!result.success);
    assert_eq!(engine.cache_len(), 0);

    // A second attempt runs extraction again and fails again.
    assert!(!engine.extract_text(&blank).success);
    assert_eq!(engine.error_summary().get("no-usable-text"), Some(&2));
}

#[test]
fn test_cache_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let report = write_file(dir.path(), "report.txt", "persistent content");

    {
        let mut first = engine(dir.path());
        assert!(first.extract_text(&report).success);
        first.save_cache().unwrap();
    }

    let mut second = engine(dir.path());
    assert_eq!(second.cache_len(), 1);
    assert_eq!(second.extract_text(&report).text, "persistent content");
}

#[test]
fn test_clear_cache_forces_re_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine(dir.path());
    let report = write_file(dir.path(), "report.txt", "cached once");

    assert!(engine.extract_text(&report).success);
    engine.clear_cache().unwrap();
    assert_eq!(engine.cache_len(), 0);

    assert!(engine.extract_text(&report).success);
    assert_eq!(engine.cache_len(), 1);
}

#[test]
fn test_cp1251_file_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine(dir.path());
    // "документ" in windows-1251.
    let path = dir.path().join("legacy.txt");
    std::fs::write(&path, [0xE4, 0xEE, 0xEA, 0xF3, 0xEC, 0xE5, 0xED, 0xF2]).unwrap();

    let result = engine.extract_text(&path);
    assert!(result.success);
    assert_eq!(result.text, "документ");
}
