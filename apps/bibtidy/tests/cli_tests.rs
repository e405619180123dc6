//! File-level tests for the bibtidy run entry point

use std::fs;
use std::path::{Path, PathBuf};

use bibtidy::{run, AppError, Cli};
use clap::Parser;
use tempfile::TempDir;

const LIBRARY: &str = r#"@inproceedings{vaswani,
  title = {Attention Is All You Need},
  author = {Vaswani, Ashish and Shazeer, Noam},
  booktitle = {Proceedings of the 34th Conference on Neural Information Processing Systems},
  year = {2017},
  url = {https://arxiv.org/abs/1706.03762},
}

@misc{again,
  title = {Attention is all you need},
  author = {Ashish Vaswani},
  year = {2017},
}
"#;

fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn cli(input: &Path, extra: &[&str]) -> Cli {
    let mut args = vec!["bibtidy".to_string(), input.display().to_string()];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::parse_from(args)
}

#[test]
fn test_writes_cleaned_file_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);

    let summary = run(&cli(&input, &[])).unwrap();

    let expected = dir.path().join("cleaned_refs.bib");
    assert_eq!(summary.output.as_deref(), Some(expected.as_path()));
    assert_eq!(summary.report.records_in, 2);
    assert_eq!(summary.report.records_out, 1);

    let written = fs::read_to_string(&expected).unwrap();
    assert_eq!(
        written,
        "@inproceedings{vaswani,\n    \
         title = {Attention Is All You Need},\n    \
         author = {Vaswani, Ashish and Shazeer, Noam},\n    \
         booktitle = {NeurIPS},\n    \
         year = 2017,\n}\n"
    );
    // Input is never modified
    assert_eq!(fs::read_to_string(&input).unwrap(), LIBRARY);
}

#[test]
fn test_explicit_output_and_reset_keys() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);
    let output = dir.path().join("out").join("tidy.bib");
    fs::create_dir(output.parent().unwrap()).unwrap();

    let summary = run(&cli(
        &input,
        &["-o", output.to_str().unwrap(), "--reset-keys"],
    ))
    .unwrap();

    assert_eq!(summary.report.keys_regenerated, 1);
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("@inproceedings{vaswani-2017-attention,"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);

    let summary = run(&cli(&input, &["--dry-run"])).unwrap();

    assert!(summary.output.is_none());
    assert_eq!(summary.report.duplicates.len(), 1);
    assert!(!dir.path().join("cleaned_refs.bib").exists());
    assert!(summary.to_string().contains("Duplicates removed: 1 (again)"));
}

#[test]
fn test_parse_error_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "broken.bib",
        "@article{ok, title = {Fine}}\n@article{bad, title = {Unclosed\n",
    );

    let err = run(&cli(&input, &[])).unwrap_err();

    assert!(matches!(err, AppError::Parse { .. }));
    assert!(!dir.path().join("cleaned_broken.bib").exists());
}

#[test]
fn test_missing_input_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = run(&cli(&dir.path().join("nope.bib"), &[])).unwrap_err();
    assert!(matches!(err, AppError::Read { .. }));
}

#[test]
fn test_existing_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);
    let target = write_input(&dir, "cleaned_refs.bib", "stale contents that are much longer than needed");

    run(&cli(&input, &[])).unwrap();

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("@inproceedings{vaswani,"));
    assert!(!written.contains("stale"));
}

#[test]
fn test_config_override_replaces_section() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);
    let config = write_input(
        &dir,
        "tidy.toml",
        r#"
[[conference]]
canonical = "NIPS"
aliases = ["neural information processing systems"]
"#,
    );

    run(&cli(&input, &["--config", config.to_str().unwrap()])).unwrap();

    let written = fs::read_to_string(dir.path().join("cleaned_refs.bib")).unwrap();
    assert!(written.contains("booktitle = {NIPS},"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "refs.bib", LIBRARY);
    let config = write_input(&dir, "tidy.toml", "[pruning]\nalways = 3\n");

    let err = run(&cli(&input, &["--config", config.to_str().unwrap()])).unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
    assert!(!dir.path().join("cleaned_refs.bib").exists());
}
