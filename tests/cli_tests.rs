//! Integration tests for the CLI application
//!
//! These tests run the compiled `rssk` binary against real sequence files.

use rssk::data::PrecomputedKernel;
use rssk::persistence::SerializableKernel;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Helper to create test sequence files
struct TestDataFiles {
    pub plain_file: NamedTempFile,
    pub labeled_file: NamedTempFile,
    pub fasta_file: NamedTempFile,
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        let mut plain_file = NamedTempFile::new()?;
        writeln!(plain_file, "# heavy chain CDR3")?;
        writeln!(plain_file, "CARDRGYFDY")?;
        writeln!(plain_file, "CARDGGYFDV")?;
        writeln!(plain_file, "GGYFDY")?;
        plain_file.flush()?;

        let mut labeled_file = NamedTempFile::with_suffix(".tsv")?;
        writeln!(labeled_file, "+1\tCARDRGYFDY")?;
        writeln!(labeled_file, "+1\tCARDGGYFDV")?;
        writeln!(labeled_file, "-1\tCTTGGYAMDV")?;
        writeln!(labeled_file, "-1\tGGYFDY")?;
        labeled_file.flush()?;

        let mut fasta_file = NamedTempFile::with_suffix(".fasta")?;
        writeln!(fasta_file, ">seq1 first")?;
        writeln!(fasta_file, "ACGTAC")?;
        writeln!(fasta_file, "GTTA")?;
        writeln!(fasta_file, ">seq2")?;
        writeln!(fasta_file, "ACGGTA")?;
        fasta_file.flush()?;

        Ok(TestDataFiles {
            plain_file,
            labeled_file,
            fasta_file,
        })
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rssk"))
        .args(args)
        .output()
        .expect("Failed to run CLI")
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_compute_libsvm_file() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let kernel_path = temp_dir.path().join("kernel.txt");

    let output = run(&[
        "compute",
        "--data",
        test_data.plain_file.path().to_str().unwrap(),
        "--output",
        kernel_path.to_str().unwrap(),
        "--min-kn",
        "1",
        "--max-kn",
        "3",
        "--lambda",
        "0.75",
    ]);
    assert_success(&output, "Compute command");

    let kernel = PrecomputedKernel::from_file(&kernel_path).expect("well-formed kernel file");
    assert_eq!(kernel.len(), 3);
    assert_eq!(kernel.labels(), &["0", "1", "2"]);
    for i in 0..3 {
        assert_eq!(kernel.kernel().get(i, i), 1.0);
    }
    assert!(kernel.kernel().is_symmetric(0.0));
}

#[test]
fn test_cli_compute_stdout_keeps_labels() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = run(&[
        "compute",
        "--data",
        test_data.labeled_file.path().to_str().unwrap(),
        "--double",
    ]);
    assert_success(&output, "Compute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("+1 0:1 1:1 "));
    assert!(lines[3].starts_with("-1 0:4 "));
}

#[test]
fn test_cli_compute_fasta_json_and_info() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let json_path = temp_dir.path().join("kernel.json");

    let output = run(&[
        "compute",
        "--data",
        test_data.fasta_file.path().to_str().unwrap(),
        "--output",
        json_path.to_str().unwrap(),
        "--output-format",
        "json",
        "--encoding",
        "compact",
        "--symbol-size",
        "4",
        "--threads",
        "2",
    ]);
    assert_success(&output, "Compute command");

    let kernel = SerializableKernel::load_from_file(&json_path).expect("valid JSON kernel");
    assert_eq!(kernel.labels, vec!["seq1", "seq2"]);
    assert_eq!(kernel.params.encoding, "compact");
    assert_eq!(kernel.params.symbol_size, 4);

    let info = run(&["info", json_path.to_str().unwrap()]);
    assert_success(&info, "Info command");
    let stdout = String::from_utf8_lossy(&info.stdout);
    assert!(stdout.contains("String Kernel Summary"));
    assert!(stdout.contains("Sequences: 2"));
}

#[test]
fn test_cli_compute_rejects_long_sequence() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = run(&[
        "compute",
        "--data",
        test_data.plain_file.path().to_str().unwrap(),
        "--max-length",
        "8",
    ]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_compute_invalid_parameters() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = run(&[
        "compute",
        "--data",
        test_data.plain_file.path().to_str().unwrap(),
        "--min-kn",
        "3",
        "--max-kn",
        "2",
    ]);
    assert!(!output.status.success());

    let output = run(&[
        "compute",
        "--data",
        test_data.plain_file.path().to_str().unwrap(),
        "--lambda",
        "1.5",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_compute_soft_matching() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let data_path = temp_dir.path().join("bases.txt");
    std::fs::write(&data_path, "A\nG\nC\n").expect("Failed to write sequences");
    let table_path = temp_dir.path().join("purines.txt");
    std::fs::write(&table_path, "   A   G\nA  1   0.5\nG  0.5 1\n")
        .expect("Failed to write substitution table");
    let kernel_path = temp_dir.path().join("kernel.txt");

    let output = run(&[
        "compute",
        "--data",
        data_path.to_str().unwrap(),
        "--format",
        "plain",
        "--output",
        kernel_path.to_str().unwrap(),
        "--max-kn",
        "1",
        "--no-normalize",
        "--double",
        "--substitution",
        table_path.to_str().unwrap(),
    ]);
    assert_success(&output, "Compute command");

    let kernel = PrecomputedKernel::from_file(&kernel_path).expect("well-formed kernel file");
    assert_eq!(kernel.kernel().get(0, 0), 0.25);
    assert_eq!(kernel.kernel().get(0, 1), 0.125);
    assert_eq!(kernel.kernel().get(0, 2), 0.0);

    let output = run(&[
        "compute",
        "--data",
        data_path.to_str().unwrap(),
        "--encoding",
        "compact",
        "--substitution",
        table_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_pairwise() {
    let output = run(&["pairwise", "CARDRG", "CARDRG"]);
    assert_success(&output, "Pairwise command");
    let score: f64 = String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .expect("score should be a number");
    assert!((score - 1.0).abs() < 1e-12);

    let output = run(&["pairwise", "abc", "xyz", "--matrix"]);
    assert_success(&output, "Pairwise command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["0", "-1 0:1 1:1 2:0", "-1 0:2 1:0 2:1"]);
}

#[test]
fn test_cli_missing_file() {
    let output = run(&["compute", "--data", "/non/existent/sequences.txt"]);
    assert!(!output.status.success());

    let output = run(&["info", "/non/existent/kernel.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert_success(&output, "Help");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("compute"));
    assert!(stdout.contains("pairwise"));
    assert!(stdout.contains("info"));
}
