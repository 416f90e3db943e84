use std::path::Path;
use std::process::{Command, Output};

fn floc_simulator(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_floc-simulator"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn floc-simulator")
}

#[test]
fn prints_single_line_for_host_list() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("host_list.json"),
        r#"["example.com", "example.org"]"#,
    )
    .unwrap();

    let first = floc_simulator(&[], dir.path());
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    let stdout = String::from_utf8(first.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let value: u64 = stdout.trim_end().parse().expect("decimal sim hash");
    assert!(value < 1u64 << 50);

    let second = floc_simulator(&["host_list.json"], dir.path());
    assert_eq!(stdout, String::from_utf8(second.stdout).unwrap());
}

#[test]
fn missing_host_list_exits_non_zero_without_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = floc_simulator(&[], dir.path());

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("host_list.json"), "stderr: {stderr}");
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    assert!(stderr.starts_with("Error: "), "stderr: {stderr}");
}

#[test]
fn binary_format_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hosts.json"), r#"["example.com"]"#).unwrap();

    let output = floc_simulator(&["hosts.json", "--format", "binary", "--bits", "20"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.trim_end();
    assert_eq!(line.len(), 20);
    assert!(line.chars().all(|c| c == '0' || c == '1'));
}

#[test]
fn cohort_flag_prints_cluster_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hosts.json"), r#"["example.com"]"#).unwrap();
    // One cluster covering the whole 50-bit space.
    std::fs::write(dir.path().join("clusters.bin"), [50u8]).unwrap();

    let output = floc_simulator(
        &["hosts.json", "--clusters", "clusters.bin", "--cohort"],
        dir.path(),
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0\n");
}

#[test]
fn invalid_bits_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = floc_simulator(&["--bits", "0"], dir.path());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn piped_logs_carry_no_colour_codes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hosts.json"), r#"["example.com"]"#).unwrap();

    let output = floc_simulator(&["hosts.json", "-v"], dir.path());
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simhash_computed"), "stderr: {stderr}");
    assert!(!stderr.contains('\u{1b}'), "stderr: {stderr}");
}
