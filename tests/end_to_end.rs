//! End-to-end scenarios straight off the concrete worked examples: each
//! test drives the session layer exactly as a `[[bin]]` target would,
//! through a real temp-file filesystem, and checks the rendered output
//! line(s).

use std::io::Write as _;
use std::path::PathBuf;

use hashdeep_core::cli::{CommonArgs, HASHDEEP};
use hashdeep_core::session;

fn args() -> CommonArgs {
    CommonArgs {
        algorithms: None,
        recursive: false,
        piecewise: None,
        known: Vec::new(),
        match_mode: false,
        match_neg_mode: false,
        match_mode_print: false,
        match_neg_mode_print: false,
        audit: false,
        show_matched: false,
        bare: true,
        relative: true,
        threshold_under: None,
        threshold_over: None,
        expert_types: None,
        winpe_only: false,
        triage: false,
        dfxml: false,
        escape_unicode: false,
        jobs: Some(2),
        output_file: None,
        zero_terminator: false,
        silent: true,
        verbose: 0,
        paths: Vec::new(),
    }
}

fn run_and_capture(cfg: session::Config, dir: &std::path::Path) -> (i32, String) {
    let out_path = dir.join("__out");
    let writer = std::fs::File::create(&out_path).unwrap();
    let code = session::run(cfg, writer).unwrap();
    (code, std::fs::read_to_string(&out_path).unwrap())
}

#[test]
fn scenario_1_empty_file_md5_only() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("empty.bin");
    std::fs::write(&file, b"").unwrap();

    let mut a = args();
    a.paths = vec![file];
    let cfg = session::build(HASHDEEP, a, "hashdeep empty.bin".to_string()).unwrap();
    let (code, out) = run_and_capture(cfg, dir.path());

    assert_eq!(code, session::EXIT_SUCCESS);
    assert!(
        out.contains("0,d41d8cd98f00b204e9800998ecf8427e,empty.bin"),
        "unexpected output: {out}"
    );
}

#[test]
fn scenario_2_short_file_two_algorithms() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("abc");
    std::fs::write(&file, b"abc").unwrap();

    let mut a = args();
    a.algorithms = Some("md5,sha1".to_string());
    a.paths = vec![file];
    let cfg = session::build(HASHDEEP, a, "hashdeep -c md5,sha1 abc".to_string()).unwrap();
    let (code, out) = run_and_capture(cfg, dir.path());

    assert_eq!(code, session::EXIT_SUCCESS);
    assert!(out.contains(
        "3,900150983cd24fb0d6963f7d28e17f72,a9993e364706816aba3e25717850c26c9cd0d89d,abc"
    ));
}

#[test]
fn scenario_3_piecewise_four_byte_pieces() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ten.bin");
    std::fs::write(&file, b"0123456789").unwrap();

    let mut a = args();
    a.piecewise = Some("4".to_string());
    a.paths = vec![file];
    let cfg = session::build(HASHDEEP, a, "hashdeep -p 4 ten.bin".to_string()).unwrap();
    let (code, out) = run_and_capture(cfg, dir.path());

    assert_eq!(code, session::EXIT_SUCCESS);
    let lines: Vec<&str> = out.lines().filter(|l| !l.starts_with("%%%%")).collect();
    assert_eq!(lines.len(), 3, "expected three piece records, got: {out}");
    assert!(lines[0].starts_with("4,") && lines[0].contains(" offset 0-3"));
    assert!(lines[1].starts_with("4,") && lines[1].contains(" offset 4-7"));
    assert!(lines[2].starts_with("2,") && lines[2].contains(" offset 8-9"));
}

#[test]
fn scenario_4_match_mode_positive_hit() {
    let dir = tempfile::tempdir().unwrap();
    let known_path = dir.path().join("known.txt");
    let mut known_file = std::fs::File::create(&known_path).unwrap();
    writeln!(known_file, "%%%% HASHDEEP-1.0").unwrap();
    writeln!(known_file, "%%%% size,md5,filename").unwrap();
    writeln!(
        known_file,
        "3,900150983cd24fb0d6963f7d28e17f72,other.txt"
    )
    .unwrap();
    drop(known_file);

    let target = dir.path().join("abc.txt");
    std::fs::write(&target, b"abc").unwrap();

    let mut a = args();
    a.match_mode = true;
    a.show_matched = true;
    a.known = vec![known_path];
    a.paths = vec![target];
    let cfg = session::build(HASHDEEP, a, "hashdeep -m -w -k known.txt abc.txt".to_string()).unwrap();
    let (code, out) = run_and_capture(cfg, dir.path());

    assert_eq!(code, session::EXIT_SUCCESS);
    assert!(out.contains("abc.txt matches other.txt"), "unexpected output: {out}");
}

#[test]
fn scenario_5_partial_match_counts_toward_audit() {
    let dir = tempfile::tempdir().unwrap();
    let known_path = dir.path().join("known.txt");
    let mut known_file = std::fs::File::create(&known_path).unwrap();
    writeln!(known_file, "%%%% HASHDEEP-1.0").unwrap();
    writeln!(known_file, "%%%% size,md5,sha256,filename").unwrap();
    let bad_sha256 = "b".repeat(64);
    writeln!(
        known_file,
        "3,900150983cd24fb0d6963f7d28e17f72,{bad_sha256},other.txt"
    )
    .unwrap();
    drop(known_file);

    let target = dir.path().join("abc.txt");
    std::fs::write(&target, b"abc").unwrap();

    let mut a = args();
    a.algorithms = Some("md5,sha256".to_string());
    a.audit = true;
    a.verbose = 1;
    a.known = vec![known_path];
    a.paths = vec![target];
    let cfg = session::build(HASHDEEP, a, "hashdeep -a -c md5,sha256 -k known.txt abc.txt".to_string()).unwrap();
    let (code, _out) = run_and_capture(cfg, dir.path());

    // A size-mismatch-free, hash-disagreeing record is a partial match, not
    // a pass: the known entry's sha256 never gets marked used.
    assert_eq!(code, session::EXIT_UNUSED_OR_AUDIT_FAIL);
}

#[test]
fn scenario_6_cycle_detection_emits_one_diagnostic_and_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let a_dir = dir.path().join("a");
    std::fs::create_dir(&a_dir).unwrap();
    std::fs::write(a_dir.join("real.txt"), b"hi").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(&a_dir, a_dir.join("loop")).unwrap();

    let mut a = args();
    a.recursive = true;
    a.paths = vec![a_dir];
    let cfg = session::build(HASHDEEP, a, "hashdeep -r a".to_string()).unwrap();

    // Runs to completion (no infinite loop) and hashes the one real file
    // exactly once.
    let (code, out) = run_and_capture(cfg, dir.path());
    assert_eq!(code, session::EXIT_SUCCESS);
    let hash_lines = out.lines().filter(|l| !l.starts_with("%%%%")).count();
    assert_eq!(hash_lines, 1);
}

#[test]
fn over_threshold_file_gets_starred_hash() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("big.bin");
    std::fs::write(&file, vec![0u8; 100]).unwrap();

    let mut a = args();
    a.threshold_over = Some(10);
    a.paths = vec![file];
    let cfg = session::build(HASHDEEP, a, "hashdeep -I 10 big.bin".to_string()).unwrap();
    let (code, out) = run_and_capture(cfg, dir.path());

    assert_eq!(code, session::EXIT_SUCCESS);
    assert!(out.contains(&"*".repeat(32)), "expected a starred md5 field: {out}");
}

#[test]
fn unknown_algorithm_name_is_a_user_error() {
    let mut a = args();
    a.algorithms = Some("md5,not-a-real-algorithm".to_string());
    a.paths = vec![PathBuf::from("/dev/null")];
    assert!(session::build(HASHDEEP, a, "hashdeep -c md5,not-a-real-algorithm /dev/null".to_string()).is_err());
}
