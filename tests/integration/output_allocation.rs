use super::{options, read, workspace};
use std::fs;
use udiff_patcher::{parse, run_patches, FileOutcome, LineEnding, RunOptions, RunSummary};

const PATCH: &str = "--- a/src/program.py\n+++ b/src/program.py\n@@ -1,2 +1,2 @@\n-print('a')\n+print('b')\n pass\n";

fn program_dir() -> tempfile::TempDir {
    let dir = workspace(&[]);
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/program.py"), "print('a')\npass\n").unwrap();
    dir
}

#[test]
fn test_repeated_runs_allocate_fresh_numbers() {
    let dir = program_dir();
    let patches = parse(PATCH).unwrap();
    let opts = options(dir.path(), LineEnding::Lf);

    for expected in ["program.001.py", "program.002.py", "program.003.py"] {
        let reports = run_patches(&patches, &opts);
        let file = reports[0].outcome.as_ref().unwrap().file();
        assert_eq!(file.output, dir.path().join("src").join(expected));
    }

    assert_eq!(read(dir.path().join("src/program.001.py")), "print('b')\npass\n");
    assert_eq!(read(dir.path().join("src/program.003.py")), "print('b')\npass\n");
    assert_eq!(read(dir.path().join("src/program.py")), "print('a')\npass\n");
}

#[test]
fn test_existing_numbered_file_is_never_overwritten() {
    let dir = program_dir();
    fs::write(dir.path().join("src/program.001.py"), "keep me\n").unwrap();
    let patches = parse(PATCH).unwrap();

    let reports = run_patches(&patches, &options(dir.path(), LineEnding::Lf));
    let file = reports[0].outcome.as_ref().unwrap().file();

    assert_eq!(file.output, dir.path().join("src/program.002.py"));
    assert_eq!(read(dir.path().join("src/program.001.py")), "keep me\n");
}

#[test]
fn test_dry_run_reports_name_without_writing() {
    let dir = program_dir();
    let patches = parse(PATCH).unwrap();
    let opts = RunOptions {
        dry_run: true,
        ..options(dir.path(), LineEnding::Lf)
    };

    let reports = run_patches(&patches, &opts);
    match &reports[0].outcome {
        Ok(FileOutcome::Previewed(file)) => {
            assert_eq!(file.output, dir.path().join("src/program.001.py"));
            assert_eq!(file.after, "print('b')\npass\n");
        }
        other => panic!("expected preview, got {other:?}"),
    }
    assert!(!dir.path().join("src/program.001.py").exists());
    assert_eq!(RunSummary::from_reports(&reports).previewed, 1);
}

#[test]
fn test_sequence_width_and_extensionless_names() {
    let dir = workspace(&[("Makefile", "all:\n")]);
    let patches = parse("--- a/Makefile\n+++ b/Makefile\n@@ -1 +1,2 @@\n all:\n+\techo hi\n").unwrap();
    let opts = RunOptions {
        sequence_width: 5,
        ..options(dir.path(), LineEnding::Lf)
    };

    let reports = run_patches(&patches, &opts);
    let file = reports[0].outcome.as_ref().unwrap().file();

    assert_eq!(file.output, dir.path().join("Makefile.00001"));
    assert_eq!(read(&file.output), "all:\n\techo hi\n");
}

#[test]
fn test_failed_application_writes_nothing() {
    let dir = program_dir();
    let patches =
        parse("--- a/src/program.py\n+++ b/src/program.py\n@@ -9,2 +9,2 @@\n-x\n+y\n z\n").unwrap();

    let reports = run_patches(&patches, &options(dir.path(), LineEnding::Lf));

    assert!(reports[0].outcome.is_err());
    let entries: Vec<_> = fs::read_dir(dir.path().join("src"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("program.py")]);
}
