use super::{options, read, workspace};
use udiff_patcher::line_ending::LineEndingCounts;
use udiff_patcher::{parse, run_patches, FileOutcome, LineEnding, RunSummary};

struct Scenario {
    name: &'static str,
    source: &'static str,
    content: &'static str,
    patch: &'static str,
    expected: &'static str,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "append line to CRLF file",
        source: "file1.txt",
        content: "Line 1\r\nLine 2\r\nLine 3\r\n",
        patch: "--- a/file1.txt\n+++ b/file1.txt\n@@ -1,3 +1,4 @@\n Line 1\n Line 2\n Line 3\n+Line 4\n",
        expected: "Line 1\r\nLine 2\r\nLine 3\r\nLine 4\r\n",
    },
    Scenario {
        name: "replace middle line",
        source: "file2.txt",
        content: "Alpha\nBeta\nGamma\n",
        patch: "--- a/file2.txt\n+++ b/file2.txt\n@@ -1,3 +1,3 @@\n Alpha\n-Beta\n+Delta\n Gamma\n",
        expected: "Alpha\nDelta\nGamma\n",
    },
    Scenario {
        name: "delete line from CRLF file",
        source: "file3.txt",
        content: "One\r\nTwo\r\nThree\r\nFour\r\n",
        patch: "--- a/file3.txt\n+++ b/file3.txt\n@@ -2,3 +2,2 @@\n Two\n-Three\n Four\n",
        expected: "One\r\nTwo\r\nFour\r\n",
    },
    Scenario {
        name: "add line at beginning",
        source: "file4.txt",
        content: "Second\nThird\nFourth\n",
        patch: "--- a/file4.txt\n+++ b/file4.txt\n@@ -1,3 +1,4 @@\n+First\n Second\n Third\n Fourth\n",
        expected: "First\nSecond\nThird\nFourth\n",
    },
    Scenario {
        name: "add several lines in middle",
        source: "file5.txt",
        content: "Start\nEnd\n",
        patch: "--- a/file5.txt\n+++ b/file5.txt\n@@ -1,2 +1,4 @@\n Start\n+Middle1\n+Middle2\n End\n",
        expected: "Start\nMiddle1\nMiddle2\nEnd\n",
    },
    Scenario {
        name: "two hunks in one file",
        source: "file6.txt",
        content: "A\nB\nC\nD\nE\nF\n",
        patch: "--- a/file6.txt\n+++ b/file6.txt\n@@ -1,2 +1,2 @@\n-A\n+AA\n B\n@@ -5,2 +5,2 @@\n E\n-F\n+FF\n",
        expected: "AA\nB\nC\nD\nE\nFF\n",
    },
    Scenario {
        name: "delete first line",
        source: "file7.txt",
        content: "Remove\nKeep1\nKeep2\n",
        patch: "--- a/file7.txt\n+++ b/file7.txt\n@@ -1,3 +1,2 @@\n-Remove\n Keep1\n Keep2\n",
        expected: "Keep1\nKeep2\n",
    },
    Scenario {
        name: "delete last line",
        source: "file8.txt",
        content: "Keep1\nKeep2\nRemove\n",
        patch: "--- a/file8.txt\n+++ b/file8.txt\n@@ -1,3 +1,2 @@\n Keep1\n Keep2\n-Remove\n",
        expected: "Keep1\nKeep2\n",
    },
    Scenario {
        name: "single line file with omitted counts",
        source: "file9.txt",
        content: "Original\n",
        patch: "--- a/file9.txt\n+++ b/file9.txt\n@@ -1 +1 @@\n-Original\n+Replaced\n",
        expected: "Replaced\n",
    },
    Scenario {
        name: "empty file gains content",
        source: "file10.txt",
        content: "",
        patch: "--- a/file10.txt\n+++ b/file10.txt\n@@ -0,0 +1,2 @@\n+First line\n+Second line\n",
        expected: "First line\r\nSecond line\r\n",
    },
    Scenario {
        name: "all content deleted",
        source: "file11.txt",
        content: "Delete me\nDelete me too\n",
        patch: "--- a/file11.txt\n+++ b/file11.txt\n@@ -1,2 +0,0 @@\n-Delete me\n-Delete me too\n",
        expected: "",
    },
    Scenario {
        name: "original without trailing newline",
        source: "file12.txt",
        content: "Line1\nLine2",
        patch: "--- a/file12.txt\n+++ b/file12.txt\n@@ -1,2 +1,3 @@\n Line1\n Line2\n+Line3\n",
        expected: "Line1\nLine2\nLine3\n",
    },
    Scenario {
        name: "mixed replacements and deletions",
        source: "file13.txt",
        content: "Keep1\nReplace1\nDelete1\nDelete2\nKeep2\nReplace2\nKeep3\n",
        patch: "--- a/file13.txt\n+++ b/file13.txt\n@@ -1,7 +1,6 @@\n Keep1\n-Replace1\n-Delete1\n-Delete2\n+NewReplace1\n+AddedLine\n Keep2\n-Replace2\n+NewReplace2\n Keep3\n",
        expected: "Keep1\nNewReplace1\nAddedLine\nKeep2\nNewReplace2\nKeep3\n",
    },
    Scenario {
        name: "whitespace only changes",
        source: "file14.txt",
        content: "Line with spaces   \nLine with tabs\t\t\nNormal line\n",
        patch: "--- a/file14.txt\n+++ b/file14.txt\n@@ -1,3 +1,3 @@\n-Line with spaces   \n+Line with spaces\n-Line with tabs\t\t\n+Line with tabs\t\n Normal line\n",
        expected: "Line with spaces\nLine with tabs\t\nNormal line\n",
    },
    Scenario {
        name: "wide context",
        source: "file15.txt",
        content: "Context1\nContext2\nContext3\nOldLine\nContext4\nContext5\nContext6\n",
        patch: "--- a/file15.txt\n+++ b/file15.txt\n@@ -1,7 +1,7 @@\n Context1\n Context2\n Context3\n-OldLine\n+NewLine\n Context4\n Context5\n Context6\n",
        expected: "Context1\nContext2\nContext3\nNewLine\nContext4\nContext5\nContext6\n",
    },
    Scenario {
        name: "mixed terminators follow the majority",
        source: "file16.txt",
        content: "Line1\r\nLine2\nLine3\r\nLine4\r\n",
        patch: "--- a/file16.txt\n+++ b/file16.txt\n@@ -2,3 +2,3 @@\n Line2\n-Line3\n+ReplacedLine3\n Line4\n",
        expected: "Line1\r\nLine2\r\nReplacedLine3\r\nLine4\r\n",
    },
];

/// All scenarios in one patch, separated by blank lines.
fn combined_patch() -> String {
    SCENARIOS
        .iter()
        .map(|s| format!("{}\n", s.patch))
        .collect()
}

#[test]
fn test_combined_patch_parses_into_one_file_patch_per_scenario() {
    let patches = parse(&combined_patch()).unwrap();

    assert_eq!(patches.len(), SCENARIOS.len());
    for (patch, scenario) in patches.iter().zip(SCENARIOS) {
        assert_eq!(patch.target_path().to_str(), Some(scenario.source));
        assert!(
            patch.hunks.iter().all(|h| h.counts_match()),
            "{}: body disagrees with header",
            scenario.name
        );
    }
    assert_eq!(patches[5].hunks.len(), 2);
}

#[test]
fn test_every_scenario_produces_expected_output() {
    let files: Vec<_> = SCENARIOS.iter().map(|s| (s.source, s.content)).collect();
    let dir = workspace(&files);
    let patches = parse(&combined_patch()).unwrap();

    let reports = run_patches(&patches, &options(dir.path(), LineEnding::Crlf));

    for (report, scenario) in reports.iter().zip(SCENARIOS) {
        let outcome = report
            .outcome
            .as_ref()
            .unwrap_or_else(|e| panic!("{}: {e}", scenario.name));
        let output = &outcome.file().output;
        assert!(matches!(outcome, FileOutcome::Patched(_)));
        assert_eq!(
            output.file_name().and_then(|n| n.to_str()),
            Some(scenario.source.replace(".txt", ".001.txt").as_str())
        );
        assert_eq!(read(output), scenario.expected, "{}", scenario.name);
        assert_eq!(
            read(dir.path().join(scenario.source)),
            scenario.content,
            "{}: original modified",
            scenario.name
        );
    }

    let summary = RunSummary::from_reports(&reports);
    assert_eq!(summary.patched, SCENARIOS.len());
    assert!(!summary.has_errors());
}

#[test]
fn test_crlf_patch_text_gives_same_results() {
    let files: Vec<_> = SCENARIOS.iter().map(|s| (s.source, s.content)).collect();
    let dir = workspace(&files);
    let patch = combined_patch().replace('\n', "\r\n");
    let patches = parse(&patch).unwrap();
    assert!(patches.iter().all(|p| p.patch_line_ending == LineEnding::Crlf));

    let reports = run_patches(&patches, &options(dir.path(), LineEnding::Crlf));

    for (report, scenario) in reports.iter().zip(SCENARIOS) {
        let file = report.outcome.as_ref().unwrap().file();
        assert_eq!(read(&file.output), scenario.expected, "{}", scenario.name);
    }
}

#[test]
fn test_crlf_source_with_lf_patch_stays_crlf() {
    let content = "WindowsLine1\r\nWindowsLine2\r\nWindowsLine3\r\n";
    let dir = workspace(&[("file17.txt", content)]);
    let patches = parse(
        "--- a/file17.txt\n+++ b/file17.txt\n@@ -1,3 +1,4 @@\n WindowsLine1\n WindowsLine2\n+UnixPatchAddition\n WindowsLine3\n",
    )
    .unwrap();
    assert_eq!(patches[0].patch_line_ending, LineEnding::Lf);

    let reports = run_patches(&patches, &options(dir.path(), LineEnding::Lf));
    let file = reports[0].outcome.as_ref().unwrap().file();

    assert_eq!(file.line_ending, LineEnding::Crlf);
    assert_eq!(file.patch_line_ending, LineEnding::Lf);
    let output = read(&file.output);
    assert_eq!(
        output,
        "WindowsLine1\r\nWindowsLine2\r\nUnixPatchAddition\r\nWindowsLine3\r\n"
    );

    let counts = LineEndingCounts::of(&output);
    assert_eq!((counts.crlf, counts.lf, counts.cr), (4, 0, 0));
}

#[test]
fn test_empty_original_uses_injected_fallback() {
    let scenario = &SCENARIOS[9];
    for (fallback, expected) in [
        (LineEnding::Lf, "First line\nSecond line\n"),
        (LineEnding::Cr, "First line\rSecond line\r"),
    ] {
        let dir = workspace(&[(scenario.source, scenario.content)]);
        let patches = parse(scenario.patch).unwrap();
        let reports = run_patches(&patches, &options(dir.path(), fallback));
        let file = reports[0].outcome.as_ref().unwrap().file();
        assert_eq!(read(&file.output), expected);
    }
}
