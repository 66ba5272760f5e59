//! End-to-end suite scenarios over split directories written to disk.
//!
//! Each test builds the directory layout a split / k-fold tool would have
//! produced and checks the verdicts the suite reaches on it.

use leakage_checker::{
    check_partition_independence, check_subject_uniqueness, run_leakage_suite, CheckError,
    CheckKind, CheckOutcome, CheckerConfig, LeakageSuite, SuiteMode, TableSchema,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a label table with the default identifier columns plus a
/// diagnosis column that the checker must ignore.
fn write_table(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let mut contents = String::from("participant_id\tsession_id\tdiagnosis\tage\n");
    for (subject, session) in rows {
        contents.push_str(&format!("{subject}\t{session}\tCN\t70.0\n"));
    }
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn suite() -> LeakageSuite {
    LeakageSuite::new(CheckerConfig::default())
}

fn files(record: &leakage_checker::CheckRecord) -> Vec<String> {
    record
        .files
        .iter()
        .map(|f| f.to_string_lossy().replace('\\', "/"))
        .collect()
}

// ============================================================================
// Single split
// ============================================================================

#[test]
fn test_disjoint_single_split_is_clean() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0"), ("S2", "M0")]);
    write_table(root, "test_baseline.tsv", &[("S3", "M0"), ("S4", "M0")]);

    let result = suite().run(root, SuiteMode::SingleSplit).unwrap();

    assert!(result.is_clean(), "{result}");
    assert_eq!(result.records_of(CheckKind::SubjectUniqueness).count(), 2);
    assert_eq!(result.records_of(CheckKind::PartitionIndependence).count(), 1);
    assert_eq!(result.passed_count(), 3);
}

#[test]
fn test_duplicate_subject_in_baseline_fails() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0"), ("S1", "M6")]);
    write_table(root, "test_baseline.tsv", &[("S3", "M0")]);

    let result = suite().run(root, SuiteMode::SingleSplit).unwrap();

    assert!(!result.is_clean());
    let failures: Vec<_> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, CheckKind::SubjectUniqueness);
    assert_eq!(
        failures[0].report_line(),
        "Subject uniqueness is FALSE in train_baseline.tsv. Duplicated subjects: S1 (2 rows)"
    );
}

#[test]
fn test_shared_key_between_train_and_test_fails() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0")]);
    write_table(root, "test_baseline.tsv", &[("S1", "M0")]);

    let result = suite().run(root, SuiteMode::SingleSplit).unwrap();

    assert!(!result.is_clean());
    let pair = result
        .records_of(CheckKind::PartitionIndependence)
        .next()
        .unwrap();
    assert_eq!(
        pair.outcome,
        CheckOutcome::Fail("Shared keys: (S1, M0)".to_string())
    );
    assert_eq!(files(pair), vec!["train_baseline.tsv", "test_baseline.tsv"]);
}

#[test]
fn test_partition_directories_with_labelled_tables() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let train = root.join("train");
    let test = root.join("test");

    write_table(&train, "AD.tsv", &[("A1", "ses-M000"), ("A1", "ses-M006"), ("A2", "ses-M000")]);
    write_table(&train, "AD_baseline.tsv", &[("A1", "ses-M000"), ("A2", "ses-M000")]);
    write_table(&test, "AD_baseline.tsv", &[("A3", "ses-M000")]);
    write_table(&train, "CN_baseline.tsv", &[("C1", "ses-M000"), ("C2", "ses-M000")]);
    write_table(&test, "CN_baseline.tsv", &[("C2", "ses-M000")]);

    let result = suite().run(root, SuiteMode::SingleSplit).unwrap();

    // AD.tsv is longitudinal: two sessions for A1 are expected there
    assert_eq!(result.records_of(CheckKind::SubjectUniqueness).count(), 5);
    assert!(result
        .records_of(CheckKind::SubjectUniqueness)
        .all(|r| r.outcome.is_pass()));

    let pairs: Vec<_> = result.records_of(CheckKind::PartitionIndependence).collect();
    assert_eq!(pairs.len(), 2);
    assert!(pairs[0].outcome.is_pass());
    assert_eq!(
        files(pairs[1]),
        vec!["train/CN_baseline.tsv", "test/CN_baseline.tsv"]
    );
    assert!(!pairs[1].outcome.is_pass());
}

#[test]
fn test_single_split_missing_test_table_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0")]);

    let result = suite().run(root, SuiteMode::SingleSplit).unwrap();

    assert!(!result.is_clean());
    let pair = result
        .records_of(CheckKind::PartitionIndependence)
        .next()
        .unwrap();
    match &pair.outcome {
        CheckOutcome::Error(reason) => assert!(reason.contains("test_baseline.tsv")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    // The uniqueness check on the table that does exist still ran
    assert_eq!(result.passed_count(), 1);
}

#[test]
fn test_custom_subset_name() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0")]);
    write_table(root, "validation_baseline.tsv", &[("S1", "M0")]);

    let config = CheckerConfig::default().with_subset_name("validation");
    let result = LeakageSuite::new(config)
        .run(root, SuiteMode::SingleSplit)
        .unwrap();

    assert_eq!(result.failed_count(), 1);
    assert_eq!(
        result.failures().next().unwrap().kind,
        CheckKind::PartitionIndependence
    );
}

// ============================================================================
// K-fold
// ============================================================================

fn write_fold(root: &Path, fold: &str, train: &[(&str, &str)], validation: &[(&str, &str)]) {
    let dir = root.join(fold);
    write_table(&dir, "train_baseline.tsv", train);
    write_table(&dir, "validation_baseline.tsv", validation);
}

#[test]
fn test_kfold_disjoint_folds_are_clean() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0"), ("S2", "M0")], &[("S3", "M0")]);
    write_fold(root, "fold-1", &[("S1", "M0"), ("S3", "M0")], &[("S2", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();

    assert!(result.is_clean(), "{result}");
    assert_eq!(result.records_of(CheckKind::SubjectUniqueness).count(), 4);
    assert_eq!(result.records_of(CheckKind::PartitionIndependence).count(), 2);
}

#[test]
fn test_kfold_leak_in_one_fold_only_fails_that_fold() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0"), ("S2", "M0")], &[("S3", "M0")]);
    write_fold(root, "fold-1", &[("S1", "M0"), ("S3", "M0")], &[("S3", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();

    assert!(!result.is_clean());
    let pairs: Vec<_> = result.records_of(CheckKind::PartitionIndependence).collect();
    assert_eq!(pairs.len(), 2);
    assert_eq!(files(pairs[0])[0], "fold-0/train_baseline.tsv");
    assert!(pairs[0].outcome.is_pass());
    assert_eq!(files(pairs[1])[0], "fold-1/train_baseline.tsv");
    assert!(!pairs[1].outcome.is_pass());
    assert_eq!(result.failed_count(), 1);
}

#[test]
fn test_kfold_nested_layout_is_walked() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let splits = root.join("train_splits-2");
    write_fold(&splits, "split-0", &[("S1", "M0")], &[("S2", "M0")]);
    write_fold(&splits, "split-1", &[("S2", "M0")], &[("S1", "M0")]);
    write_table(root, "AD.tsv", &[("S1", "M0"), ("S1", "M6"), ("S2", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();

    assert!(result.is_clean(), "{result}");
    assert_eq!(result.records_of(CheckKind::SubjectUniqueness).count(), 5);
    assert_eq!(result.records_of(CheckKind::PartitionIndependence).count(), 2);
}

#[test]
fn test_kfold_half_present_pair_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0")], &[("S2", "M0")]);
    write_table(&root.join("fold-1"), "train_baseline.tsv", &[("S1", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();

    assert!(result.is_clean());
    assert_eq!(result.skipped_count(), 1);
    let skipped = result
        .records()
        .iter()
        .find(|r| r.outcome.is_skipped())
        .unwrap();
    assert!(skipped.report_line().contains("SKIPPED"));
}

#[test]
fn test_kfold_malformed_table_does_not_stop_suite() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let fold0 = root.join("fold-0");
    fs::create_dir_all(&fold0).unwrap();
    fs::write(fold0.join("train_baseline.tsv"), "participant_id\tdiagnosis\nS1\tAD\n").unwrap();
    write_table(&fold0, "validation_baseline.tsv", &[("S2", "M0")]);
    write_fold(root, "fold-1", &[("S1", "M0")], &[("S2", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();

    assert!(!result.is_clean());
    // Uniqueness and pair check of fold-0 both error on the malformed table
    assert_eq!(result.failed_count(), 2);
    let fold1_pair = result
        .records_of(CheckKind::PartitionIndependence)
        .find(|r| files(r)[0].starts_with("fold-1"))
        .unwrap();
    assert!(fold1_pair.outcome.is_pass());
    assert!(result
        .failures()
        .all(|r| matches!(&r.outcome, CheckOutcome::Error(reason) if reason.contains("session_id"))));
}

#[test]
fn test_fold_count_mismatch_is_a_warning_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0")], &[("S2", "M0")]);
    write_fold(root, "fold-1", &[("S2", "M0")], &[("S1", "M0")]);

    let result = suite().run(root, SuiteMode::KFold { fold_count: 5 }).unwrap();
    assert!(result.is_clean());
    assert_eq!(result.records_of(CheckKind::FoldCoverage).count(), 0);
}

#[test]
fn test_strict_fold_count() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0")], &[("S2", "M0")]);
    write_fold(root, "fold-1", &[("S2", "M0")], &[("S1", "M0")]);

    let strict = LeakageSuite::new(CheckerConfig::default().with_strict_fold_count(true));

    let result = strict.run(root, SuiteMode::KFold { fold_count: 5 }).unwrap();
    assert!(!result.is_clean());
    let coverage = result.records_of(CheckKind::FoldCoverage).next().unwrap();
    assert_eq!(
        coverage.outcome,
        CheckOutcome::Fail("Expected 5 folds, found 2".to_string())
    );

    let result = strict.run(root, SuiteMode::KFold { fold_count: 2 }).unwrap();
    assert!(result.is_clean());
    assert_eq!(result.records_of(CheckKind::FoldCoverage).count(), 1);
}

#[test]
fn test_subcategory_leak_between_mci_and_smci() {
    let temp_dir = TempDir::new().unwrap();
    let fold = temp_dir.path().join("split-0");
    write_table(&fold, "MCI_train_baseline.tsv", &[("S1", "M0"), ("S4", "M0")]);
    write_table(&fold, "MCI_validation_baseline.tsv", &[("S2", "M0")]);
    write_table(&fold, "sMCI_train_baseline.tsv", &[("S3", "M0")]);
    write_table(&fold, "sMCI_validation_baseline.tsv", &[("S1", "M12")]);

    let result = suite()
        .run(temp_dir.path(), SuiteMode::KFold { fold_count: 1 })
        .unwrap();

    // Same-label pairs are independent on (subject, session) ...
    assert!(result
        .records_of(CheckKind::PartitionIndependence)
        .all(|r| r.outcome.is_pass()));
    // ... but an MCI training subject is evaluated in sMCI
    let sub: Vec<_> = result.records_of(CheckKind::SubcategoryIndependence).collect();
    assert_eq!(sub.len(), 1);
    assert_eq!(
        files(sub[0]),
        vec!["split-0/MCI_train_baseline.tsv", "split-0/sMCI_validation_baseline.tsv"]
    );
    assert_eq!(sub[0].outcome, CheckOutcome::Fail("Shared subjects: S1".to_string()));
}

#[test]
fn test_subcategory_rules_can_be_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let fold = temp_dir.path().join("split-0");
    write_table(&fold, "MCI_train_baseline.tsv", &[("S1", "M0")]);
    write_table(&fold, "sMCI_validation_baseline.tsv", &[("S1", "M12")]);

    let config = CheckerConfig::default().with_subcategories(Vec::new());
    let result = LeakageSuite::new(config)
        .run(temp_dir.path(), SuiteMode::KFold { fold_count: 1 })
        .unwrap();

    assert_eq!(result.records_of(CheckKind::SubcategoryIndependence).count(), 0);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_suite_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fold(root, "fold-0", &[("S1", "M0"), ("S1", "M6")], &[("S3", "M0")]);
    write_fold(root, "fold-1", &[("S1", "M0"), ("S3", "M0")], &[("S3", "M0")]);
    write_table(&root.join("fold-2"), "train_baseline.tsv", &[("S1", "M0")]);

    let first = suite().run(root, SuiteMode::KFold { fold_count: 3 }).unwrap();
    let second = suite().run(root, SuiteMode::KFold { fold_count: 3 }).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_longitudinal_tables_pass_after_baseline_derivation() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let longitudinal = write_table(
        root,
        "train.tsv",
        &[("S1", "ses-M000"), ("S1", "ses-M006"), ("S1", "ses-M012"), ("S2", "ses-M006")],
    );
    let baseline = write_table(root, "train_baseline.tsv", &[("S1", "ses-M000"), ("S1", "ses-M006")]);

    let schema = TableSchema::default();
    assert!(check_subject_uniqueness(&longitudinal, &schema).unwrap());
    assert!(!check_subject_uniqueness(&baseline, &schema).unwrap());
}

#[test]
fn test_partition_independence_is_symmetric() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let schema = TableSchema::default();

    let a = write_table(root, "a_train_baseline.tsv", &[("S1", "M0"), ("S2", "M0")]);
    let b = write_table(root, "a_test_baseline.tsv", &[("S2", "M0"), ("S5", "M0")]);
    let c = write_table(root, "c_test_baseline.tsv", &[("S7", "M0")]);

    for (x, y) in [(&a, &b), (&a, &c), (&b, &c)] {
        assert_eq!(
            check_partition_independence(x, y, &schema).unwrap(),
            check_partition_independence(y, x, &schema).unwrap()
        );
    }
    assert!(!check_partition_independence(&a, &b, &schema).unwrap());
    assert!(check_partition_independence(&a, &c, &schema).unwrap());
}

#[test]
fn test_path_checks_surface_table_errors() {
    let temp_dir = TempDir::new().unwrap();
    let schema = TableSchema::default();
    let missing = temp_dir.path().join("test_baseline.tsv");

    let err = check_subject_uniqueness(&missing, &schema).unwrap_err();
    assert!(matches!(err, CheckError::NotFound { .. }));

    let present = write_table(temp_dir.path(), "train_baseline.tsv", &[("S1", "M0")]);
    let err = check_partition_independence(&present, &missing, &schema).unwrap_err();
    assert!(matches!(err, CheckError::NotFound { .. }));
}

#[test]
fn test_run_leakage_suite_convenience() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_table(root, "train_baseline.tsv", &[("S1", "M0"), ("S2", "M0")]);
    write_table(root, "test_baseline.tsv", &[("S3", "M0"), ("S4", "M0")]);

    let result = run_leakage_suite(root, 0).unwrap();
    assert!(result.is_clean());

    let err = run_leakage_suite(root.join("missing"), 2).unwrap_err();
    assert!(err.is_fatal());
}
