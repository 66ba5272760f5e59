//! Leakage checks over label tables.
//!
//! The two core checks are pure functions over [`LabelTable`]s:
//!
//! - [`uniqueness_outcome`]: a baseline table holds at most one row per
//!   subject. Longitudinal tables are reduced to their baseline view first,
//!   so they pass by construction.
//! - [`independence_outcome`]: two baseline tables share no
//!   (subject, session) key. Symmetric in its arguments.
//!
//! [`check_subject_uniqueness`] and [`check_partition_independence`] are the
//! path-based entry points returning a plain verdict and printing one report
//! line. Their `_with` variants send the line to a [`CheckObserver`] instead.

use crate::error::Result;
use crate::naming::{TableKind, TableRole};
use crate::report::{CheckObserver, ConsoleReporter};
use crate::schema::{SessionKey, TableSchema};
use crate::table::LabelTable;
use crate::validation::{CheckKind, CheckOutcome, CheckRecord};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::Path;

/// Default cap on offending identifiers listed in a failure reason.
pub const DEFAULT_MAX_REPORTED_KEYS: usize = 10;

/// Uniqueness verdict for a table of the given kind.
pub fn uniqueness_outcome(table: &LabelTable, kind: TableKind, max_keys: usize) -> CheckOutcome {
    let derived;
    let source = match kind {
        TableKind::Baseline => table,
        TableKind::Longitudinal => {
            derived = table.baseline_view();
            &derived
        }
    };
    let duplicates = source.duplicate_subjects();

    CheckOutcome::from_verdict(duplicates.is_empty(), || {
        format!(
            "Duplicated subjects: {}",
            limited(
                duplicates.iter().map(|(s, n)| format!("{s} ({n} rows)")),
                duplicates.len(),
                max_keys
            )
        )
    })
}

/// Uniqueness verdict as a boolean.
///
/// Longitudinal tables are checked through [`LabelTable::baseline_view`].
pub fn check_table_uniqueness(table: &LabelTable, kind: TableKind) -> bool {
    uniqueness_outcome(table, kind, 0).is_pass()
}

/// Load a table and check that it holds one row per subject.
///
/// Whether the table is a baseline extract is read from its file name.
/// Longitudinal tables are reduced to their baseline view before checking;
/// a file name that does not follow the naming contract is checked as a
/// baseline table. The report line is printed to stdout.
pub fn check_subject_uniqueness<P: AsRef<Path>>(path: P, schema: &TableSchema) -> Result<bool> {
    check_subject_uniqueness_with(path, schema, &ConsoleReporter::new())
}

/// [`check_subject_uniqueness`], reporting to the given observer.
pub fn check_subject_uniqueness_with<P: AsRef<Path>>(
    path: P,
    schema: &TableSchema,
    observer: &dyn CheckObserver,
) -> Result<bool> {
    let path = path.as_ref();
    let kind = TableRole::from_path(path).map_or(TableKind::Baseline, |r| r.kind);
    let table = LabelTable::load(path, schema)?;
    let outcome = uniqueness_outcome(&table, kind, DEFAULT_MAX_REPORTED_KEYS);
    Ok(report(
        CheckRecord::single(CheckKind::SubjectUniqueness, path, outcome),
        observer,
    ))
}

/// Keys present in both tables.
pub fn shared_keys(a: &LabelTable, b: &LabelTable) -> BTreeSet<SessionKey> {
    let b_keys = b.keys();
    a.records()
        .iter()
        .filter(|k| b_keys.contains(k))
        .cloned()
        .collect()
}

/// Subjects present in both tables, regardless of session.
pub fn shared_subjects(a: &LabelTable, b: &LabelTable) -> BTreeSet<String> {
    let b_subjects = b.subjects();
    a.subjects()
        .into_iter()
        .filter(|s| b_subjects.contains(s))
        .map(str::to_string)
        .collect()
}

/// True iff the tables share no (subject, session) key.
pub fn tables_independent(a: &LabelTable, b: &LabelTable) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let large_keys = large.keys();
    !small.records().iter().any(|k| large_keys.contains(k))
}

/// Independence verdict for a train / evaluation pair.
pub fn independence_outcome(a: &LabelTable, b: &LabelTable, max_keys: usize) -> CheckOutcome {
    let shared = shared_keys(a, b);
    CheckOutcome::from_verdict(shared.is_empty(), || {
        format!(
            "Shared keys: {}",
            limited(shared.iter(), shared.len(), max_keys)
        )
    })
}

/// Subject-level disjointness between a parent label's train table and a
/// sub-label's evaluation table.
pub fn subcategory_outcome(
    parent_train: &LabelTable,
    child_eval: &LabelTable,
    max_keys: usize,
) -> CheckOutcome {
    let shared = shared_subjects(parent_train, child_eval);
    CheckOutcome::from_verdict(shared.is_empty(), || {
        format!(
            "Shared subjects: {}",
            limited(shared.iter(), shared.len(), max_keys)
        )
    })
}

/// Load two baseline tables and check that they share no key.
///
/// The report line is printed to stdout.
pub fn check_partition_independence<P: AsRef<Path>, Q: AsRef<Path>>(
    a: P,
    b: Q,
    schema: &TableSchema,
) -> Result<bool> {
    check_partition_independence_with(a, b, schema, &ConsoleReporter::new())
}

/// [`check_partition_independence`], reporting to the given observer.
pub fn check_partition_independence_with<P: AsRef<Path>, Q: AsRef<Path>>(
    a: P,
    b: Q,
    schema: &TableSchema,
    observer: &dyn CheckObserver,
) -> Result<bool> {
    let (a, b) = (a.as_ref(), b.as_ref());
    let table_a = LabelTable::load(a, schema)?;
    let table_b = LabelTable::load(b, schema)?;
    let outcome = independence_outcome(&table_a, &table_b, DEFAULT_MAX_REPORTED_KEYS);
    Ok(report(
        CheckRecord::pair(CheckKind::PartitionIndependence, a, b, outcome),
        observer,
    ))
}

fn report(record: CheckRecord, observer: &dyn CheckObserver) -> bool {
    log::info!("{}", record.report_line());
    observer.on_check(&record);
    record.outcome.is_pass()
}

fn limited<I, T>(items: I, total: usize, max: usize) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let shown: Vec<String> = items.into_iter().take(max).map(|i| i.to_string()).collect();
    if total > shown.len() {
        format!("{} (+{} more)", shown.join(", "), total - shown.len())
    } else {
        shown.join(", ")
    }
}
