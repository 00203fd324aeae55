//! Agreement between oracle-driven and developer-driven refactorings.

use std::collections::BTreeSet;

use serde::Serialize;

use super::events::{EventType, RefactoringEvent};

/// An oracle event whose start line falls inside a developer event of the
/// same file and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub file: String,
    pub refactoring_type: String,
    pub oracle_start_line: u32,
    pub oracle_end_line: u32,
    pub developer_start_line: u32,
    pub developer_end_line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agreement {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub overlaps: usize,
    /// Files with at least one oracle refactoring.
    pub oracle_files: usize,
    /// Files with a valid developer refactoring that the oracle also touched.
    pub developer_files: usize,
    pub details: Vec<Overlap>,
}

/// Compares two event lists. Without `valid_types`, the types the oracle
/// produced are the valid ones.
#[must_use]
pub fn compute_agreement(
    oracle: &[RefactoringEvent],
    developer: &[RefactoringEvent],
    valid_types: Option<&[String]>,
) -> Agreement {
    let valid: BTreeSet<&str> = match valid_types {
        Some(types) => types.iter().map(String::as_str).collect(),
        None => oracle
            .iter()
            .filter(|e| !e.is_sentinel())
            .map(|e| e.kind.label())
            .collect(),
    };
    let is_valid = |kind: &EventType| !kind.is_sentinel() && valid.contains(kind.label());

    let oracle_files: BTreeSet<&str> = oracle
        .iter()
        .filter(|e| is_valid(&e.kind))
        .map(|e| e.file.as_str())
        .collect();
    let developer_files: BTreeSet<&str> = developer
        .iter()
        .filter(|e| is_valid(&e.kind))
        .map(|e| e.file.as_str())
        .filter(|f| oracle_files.contains(f))
        .collect();

    let details = find_overlaps(oracle, developer, &is_valid);
    let overlaps = details.len();
    let precision = ratio(overlaps, oracle_files.len());
    let recall = ratio(overlaps, developer_files.len());
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Agreement {
        precision,
        recall,
        f1,
        overlaps,
        oracle_files: oracle_files.len(),
        developer_files: developer_files.len(),
        details,
    }
}

fn find_overlaps(
    oracle: &[RefactoringEvent],
    developer: &[RefactoringEvent],
    is_valid: &dyn Fn(&EventType) -> bool,
) -> Vec<Overlap> {
    let mut out = Vec::new();
    for o in oracle.iter().filter(|e| is_valid(&e.kind)) {
        let (Some(o_start), Some(o_end)) = (o.start_line, o.end_line) else {
            continue;
        };
        for d in developer.iter().filter(|e| is_valid(&e.kind)) {
            if d.file != o.file || d.kind != o.kind {
                continue;
            }
            let (Some(d_start), Some(d_end)) = (d.start_line, d.end_line) else {
                continue;
            };
            if (d_start..=d_end).contains(&o_start) {
                out.push(Overlap {
                    file: o.file.clone(),
                    refactoring_type: o.kind.label().to_string(),
                    oracle_start_line: o_start,
                    oracle_end_line: o_end,
                    developer_start_line: d_start,
                    developer_end_line: d_end,
                });
            }
        }
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(file: &str, kind: &str, start: u32, end: u32) -> RefactoringEvent {
        RefactoringEvent {
            file: file.into(),
            kind: EventType::from(kind.to_string()),
            code_element: None,
            start_line: Some(start),
            end_line: Some(end),
        }
    }

    #[test]
    fn start_line_inside_developer_range_overlaps() {
        let oracle = vec![
            event("A.java", "Extract Method", 12, 20),
            event("B.java", "Rename Variable", 5, 5),
        ];
        let developer = vec![
            event("A.java", "Extract Method", 10, 30),
            event("B.java", "Rename Variable", 6, 9),
            event("C.java", "Extract Method", 1, 2),
        ];
        let a = compute_agreement(&oracle, &developer, None);
        assert_eq!(a.overlaps, 1);
        assert_eq!(a.oracle_files, 2);
        assert_eq!(a.developer_files, 2);
        assert!((a.precision - 0.5).abs() < 1e-9);
        assert!((a.recall - 0.5).abs() < 1e-9);
        assert!((a.f1 - 0.5).abs() < 1e-9);
        assert_eq!(a.details[0].developer_start_line, 10);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let oracle = vec![event("A.java", "Inline Method", 30, 31)];
        let developer = vec![event("A.java", "Inline Method", 10, 30)];
        assert_eq!(compute_agreement(&oracle, &developer, None).overlaps, 1);
    }

    #[test]
    fn sentinels_never_count() {
        let oracle = vec![RefactoringEvent {
            file: "x.json".into(),
            kind: EventType::InvalidJson,
            code_element: None,
            start_line: None,
            end_line: None,
        }];
        let a = compute_agreement(&oracle, &[], None);
        assert_eq!(a.oracle_files, 0);
        assert_eq!(a.precision, 0.0);
        assert_eq!(a.f1, 0.0);
    }

    #[test]
    fn explicit_valid_types_filter_both_sides() {
        let oracle = vec![
            event("A.java", "Extract Method", 12, 20),
            event("B.java", "Rename Method", 3, 4),
        ];
        let developer = vec![event("A.java", "Extract Method", 10, 30)];
        let valid = vec!["Extract Method".to_string()];
        let a = compute_agreement(&oracle, &developer, Some(&valid));
        assert_eq!(a.oracle_files, 1);
        assert!((a.precision - 1.0).abs() < 1e-9);
    }
}
