//! Runs the external analysis tool against one staged file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::csv::{CsvTable, Record};
use super::scratch::ScratchDir;
use super::types::{ClassMetrics, MethodMetrics, MetricsReport};
use crate::config::MetricsConfig;
use crate::verification::run_command;

pub const METHOD_METRICS_FILE: &str = "methodMetrics.csv";
pub const TYPE_METRICS_FILE: &str = "typeMetrics.csv";

const METHOD_COLUMNS: &[&str] = &["Type Name", "MethodName", "CC", "LOC", "PC"];
const TYPE_COLUMNS: &[&str] = &["Type Name", "NOF", "NOPF", "NOM", "NOPM", "LOC", "WMC", "LCOM"];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("cannot stage {}: {source}", path.display())]
    Staging { path: PathBuf, source: io::Error },

    #[error("metrics tool failed: {0}")]
    ToolFailed(String),

    #[error("metrics output missing: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("malformed {file}: {reason}")]
    Malformed { file: &'static str, reason: String },
}

/// Anything that can measure a single Java source file.
pub trait MetricsSource {
    /// # Errors
    /// Returns error when no metrics could be produced; callers treat this
    /// as "cannot proceed".
    fn compute_metrics(&self, source_file: &Path) -> Result<MetricsReport, MetricsError>;
}

impl<T: MetricsSource + ?Sized> MetricsSource for &T {
    fn compute_metrics(&self, source_file: &Path) -> Result<MetricsReport, MetricsError> {
        (**self).compute_metrics(source_file)
    }
}

/// DesigniteJava-style tool driven through a command template.
#[derive(Debug, Clone)]
pub struct DesigniteCalculator {
    command: String,
    timeout: Duration,
    workdir: PathBuf,
}

impl DesigniteCalculator {
    #[must_use]
    pub fn new(command: &str, timeout: Duration) -> Self {
        Self {
            command: command.to_string(),
            timeout,
            workdir: PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(&config.command, Duration::from_secs(config.timeout_secs))
    }

    /// Directory the tool is started from; relative jar paths resolve here.
    #[must_use]
    pub fn with_workdir(mut self, workdir: &Path) -> Self {
        self.workdir = workdir.to_path_buf();
        self
    }

    fn measure(&self, scratch: &ScratchDir, source_file: &Path) -> Result<MetricsReport, MetricsError> {
        scratch
            .stage(source_file)
            .map_err(|source| MetricsError::Staging {
                path: source_file.to_path_buf(),
                source,
            })?;

        let input = scratch.input().to_string_lossy().into_owned();
        let output = scratch.output();
        let output_arg = output.to_string_lossy().into_owned();
        let result = run_command(
            &self.workdir,
            &self.command,
            &[("input", input.as_str()), ("output", output_arg.as_str())],
            self.timeout,
        );
        if !result.passed() {
            return Err(MetricsError::ToolFailed(result.failure_summary(20)));
        }

        let methods = read_output(&output.join(METHOD_METRICS_FILE))?;
        let types = read_output(&output.join(TYPE_METRICS_FILE))?;
        parse_tables(&methods, &types)
    }
}

impl MetricsSource for DesigniteCalculator {
    fn compute_metrics(&self, source_file: &Path) -> Result<MetricsReport, MetricsError> {
        let scratch = ScratchDir::new().map_err(|source| MetricsError::Staging {
            path: source_file.to_path_buf(),
            source,
        })?;
        let report = self.measure(&scratch, source_file);
        if let Err(e) = scratch.clean() {
            tracing::warn!(error = %e, "failed to remove metrics scratch directory");
        }
        let report = report?;
        tracing::debug!(file = %source_file.display(), classes = report.classes.len(), "metrics computed");
        Ok(report)
    }
}

fn read_output(path: &Path) -> Result<CsvTable, MetricsError> {
    let text = fs::read_to_string(path).map_err(|_| MetricsError::MissingOutput(path.to_path_buf()))?;
    Ok(CsvTable::parse(&text))
}

/// Joins method rows and type rows by class name.
///
/// # Errors
/// Returns error when a table lacks a required column.
pub fn parse_tables(methods: &CsvTable, types: &CsvTable) -> Result<MetricsReport, MetricsError> {
    check_columns(methods, METHOD_COLUMNS, METHOD_METRICS_FILE)?;
    check_columns(types, TYPE_COLUMNS, TYPE_METRICS_FILE)?;

    let mut report = MetricsReport::default();
    for record in methods.records() {
        match method_row(&record) {
            Some((class, method)) => report.push_method(class, method),
            None => skip_row(METHOD_METRICS_FILE, record.index),
        }
    }
    for record in types.records() {
        match type_row(&record) {
            Some((class, metrics)) => report.set_class_metrics(class, metrics),
            None => skip_row(TYPE_METRICS_FILE, record.index),
        }
    }
    Ok(report)
}

fn check_columns(table: &CsvTable, required: &[&str], file: &'static str) -> Result<(), MetricsError> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        return Ok(());
    }
    Err(MetricsError::Malformed {
        file,
        reason: format!("missing columns: {}", missing.join(", ")),
    })
}

fn skip_row(file: &str, index: usize) {
    tracing::warn!(file, row = index + 1, "skipping unparseable metrics row");
}

/// Integer cell; a fractional value is rounded and a non-finite one
/// makes the row unparseable.
fn int(record: &Record<'_>, column: &str) -> Option<i64> {
    let raw = record.get(column)?;
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    #[allow(clippy::cast_possible_truncation)]
    let rounded = f.round() as i64;
    Some(rounded)
}

fn method_row<'a>(record: &Record<'a>) -> Option<(&'a str, MethodMetrics)> {
    let class = record.get("Type Name").filter(|c| !c.is_empty())?;
    Some((
        class,
        MethodMetrics {
            name: record.get("MethodName")?.to_string(),
            cc: int(record, "CC")?,
            loc: int(record, "LOC")?,
            pc: int(record, "PC")?,
        },
    ))
}

fn type_row<'a>(record: &Record<'a>) -> Option<(&'a str, ClassMetrics)> {
    let class = record.get("Type Name").filter(|c| !c.is_empty())?;
    Some((
        class,
        ClassMetrics {
            nof: int(record, "NOF")?,
            nopf: int(record, "NOPF")?,
            nom: int(record, "NOM")?,
            nopm: int(record, "NOPM")?,
            loc: int(record, "LOC")?,
            wmc: int(record, "WMC")?,
            lcom: record.get("LCOM")?.parse().ok()?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: &str = "Project Name,Package Name,Type Name,MethodName,LOC,CC,PC\n\
        input,a,Foo,run,12,3,1\n\
        input,a,Foo,stop,4,1,0\n\
        input,a,Foo,broken,x,1,0\n";
    const TYPES: &str = "Project Name,Package Name,Type Name,NOF,NOPF,NOM,NOPM,LOC,WMC,NC,DIT,LCOM,FANIN,FANOUT\n\
        input,a,Foo,2,0,3,2,40,4,0,0,0.25,1,2\n";

    #[test]
    fn joins_methods_and_types_by_class() -> Result<(), MetricsError> {
        let report = parse_tables(&CsvTable::parse(METHODS), &CsvTable::parse(TYPES))?;
        let foo = report.get("Foo").expect("Foo measured");
        assert_eq!(foo.method_metrics.len(), 2);
        assert_eq!(foo.method_metrics[0].cc, 3);
        let class = foo.class_metrics.as_ref().expect("type row");
        assert_eq!(class.wmc, 4);
        assert!((class.lcom - 0.25).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn fractional_cells_round_and_non_finite_rows_are_skipped() -> Result<(), MetricsError> {
        let methods = "Type Name,MethodName,LOC,CC,PC\n\
            Foo,run,12.6,2.4,1\n\
            Foo,spin,NaN,1,0\n\
            Foo,far,inf,1,0\n";
        let report = parse_tables(&CsvTable::parse(methods), &CsvTable::parse(TYPES))?;
        let foo = report.get("Foo").expect("Foo measured");
        assert_eq!(foo.method_metrics.len(), 1);
        assert_eq!((foo.method_metrics[0].loc, foo.method_metrics[0].cc), (13, 2));
        Ok(())
    }

    #[test]
    fn missing_column_is_malformed() {
        let err = parse_tables(&CsvTable::parse("Type Name,MethodName\n"), &CsvTable::parse(TYPES));
        assert!(matches!(err, Err(MetricsError::Malformed { file: METHOD_METRICS_FILE, .. })));
    }

    #[test]
    fn failing_tool_reports_no_metrics() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("Foo.java");
        fs::write(&source, "class Foo {}")?;
        let calc = DesigniteCalculator::new("false {input} {output}", Duration::from_secs(10));
        assert!(matches!(calc.compute_metrics(&source), Err(MetricsError::ToolFailed(_))));
        Ok(())
    }

    #[test]
    fn absent_outputs_are_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("Foo.java");
        fs::write(&source, "class Foo {}")?;
        let calc = DesigniteCalculator::new("ls {input}", Duration::from_secs(10));
        assert!(matches!(calc.compute_metrics(&source), Err(MetricsError::MissingOutput(_))));
        Ok(())
    }

    #[test]
    fn tool_output_is_parsed() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("Foo.java");
        fs::write(&source, "class Foo {}")?;
        fs::write(dir.path().join("m.csv"), METHODS)?;
        fs::write(dir.path().join("t.csv"), TYPES)?;
        let script = format!(
            "sh -c 'cp {m} \"$1/{METHOD_METRICS_FILE}\" && cp {t} \"$1/{TYPE_METRICS_FILE}\"' tool {{output}}",
            m = dir.path().join("m.csv").display(),
            t = dir.path().join("t.csv").display(),
        );
        let calc = DesigniteCalculator::new(&script, Duration::from_secs(10));
        let report = calc.compute_metrics(&source)?;
        assert!(report.get("Foo").is_some());
        Ok(())
    }
}
