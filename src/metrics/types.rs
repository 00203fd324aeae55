//! Class and method quality measurements.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Type-level metrics as reported by the analysis tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    #[serde(rename = "Number of Fields (NOF)")]
    pub nof: i64,
    #[serde(rename = "Number of Public Fields (NOPF)")]
    pub nopf: i64,
    #[serde(rename = "Number of Methods (NOM)")]
    pub nom: i64,
    #[serde(rename = "Number of Public Methods (NOPM)")]
    pub nopm: i64,
    #[serde(rename = "Lines of Code (LOC)")]
    pub loc: i64,
    #[serde(rename = "Weighted Methods per Class (WMC)")]
    pub wmc: i64,
    #[serde(rename = "Lack of Cohesion of Methods (LCOM)")]
    pub lcom: f64,
}

impl ClassMetrics {
    fn labelled(&self) -> [(&'static str, String); 7] {
        [
            ("Number of Fields (NOF)", self.nof.to_string()),
            ("Number of Public Fields (NOPF)", self.nopf.to_string()),
            ("Number of Methods (NOM)", self.nom.to_string()),
            ("Number of Public Methods (NOPM)", self.nopm.to_string()),
            ("Lines of Code (LOC)", self.loc.to_string()),
            ("Weighted Methods per Class (WMC)", self.wmc.to_string()),
            ("Lack of Cohesion of Methods (LCOM)", self.lcom.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodMetrics {
    #[serde(rename = "Method Name")]
    pub name: String,
    #[serde(rename = "Cyclomatic Complexity (CC)")]
    pub cc: i64,
    #[serde(rename = "Lines of Code (LOC)")]
    pub loc: i64,
    #[serde(rename = "Parameter Count (PC)")]
    pub pc: i64,
}

/// Everything measured for one class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassReport {
    /// Absent when the tool listed methods but no type row.
    #[serde(rename = "Class Metrics", default)]
    pub class_metrics: Option<ClassMetrics>,
    #[serde(rename = "Method Metrics", default)]
    pub method_metrics: Vec<MethodMetrics>,
}

/// Metrics keyed by simple class name. A repeated name overwrites the
/// earlier class metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsReport {
    pub classes: BTreeMap<String, ClassReport>,
}

impl MetricsReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[must_use]
    pub fn get(&self, class: &str) -> Option<&ClassReport> {
        self.classes.get(class)
    }

    pub fn set_class_metrics(&mut self, class: &str, metrics: ClassMetrics) {
        self.classes.entry(class.to_string()).or_default().class_metrics = Some(metrics);
    }

    pub fn push_method(&mut self, class: &str, method: MethodMetrics) {
        self.classes
            .entry(class.to_string())
            .or_default()
            .method_metrics
            .push(method);
    }

    /// Plain-text block used inside oracle prompts.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, report) in &self.classes {
            let _ = writeln!(out, "Class: {name}");
            out.push_str("Class Metrics:\n");
            if let Some(metrics) = &report.class_metrics {
                for (label, value) in metrics.labelled() {
                    let _ = writeln!(out, "  {label}: {value}");
                }
            }
            out.push_str("Method Metrics:\n");
            for m in &report.method_metrics {
                let _ = writeln!(out, "  Method: {}", m.name);
                let _ = writeln!(out, "    Cyclomatic Complexity (CC): {}", m.cc);
                let _ = writeln!(out, "    Lines of Code (LOC): {}", m.loc);
                let _ = writeln!(out, "    Parameter Count (PC): {}", m.pc);
            }
            out.push('\n');
        }
        out
    }
}
