pub mod json;
pub mod text;

use serde::Serialize;

use crate::model::frame::MetricAudit;
use crate::model::profile::{EntityKind, PipelineSpec};
use crate::pipeline::PipelineOutput;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub name: String,
    pub metrics: Vec<String>,
    pub scored: usize,
    pub missing: usize,
    pub median: Option<f64>,
    pub p10: Option<f64>,
    pub p90: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub kind: EntityKind,
    pub primary_path: String,
    pub output_file: String,
    pub completeness_threshold: f64,
    pub rows_loaded: usize,
    pub rows_excluded: usize,
    pub dropped_incomplete: usize,
    pub scored: usize,
    pub missing_auxiliary: Vec<String>,
    pub missing_columns: Vec<String>,
    pub duplicate_auxiliary_keys: usize,
    pub metrics: Vec<MetricAudit>,
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub data_dir: String,
    pub kinds: Vec<KindSummary>,
}

/// Nearest-rank quantile over present values.
pub fn quantile_indexed(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    Some(sorted[idx.min(n - 1)])
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.5)
}

pub fn p10(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.10)
}

pub fn p90(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.90)
}

pub fn build_kind_summary(spec: &PipelineSpec, out: &PipelineOutput) -> KindSummary {
    let categories = spec
        .categories
        .categories
        .iter()
        .map(|def| {
            let values = out.scores.category(&def.name).unwrap_or_default();
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            CategoryStats {
                name: def.name.clone(),
                metrics: def.metrics.clone(),
                scored: present.len(),
                missing: values.len() - present.len(),
                median: median(&present),
                p10: p10(&present),
                p90: p90(&present),
            }
        })
        .collect();

    KindSummary {
        kind: out.kind,
        primary_path: out.load.primary_path.clone(),
        output_file: spec.output_file.clone(),
        completeness_threshold: out.threshold,
        rows_loaded: out.load.rows_loaded,
        rows_excluded: out.load.rows_excluded,
        dropped_incomplete: out.dropped.len(),
        scored: out.keys.len(),
        missing_auxiliary: out.load.missing_auxiliary.clone(),
        missing_columns: out.load.missing_columns.clone(),
        duplicate_auxiliary_keys: out.load.duplicate_auxiliary_keys,
        metrics: out.scores.audits.clone(),
        categories,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
