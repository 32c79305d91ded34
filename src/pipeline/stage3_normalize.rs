use std::collections::HashMap;

use crate::input::values::parse_metric;
use crate::model::categories::CategorySet;
use crate::model::frame::{CategoryScores, JoinedTable, MetricAudit};
use crate::model::profile::{NEUTRAL_FALLBACK, SCORE_MAX, SCORE_MIN};

pub fn coerce_column(cells: &[String], sentinel: Option<f64>) -> Vec<Option<f64>> {
    cells.iter().map(|c| parse_metric(c, sentinel)).collect()
}

/// Observed range of a metric over the current population.
pub fn min_max(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for v in values.iter().flatten() {
        range = Some(match range {
            None => (*v, *v),
            Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
        });
    }
    range
}

/// Min-max scales observed values into [0,1]; missing stays missing. A
/// metric without variation maps every entity to the neutral 0.5, including
/// entities with no value for it. A metric never observed stays missing.
pub fn normalize_metric(values: &[Option<f64>]) -> Vec<Option<f64>> {
    match min_max(values) {
        None => vec![None; values.len()],
        Some((min, max)) if max > min => {
            let span = max - min;
            values.iter().map(|v| v.map(|x| (x - min) / span)).collect()
        }
        Some(_) => vec![Some(NEUTRAL_FALLBACK); values.len()],
    }
}

/// Mean of the present values; `None` when nothing is present.
pub fn mean_available<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for v in values.into_iter().flatten() {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Maps a unit-interval value onto the 1-10 presentation scale.
pub fn rescale_score(unit: f64) -> f64 {
    unit * (SCORE_MAX - SCORE_MIN) + SCORE_MIN
}

pub fn run_stage3(
    retained: &JoinedTable,
    categories: &CategorySet,
    sentinel: Option<f64>,
) -> CategoryScores {
    let n = retained.n_entities();
    tracing::debug!(
        "{}: scoring {} entities into {}",
        retained.kind,
        n,
        categories.names().join(", ")
    );

    let mut normalized: HashMap<String, Vec<Option<f64>>> = HashMap::new();
    let mut audits = Vec::new();
    for metric in categories.required_metrics() {
        let raw = match retained.column(&metric) {
            Some(col) => coerce_column(&col.cells, sentinel),
            None => vec![None; n],
        };
        let range = min_max(&raw);
        let audit = MetricAudit {
            metric: metric.clone(),
            observed: raw.iter().flatten().count(),
            min: range.map(|r| r.0),
            max: range.map(|r| r.1),
            degenerate: range.is_some_and(|(lo, hi)| hi <= lo),
        };
        tracing::debug!(
            "{} {}: observed={} min={:?} max={:?} degenerate={}",
            retained.kind,
            audit.metric,
            audit.observed,
            audit.min,
            audit.max,
            audit.degenerate
        );
        audits.push(audit);
        normalized.insert(metric, normalize_metric(&raw));
    }

    let mut names = Vec::with_capacity(categories.len());
    let mut values = Vec::with_capacity(categories.len());
    for cat in &categories.categories {
        let columns: Vec<&Vec<Option<f64>>> = cat
            .metrics
            .iter()
            .filter_map(|m| normalized.get(m))
            .collect();
        let scores: Vec<Option<f64>> = (0..n)
            .map(|entity| mean_available(columns.iter().map(|col| col[entity])).map(rescale_score))
            .collect();
        names.push(cat.name.clone());
        values.push(scores);
    }

    CategoryScores {
        names,
        values,
        audits,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_normalize.rs"]
mod tests;
