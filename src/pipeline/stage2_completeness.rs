use crate::input::values::parse_metric;
use crate::model::frame::{EntityKey, JoinedTable};

#[derive(Debug)]
pub struct Stage2Output {
    pub retained: JoinedTable,
    pub dropped: Vec<EntityKey>,
}

/// Fraction of `required` metrics with a usable value for each entity.
/// Metrics that were never loaded count as missing. An empty requirement
/// set is trivially complete.
pub fn completeness(joined: &JoinedTable, required: &[String], sentinel: Option<f64>) -> Vec<f64> {
    let n = joined.n_entities();
    if required.is_empty() {
        return vec![1.0; n];
    }
    let mut present = vec![0usize; n];
    for metric in required {
        let Some(column) = joined.column(metric) else {
            continue;
        };
        for (count, cell) in present.iter_mut().zip(&column.cells) {
            if parse_metric(cell, sentinel).is_some() {
                *count += 1;
            }
        }
    }
    present
        .into_iter()
        .map(|p| p as f64 / required.len() as f64)
        .collect()
}

pub fn run_stage2(
    joined: &JoinedTable,
    required: &[String],
    threshold: f64,
    sentinel: Option<f64>,
) -> Stage2Output {
    let fractions = completeness(joined, required, sentinel);
    let keep: Vec<bool> = fractions.iter().map(|&f| f >= threshold).collect();

    let dropped: Vec<EntityKey> = joined
        .keys
        .iter()
        .zip(&keep)
        .filter(|(_, k)| !**k)
        .map(|(key, _)| key.clone())
        .collect();
    for (key, fraction) in joined.keys.iter().zip(&fractions) {
        if *fraction < threshold {
            tracing::debug!(
                "dropping {} (completeness {:.3} < {:.3})",
                key.identity().join(" / "),
                fraction,
                threshold
            );
        }
    }

    let retained = joined.retain(&keep);
    tracing::info!(
        "{}: {} of {} entities pass completeness >= {}",
        joined.kind,
        retained.n_entities(),
        joined.n_entities(),
        threshold
    );
    if retained.n_entities() == 0 && joined.n_entities() > 0 {
        tracing::warn!("{}: no entity meets the completeness threshold", joined.kind);
    }

    Stage2Output { retained, dropped }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_completeness.rs"]
mod tests;
