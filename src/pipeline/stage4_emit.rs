use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::frame::{CategoryScores, EntityKey};
use crate::model::profile::EntityKind;

/// Shortest representation that parses back to the same `f64`. Missing
/// scores are empty fields.
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

pub fn score_table_header(kind: EntityKind, scores: &CategoryScores) -> Vec<String> {
    kind.identity_columns()
        .iter()
        .map(|c| c.to_string())
        .chain(scores.names.iter().cloned())
        .collect()
}

pub fn write_score_table<W: Write>(
    writer: W,
    kind: EntityKind,
    keys: &[EntityKey],
    scores: &CategoryScores,
) -> csv::Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(score_table_header(kind, scores))?;

    let mut row: Vec<String> = Vec::with_capacity(2 + scores.names.len());
    for (entity, key) in keys.iter().enumerate() {
        row.clear();
        row.extend(key.identity().into_iter().map(str::to_string));
        for category in &scores.values {
            row.push(format_score(category.get(entity).copied().flatten()));
        }
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_score_file(
    path: &Path,
    kind: EntityKind,
    keys: &[EntityKey],
    scores: &CategoryScores,
) -> csv::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    write_score_table(file, kind, keys, scores)?;
    tracing::info!("{}: wrote {} rows to {}", kind, keys.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_emit.rs"]
mod tests;
