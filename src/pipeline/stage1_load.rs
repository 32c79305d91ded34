use std::collections::HashMap;

use serde::Serialize;

use crate::input::values::normalize_age_cell;
use crate::input::{InputError, Table, TableSource};
use crate::model::frame::{EntityKey, JoinedColumn, JoinedTable};
use crate::model::profile::{
    AuxTableSpec, EntityKind, PLAYER_COLUMN, PipelineSpec, ScoringProfile, TEAM_COLUMN,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub primary_path: String,
    pub rows_loaded: usize,
    pub rows_excluded: usize,
    pub missing_auxiliary: Vec<String>,
    pub missing_columns: Vec<String>,
    pub duplicate_auxiliary_keys: usize,
}

#[derive(Debug)]
pub struct Stage1Output {
    pub joined: JoinedTable,
    pub report: LoadReport,
}

pub fn run_stage1(
    spec: &PipelineSpec,
    profile: &ScoringProfile,
    source: &dyn TableSource,
) -> Result<Stage1Output, InputError> {
    let primary_path = source.locate(&spec.primary_file);
    let primary = source
        .open_table(&spec.primary_file)?
        .ok_or_else(|| InputError::MissingPrimary {
            path: primary_path.clone(),
        })?;

    let mut report = LoadReport {
        primary_path: primary_path.display().to_string(),
        rows_loaded: primary.n_rows(),
        ..LoadReport::default()
    };

    let keep = exclusion_mask(&primary, spec);
    report.rows_excluded = keep.iter().filter(|k| !**k).count();
    let rows: Vec<usize> = (0..primary.n_rows()).filter(|&r| keep[r]).collect();

    let keys = build_keys(&primary, &rows, spec.kind, profile)?;

    let mut joined = JoinedTable {
        kind: spec.kind,
        keys,
        columns: Vec::new(),
    };

    for column in &spec.primary_columns {
        let cells = match primary.column_index(column) {
            Some(idx) => rows
                .iter()
                .map(|&r| clean_cell(primary.cell(r, idx), column, spec))
                .collect(),
            None => {
                tracing::warn!(
                    "column {} not found in {}; treating as missing",
                    column,
                    spec.primary_file
                );
                report
                    .missing_columns
                    .push(format!("{}:{}", spec.primary_file, column));
                vec![String::new(); rows.len()]
            }
        };
        push_column(&mut joined, column, cells);
    }

    for aux in &spec.auxiliary {
        join_auxiliary(&mut joined, aux, spec, profile, source, &mut report)?;
    }

    tracing::info!(
        "{}: loaded {} rows from {}, excluded {}, {} columns joined",
        spec.kind,
        report.rows_loaded,
        report.primary_path,
        report.rows_excluded,
        joined.columns.len()
    );

    Ok(Stage1Output { joined, report })
}

fn exclusion_mask(primary: &Table, spec: &PipelineSpec) -> Vec<bool> {
    let mut keep = vec![true; primary.n_rows()];
    let Some(rule) = &spec.exclude else {
        return keep;
    };
    let Some(idx) = primary.column_index(&rule.column) else {
        tracing::warn!(
            "exclusion column {} not found in {}; no rows excluded",
            rule.column,
            spec.primary_file
        );
        return keep;
    };
    for (row, flag) in keep.iter_mut().enumerate() {
        let value = primary.cell(row, idx);
        if rule.values.iter().any(|v| v == value) {
            *flag = false;
        }
    }
    keep
}

fn build_keys(
    table: &Table,
    rows: &[usize],
    kind: EntityKind,
    profile: &ScoringProfile,
) -> Result<Vec<EntityKey>, InputError> {
    let team_idx = table.require_column(TEAM_COLUMN)?;
    match kind {
        EntityKind::Team => Ok(rows
            .iter()
            .map(|&r| EntityKey::team(profile.canonical_team(table.cell(r, team_idx))))
            .collect()),
        EntityKind::Player => {
            let player_idx = table.require_column(PLAYER_COLUMN)?;
            Ok(rows
                .iter()
                .map(|&r| {
                    EntityKey::player(
                        table.cell(r, player_idx),
                        profile.canonical_team(table.cell(r, team_idx)),
                    )
                })
                .collect())
        }
    }
}

fn join_auxiliary(
    joined: &mut JoinedTable,
    aux: &AuxTableSpec,
    spec: &PipelineSpec,
    profile: &ScoringProfile,
    source: &dyn TableSource,
    report: &mut LoadReport,
) -> Result<(), InputError> {
    let n = joined.n_entities();
    let table = match source.open_table(&aux.file)? {
        Some(table) => table,
        None => {
            tracing::warn!(
                "auxiliary table {} not found; columns {} treated as missing",
                source.locate(&aux.file).display(),
                aux.columns.join(",")
            );
            report.missing_auxiliary.push(aux.file.clone());
            for column in &aux.columns {
                push_column(joined, column, vec![String::new(); n]);
            }
            return Ok(());
        }
    };

    let all_rows: Vec<usize> = (0..table.n_rows()).collect();
    let aux_keys = match build_keys(&table, &all_rows, spec.kind, profile) {
        Ok(keys) => keys,
        Err(InputError::MissingColumn { column, .. }) => {
            tracing::warn!(
                "auxiliary table {} has no {} column; columns {} treated as missing",
                aux.file,
                column,
                aux.columns.join(",")
            );
            report.missing_auxiliary.push(aux.file.clone());
            for column in &aux.columns {
                push_column(joined, column, vec![String::new(); n]);
            }
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut index: HashMap<&EntityKey, usize> = HashMap::with_capacity(aux_keys.len());
    for (row, key) in aux_keys.iter().enumerate() {
        if index.contains_key(key) {
            tracing::warn!(
                "duplicate key in {}; keeping first (row {}, {})",
                aux.file,
                row + 2,
                key.identity().join(" / ")
            );
            report.duplicate_auxiliary_keys += 1;
            continue;
        }
        index.insert(key, row);
    }

    let matched: Vec<Option<usize>> = joined
        .keys
        .iter()
        .map(|key| index.get(key).copied())
        .collect();
    let unmatched = matched.iter().filter(|m| m.is_none()).count();
    if unmatched > 0 {
        tracing::debug!("{}: {} entities without a matching row", aux.file, unmatched);
    }

    for column in &aux.columns {
        let cells = match table.column_index(column) {
            Some(idx) => matched
                .iter()
                .map(|m| match m {
                    Some(r) => clean_cell(table.cell(*r, idx), column, spec),
                    None => String::new(),
                })
                .collect(),
            None => {
                tracing::warn!(
                    "column {} not found in {}; treating as missing",
                    column,
                    aux.file
                );
                report.missing_columns.push(format!("{}:{}", aux.file, column));
                vec![String::new(); n]
            }
        };
        push_column(joined, column, cells);
    }

    Ok(())
}

fn clean_cell(raw: &str, column: &str, spec: &PipelineSpec) -> String {
    if spec.age_columns.iter().any(|c| c == column) {
        normalize_age_cell(raw)
    } else {
        raw.to_string()
    }
}

fn push_column(joined: &mut JoinedTable, name: &str, cells: Vec<String>) {
    if joined.column(name).is_some() {
        tracing::warn!("column {} already joined; keeping first", name);
        return;
    }
    joined.columns.push(JoinedColumn {
        name: name.to_string(),
        cells,
    });
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_load.rs"]
mod tests;
