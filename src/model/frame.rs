use serde::Serialize;

use crate::model::profile::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub player: Option<String>,
    pub team: String,
}

impl EntityKey {
    pub fn team(team: impl Into<String>) -> Self {
        Self {
            player: None,
            team: team.into(),
        }
    }

    pub fn player(player: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            player: Some(player.into()),
            team: team.into(),
        }
    }

    /// Identity cells in output column order.
    pub fn identity(&self) -> Vec<&str> {
        match &self.player {
            Some(p) => vec![p.as_str(), self.team.as_str()],
            None => vec![self.team.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedColumn {
    pub name: String,
    /// Raw cells, one per entity. An empty cell is missing.
    pub cells: Vec<String>,
}

/// Result of the loader: one row per retained primary entity.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub kind: EntityKind,
    pub keys: Vec<EntityKey>,
    pub columns: Vec<JoinedColumn>,
}

impl JoinedTable {
    pub fn n_entities(&self) -> usize {
        self.keys.len()
    }

    pub fn column(&self, name: &str) -> Option<&JoinedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn retain(&self, keep: &[bool]) -> JoinedTable {
        let pick = |cells: &[String]| -> Vec<String> {
            cells
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(c, _)| c.clone())
                .collect()
        };
        let keys = self
            .keys
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(key, _)| key.clone())
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|col| JoinedColumn {
                name: col.name.clone(),
                cells: pick(&col.cells),
            })
            .collect();
        JoinedTable {
            kind: self.kind,
            keys,
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAudit {
    pub metric: String,
    pub observed: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub degenerate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    pub names: Vec<String>,
    /// `values[category][entity]`, `None` when every metric of the category
    /// is missing for that entity.
    pub values: Vec<Vec<Option<f64>>>,
    pub audits: Vec<MetricAudit>,
}

impl CategoryScores {
    pub fn category(&self, name: &str) -> Option<&[Option<f64>]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx].as_slice())
    }
}
