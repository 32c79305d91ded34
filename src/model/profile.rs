use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::categories::{CategorySet, builtin_player_categories, builtin_team_categories};

pub const SCORE_MIN: f64 = 1.0;
pub const SCORE_MAX: f64 = 10.0;
pub const NEUTRAL_FALLBACK: f64 = 0.5;
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MISSING_SENTINEL: f64 = -1.0;

pub const PLAYER_COLUMN: &str = "player";
pub const TEAM_COLUMN: &str = "team";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Team,
}

impl EntityKind {
    pub fn identity_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Player => &[PLAYER_COLUMN, TEAM_COLUMN],
            EntityKind::Team => &[TEAM_COLUMN],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Player => "players",
            EntityKind::Team => "teams",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxTableSpec {
    pub file: String,
    pub columns: Vec<String>,
}

/// Primary rows whose `column` equals one of `values` are removed before joining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    pub kind: EntityKind,
    pub primary_file: String,
    pub primary_columns: Vec<String>,
    pub auxiliary: Vec<AuxTableSpec>,
    pub exclude: Option<ExclusionRule>,
    pub age_columns: Vec<String>,
    pub categories: CategorySet,
    pub output_file: String,
}

impl PipelineSpec {
    pub fn players_v1() -> Self {
        Self {
            kind: EntityKind::Player,
            primary_file: "player_stats.csv".to_string(),
            primary_columns: strings(&[
                "age",
                "goals_per90",
                "assists_per90",
                "xg_per90",
                "cards_yellow",
            ]),
            auxiliary: vec![
                aux("player_shooting.csv", &["shots_on_target_per90"]),
                aux("player_gca.csv", &["gca_per90", "sca_per90"]),
                aux(
                    "player_passing.csv",
                    &["passes_pct", "progressive_passes", "passes_into_final_third"],
                ),
                aux("player_possession.csv", &["touches"]),
                aux(
                    "player_defense.csv",
                    &["tackles", "interceptions", "clearances", "blocks"],
                ),
                aux("player_misc.csv", &["fouls", "aerials_won_pct"]),
            ],
            exclude: Some(ExclusionRule {
                column: "position".to_string(),
                values: strings(&["GK"]),
            }),
            age_columns: strings(&["age"]),
            categories: builtin_player_categories(),
            output_file: "player_performance_scores.csv".to_string(),
        }
    }

    pub fn teams_v1() -> Self {
        let categories = builtin_team_categories();
        Self {
            kind: EntityKind::Team,
            primary_file: "team_data_clean.csv".to_string(),
            primary_columns: categories.required_metrics(),
            auxiliary: Vec::new(),
            exclude: None,
            age_columns: Vec::new(),
            categories,
            output_file: "team_performance_scores.csv".to_string(),
        }
    }

    pub fn builtin(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Player => Self::players_v1(),
            EntityKind::Team => Self::teams_v1(),
        }
    }

    /// Category metrics that neither the primary nor any auxiliary table
    /// is asked to provide.
    pub fn unloaded_metrics(&self) -> Vec<String> {
        self.categories
            .required_metrics()
            .into_iter()
            .filter(|m| {
                !self.primary_columns.contains(m)
                    && !self.auxiliary.iter().any(|aux| aux.columns.contains(m))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringProfile {
    pub completeness_threshold: f64,
    pub missing_sentinel: Option<f64>,
    pub team_aliases: Vec<(String, String)>,
}

impl ScoringProfile {
    pub fn default_v1() -> Self {
        Self {
            completeness_threshold: DEFAULT_COMPLETENESS_THRESHOLD,
            missing_sentinel: Some(DEFAULT_MISSING_SENTINEL),
            team_aliases: vec![("IR Iran".to_string(), "Iran".to_string())],
        }
    }

    pub fn canonical_team<'a>(&'a self, raw: &'a str) -> &'a str {
        self.team_aliases
            .iter()
            .find(|(from, _)| from == raw)
            .map(|(_, to)| to.as_str())
            .unwrap_or(raw)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn aux(file: &str, columns: &[&str]) -> AuxTableSpec {
    AuxTableSpec {
        file: file.to_string(),
        columns: strings(columns),
    }
}
