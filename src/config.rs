use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::model::categories::CategorySet;
use crate::model::profile::{
    AuxTableSpec, EntityKind, ExclusionRule, PipelineSpec, ScoringProfile,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// On-disk overrides. Every field is optional; absent fields keep the
/// built-in value. `null` clears the sentinel or the exclusion rule.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub completeness_threshold: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub missing_sentinel: Option<Option<f64>>,
    pub team_aliases: Option<BTreeMap<String, String>>,
    pub players: Option<PipelineOverrides>,
    pub teams: Option<PipelineOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineOverrides {
    pub primary_file: Option<String>,
    pub primary_columns: Option<Vec<String>>,
    pub auxiliary: Option<Vec<AuxTableSpec>>,
    #[serde(default, deserialize_with = "double_option")]
    pub exclude: Option<Option<ExclusionRule>>,
    pub age_columns: Option<Vec<String>>,
    pub categories: Option<CategorySet>,
    pub output_file: Option<String>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PipelineOverrides {
    /// When only the categories change, metrics no table provides are read
    /// from the primary table.
    fn apply(self, spec: &mut PipelineSpec) {
        let derive_primary = self.primary_columns.is_none() && self.categories.is_some();
        if let Some(v) = self.primary_file {
            spec.primary_file = v;
        }
        if let Some(v) = self.primary_columns {
            spec.primary_columns = v;
        }
        if let Some(v) = self.auxiliary {
            spec.auxiliary = v;
        }
        if let Some(v) = self.exclude {
            spec.exclude = v;
        }
        if let Some(v) = self.age_columns {
            spec.age_columns = v;
        }
        if let Some(v) = self.categories {
            spec.categories = v;
        }
        if let Some(v) = self.output_file {
            spec.output_file = v;
        }
        if derive_primary {
            let extra = spec.unloaded_metrics();
            if !extra.is_empty() {
                tracing::debug!(
                    "{}: reading {} from {}",
                    spec.kind,
                    extra.join(", "),
                    spec.primary_file
                );
                spec.primary_columns.extend(extra);
            }
        }
    }
}

/// Effective settings for a run: built-in profiles with config overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile: ScoringProfile,
    pub players: PipelineSpec,
    pub teams: PipelineSpec,
}

impl Settings {
    pub fn builtin() -> Self {
        Self {
            profile: ScoringProfile::default_v1(),
            players: PipelineSpec::builtin(EntityKind::Player),
            teams: PipelineSpec::builtin(EntityKind::Team),
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = Self::builtin();
        if let Some(path) = path {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file: ConfigFile = serde_json::from_str(&text)?;
            tracing::info!("loaded config {}", path.display());
            settings.apply(file);
        }
        Ok(settings)
    }

    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(t) = file.completeness_threshold {
            self.profile.completeness_threshold = t;
        }
        if let Some(s) = file.missing_sentinel {
            self.profile.missing_sentinel = s;
        }
        if let Some(aliases) = file.team_aliases {
            self.profile.team_aliases = aliases.into_iter().collect();
        }
        if let Some(o) = file.players {
            o.apply(&mut self.players);
        }
        if let Some(o) = file.teams {
            o.apply(&mut self.teams);
        }
    }

    pub fn spec(&self, kind: EntityKind) -> &PipelineSpec {
        match kind {
            EntityKind::Player => &self.players,
            EntityKind::Team => &self.teams,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.profile.completeness_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid(format!(
                "completeness threshold {t} is outside [0, 1]"
            )));
        }
        validate_spec(&self.players)?;
        validate_spec(&self.teams)
    }
}

fn validate_spec(spec: &PipelineSpec) -> Result<(), ConfigError> {
    let kind = spec.kind;
    if spec.primary_file.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{kind}: primary_file is empty")));
    }
    if spec.output_file.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{kind}: output_file is empty")));
    }
    if spec.categories.is_empty() {
        return Err(ConfigError::Invalid(format!("{kind}: no categories defined")));
    }
    let mut seen = BTreeSet::new();
    for cat in &spec.categories.categories {
        if cat.metrics.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{kind}: category {:?} has no metrics",
                cat.name
            )));
        }
        if kind.identity_columns().contains(&cat.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{kind}: category {:?} collides with an identity column",
                cat.name
            )));
        }
        if !seen.insert(cat.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{kind}: duplicate category {:?}",
                cat.name
            )));
        }
    }
    let unloaded = spec.unloaded_metrics();
    if !unloaded.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{kind}: no table provides metrics {}",
            unloaded.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
