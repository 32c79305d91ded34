use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub name: String,
    pub metrics: Vec<String>,
}

/// Ordered category -> metric mapping. Written as a JSON object whose key
/// order is the output column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySet {
    pub categories: Vec<CategoryDef>,
}

impl CategorySet {
    pub fn from_static(defs: &[(&str, &[&str])]) -> Self {
        let categories = defs
            .iter()
            .map(|(name, metrics)| CategoryDef {
                name: name.to_string(),
                metrics: metrics.iter().map(|m| m.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Union of all category metrics in first-seen order.
    pub fn required_metrics(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for cat in &self.categories {
            for metric in &cat.metrics {
                if !out.contains(metric) {
                    out.push(metric.clone());
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Serialize for CategorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for cat in &self.categories {
            map.serialize_entry(&cat.name, &cat.metrics)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryVisitor;

        impl<'de> Visitor<'de> for CategoryVisitor {
            type Value = CategorySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to a list of metric names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategorySet, A::Error> {
                let mut categories = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, metrics)) = access.next_entry::<String, Vec<String>>()? {
                    categories.push(CategoryDef { name, metrics });
                }
                Ok(CategorySet { categories })
            }
        }

        deserializer.deserialize_map(CategoryVisitor)
    }
}

const PLAYER_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Scoring Threat",
        &["goals_per90", "xg_per90", "shots_on_target_per90"],
    ),
    (
        "Chance Creation",
        &[
            "assists_per90",
            "gca_per90",
            "sca_per90",
            "passes_into_final_third",
        ],
    ),
    (
        "Build-up Play",
        &["passes_pct", "progressive_passes", "touches"],
    ),
    (
        "Defensive Workrate",
        &["tackles", "interceptions", "clearances", "blocks"],
    ),
    (
        "Discipline & Physical",
        &["cards_yellow", "fouls", "aerials_won_pct", "age"],
    ),
];

const TEAM_CATEGORIES: &[(&str, &[&str])] = &[
    ("Offensive", &["goals_per90", "xg_per90"]),
    ("Defensive", &["tackles", "interceptions"]),
    ("Cohesion", &["possession", "passes_pct"]),
    ("Efficiency", &["xg_net", "xg_assist_per90"]),
    ("Discipline", &["cards_yellow", "fouls", "avg_age"]),
];

pub fn builtin_player_categories() -> CategorySet {
    CategorySet::from_static(PLAYER_CATEGORIES)
}

pub fn builtin_team_categories() -> CategorySet {
    CategorySet::from_static(TEAM_CATEGORIES)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/categories.rs"]
mod tests;
