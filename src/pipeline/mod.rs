pub mod stage1_load;
pub mod stage2_completeness;
pub mod stage3_normalize;
pub mod stage4_emit;

use crate::input::{InputError, TableSource};
use crate::model::frame::{CategoryScores, EntityKey};
use crate::model::profile::{EntityKind, PipelineSpec, ScoringProfile};
use stage1_load::{LoadReport, run_stage1};
use stage2_completeness::run_stage2;
use stage3_normalize::run_stage3;

#[derive(Debug)]
pub struct PipelineOutput {
    pub kind: EntityKind,
    pub keys: Vec<EntityKey>,
    pub scores: CategoryScores,
    pub load: LoadReport,
    pub dropped: Vec<EntityKey>,
    pub threshold: f64,
}

/// Load, filter and score one entity kind. Nothing is written; the caller
/// decides where the table goes.
pub fn run_pipeline(
    spec: &PipelineSpec,
    profile: &ScoringProfile,
    source: &dyn TableSource,
) -> Result<PipelineOutput, InputError> {
    let stage1 = run_stage1(spec, profile, source)?;

    let required = spec.categories.required_metrics();
    let stage2 = run_stage2(
        &stage1.joined,
        &required,
        profile.completeness_threshold,
        profile.missing_sentinel,
    );

    let scores = run_stage3(&stage2.retained, &spec.categories, profile.missing_sentinel);

    Ok(PipelineOutput {
        kind: spec.kind,
        keys: stage2.retained.keys,
        scores,
        load: stage1.report,
        dropped: stage2.dropped,
        threshold: profile.completeness_threshold,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
