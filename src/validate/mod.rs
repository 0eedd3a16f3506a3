//! Dev-mode consistency checks for authored mechanisms.
//!
//! Every violation is collected before reporting. Semantic events are checked against the
//! scenes produced by [`crate::eval::scene::resolve_scene`], the same resolver the renderer
//! draws from.

mod checks;
pub mod gate;
mod semantics;

use crate::eval::scene::SceneOptions;
use crate::foundation::error::{MechError, MechResult};
use crate::foundation::math::StableHasher;
use crate::scene::model::MechanismDefinition;
use crate::schema::issue::Issues;
use std::collections::HashSet;

pub use gate::{ValidationGate, should_validate};

/// All structural and semantic issues of `def`.
pub fn validate_definition(def: &MechanismDefinition, scene_opts: SceneOptions) -> Result<(), Issues> {
    let mut issues = Vec::new();
    checks::check_structure(def, &mut issues);
    semantics::check_semantics(def, scene_opts, &mut issues);
    Issues::into_result(issues)
}

/// [`validate_definition`] folded into one aggregated [`MechError::Validation`].
#[tracing::instrument(skip_all, fields(mechanism = %def.id))]
pub fn validate_mechanism(def: &MechanismDefinition, scene_opts: SceneOptions) -> MechResult<()> {
    validate_definition(def, scene_opts).map_err(|issues| {
        tracing::warn!(issues = issues.len(), "mechanism failed validation");
        MechError::validation(format!("mechanism '{}' failed validation:\n{issues}", def.id))
    })
}

/// Memoizes successful validations by definition content, so scrubbing does not re-validate.
#[derive(Debug, Default)]
pub struct MechanismValidator {
    passed: HashSet<u64>,
}

impl MechanismValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&mut self, def: &MechanismDefinition, scene_opts: SceneOptions) -> MechResult<()> {
        let key = memo_key(def, scene_opts);
        if self.passed.contains(&key) {
            return Ok(());
        }
        validate_mechanism(def, scene_opts)?;
        self.passed.insert(key);
        Ok(())
    }

    pub fn is_validated(&self, def: &MechanismDefinition, scene_opts: SceneOptions) -> bool {
        self.passed.contains(&memo_key(def, scene_opts))
    }

    pub fn clear(&mut self) {
        self.passed.clear();
    }
}

fn memo_key(def: &MechanismDefinition, scene_opts: SceneOptions) -> u64 {
    let mut h = StableHasher::new();
    h.write_u64(def.fingerprint());
    h.write_bool(scene_opts.strict_step_cues);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/validate/validate.rs"]
mod tests;
