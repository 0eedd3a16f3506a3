use crate::scene::model::{
    ArrowCue, AtomCue, BondCue, DipoleCue, KeyedCue, LonePairCue, MechanismDefinition,
    SelectionPolicy, StepCue,
};
use std::borrow::Cow;
use std::collections::HashMap;

/// Scene resolution options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneOptions {
    /// Scope dipoles and lone pairs to their exact step instead of carrying them forward.
    pub strict_step_cues: bool,
}

impl SceneOptions {
    pub fn with_strict_step_cues(mut self, strict: bool) -> Self {
        self.strict_step_cues = strict;
        self
    }

    fn annotation_policy(self) -> SelectionPolicy {
        if self.strict_step_cues {
            SelectionPolicy::Strict
        } else {
            SelectionPolicy::CarryForward
        }
    }
}

/// Cues visible at one step, borrowed from the definition in authoring order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedScene<'a> {
    pub step_index: u32,
    pub atoms: Vec<&'a AtomCue>,
    pub bonds: Vec<&'a BondCue>,
    pub dipoles: Vec<&'a DipoleCue>,
    pub lone_pairs: Vec<&'a LonePairCue>,
    pub electron_movement: Vec<&'a ArrowCue>,
}

impl<'a> ResolvedScene<'a> {
    pub fn atom(&self, id: &str) -> Option<&'a AtomCue> {
        self.atoms.iter().copied().find(|a| a.id == id)
    }

    pub fn bond(&self, a: &str, b: &str) -> Option<&'a BondCue> {
        self.bonds.iter().copied().find(|bond| bond.joins(a, b))
    }

    pub fn has_bond(&self, a: &str, b: &str) -> bool {
        self.bond(a, b).is_some()
    }

    /// First arrow with the given label, optionally restricted to an arrow type.
    pub fn arrow_labeled(&self, label: &str, arrow_type: Option<&str>) -> Option<&'a ArrowCue> {
        self.electron_movement.iter().copied().find(|cue| {
            cue.label == label
                && arrow_type.is_none_or(|t| cue.arrow_type.as_deref() == Some(t))
        })
    }

    /// Bonds whose endpoints are both present, paired with their atoms.
    pub fn drawable_bonds(&self) -> impl Iterator<Item = (&'a BondCue, &'a AtomCue, &'a AtomCue)> + '_ {
        self.bonds
            .iter()
            .filter_map(|b| Some((*b, self.atom(&b.from)?, self.atom(&b.to)?)))
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
            && self.bonds.is_empty()
            && self.dipoles.is_empty()
            && self.lone_pairs.is_empty()
            && self.electron_movement.is_empty()
    }
}

/// Cues visible at `step` under `policy`, in authoring order.
pub fn select_visible<T: StepCue>(cues: &[T], step: u32, policy: SelectionPolicy) -> Vec<&T> {
    cues.iter()
        .filter(|c| c.lifetime().is_visible_at(step, policy))
        .collect()
}

/// Latest visible entry per identity key.
///
/// Among entries sharing a key, the one with the highest start step wins, ties going to the
/// later entry. Output order follows the first appearance of each key.
pub fn select_latest<T: KeyedCue>(cues: &[T], step: u32) -> Vec<&T> {
    let mut slots: Vec<(i64, &T)> = Vec::new();
    let mut by_key: HashMap<Cow<'_, str>, usize> = HashMap::new();

    for cue in cues {
        let lt = cue.lifetime();
        if !lt.is_visible_at(step, SelectionPolicy::CarryForward) {
            continue;
        }
        let key = cue.key();
        if key.is_empty() {
            continue;
        }
        let rank = lt.rank();
        match by_key.get(&key) {
            Some(&i) => {
                if rank >= slots[i].0 {
                    slots[i] = (rank, cue);
                }
            }
            None => {
                by_key.insert(key, slots.len());
                slots.push((rank, cue));
            }
        }
    }

    slots.into_iter().map(|(_, cue)| cue).collect()
}

/// Resolve the visible scene at `step_index`.
///
/// Atoms and bonds always carry forward. Dipoles and lone pairs carry forward unless strict
/// scoping is requested. Arrows appear only at their exact step.
pub fn resolve_scene(
    def: &MechanismDefinition,
    step_index: u32,
    opts: SceneOptions,
) -> ResolvedScene<'_> {
    let policy = opts.annotation_policy();
    ResolvedScene {
        step_index,
        atoms: select_latest(&def.atoms, step_index),
        bonds: select_latest(&def.bonds, step_index),
        dipoles: select_visible(&def.dipoles, step_index, policy),
        lone_pairs: select_visible(&def.lone_pairs, step_index, policy),
        electron_movement: select_visible(&def.electron_movement, step_index, SelectionPolicy::Exact),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/scene.rs"]
mod tests;
