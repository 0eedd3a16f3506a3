//! Replays declared step semantics against the resolved per-step scenes.

use crate::eval::scene::{ResolvedScene, SceneOptions, resolve_scene};
use crate::foundation::math::approx_eq;
use crate::scene::model::{MechanismDefinition, SemanticEvent, bond_key};
use crate::schema::issue::{Issue, PathElem};

const CHARGE_TOLERANCE: f64 = 1e-3;

pub(crate) fn check_semantics(
    def: &MechanismDefinition,
    scene_opts: SceneOptions,
    issues: &mut Vec<Issue>,
) {
    let Some(semantics) = &def.step_semantics else {
        return;
    };
    if semantics.len() != def.steps.len() {
        issues.push(Issue::at(
            &[PathElem::Field("stepSemantics")],
            format!(
                "stepSemantics has {} entries but there are {} steps",
                semantics.len(),
                def.steps.len()
            ),
        ));
    }

    // Same resolver the renderer uses, one scene per step.
    let scenes: Vec<ResolvedScene<'_>> = (0..def.step_count())
        .map(|s| resolve_scene(def, s, scene_opts))
        .collect();
    let atom_known = |id: &str| def.atoms.iter().any(|a| a.id == id);

    for (s, entry) in semantics.iter().enumerate().take(scenes.len()) {
        let Some(entry) = entry else { continue };
        let window = StepWindow::new(&scenes, s);
        for (j, event) in entry.events.iter().enumerate() {
            let path = [
                PathElem::Field("stepSemantics"),
                PathElem::Index(s),
                PathElem::Field("events"),
                PathElem::Index(j),
            ];
            let mut fail = |msg: String| {
                issues.push(Issue::at(&path, format!("step {s} {}: {msg}", event.kind())));
            };
            check_event(event, &window, &atom_known, &mut fail);
        }
    }
}

/// The previous, current and next resolved scenes around one step.
struct StepWindow<'s, 'a> {
    step: usize,
    prev: Option<&'s ResolvedScene<'a>>,
    current: &'s ResolvedScene<'a>,
    next: Option<&'s ResolvedScene<'a>>,
}

impl<'s, 'a> StepWindow<'s, 'a> {
    fn new(scenes: &'s [ResolvedScene<'a>], step: usize) -> Self {
        Self {
            step,
            prev: step.checked_sub(1).and_then(|p| scenes.get(p)),
            current: &scenes[step],
            next: scenes.get(step + 1),
        }
    }

    /// The scene a break must be gone from: the next step, or the current one at the end.
    fn after(&self) -> &'s ResolvedScene<'a> {
        self.next.unwrap_or(self.current)
    }
}

fn check_event(
    event: &SemanticEvent,
    w: &StepWindow<'_, '_>,
    atom_known: &dyn Fn(&str) -> bool,
    fail: &mut dyn FnMut(String),
) {
    let s = w.step;
    match event {
        SemanticEvent::BondBreak { from, to, order } => {
            let key = bond_key(from, to);
            let before = w
                .current
                .bond(from, to)
                .or_else(|| w.prev.and_then(|p| p.bond(from, to)));
            match before {
                None => fail(format!(
                    "bond {key} is not present at step {s} or the step before"
                )),
                Some(b) => {
                    if let Some(o) = order
                        && b.order != *o
                    {
                        fail(format!("bond {key} has order {}, expected {o}", b.order));
                    }
                }
            }
            if before.is_some() && w.after().has_bond(from, to) {
                fail(format!("bond {key} is still present after step {s}"));
            }
        }
        SemanticEvent::BondForm {
            from,
            to,
            order,
            allow_preexisting,
        } => {
            let key = bond_key(from, to);
            let formed = w
                .current
                .bond(from, to)
                .or_else(|| w.next.and_then(|n| n.bond(from, to)));
            match formed {
                None => fail(format!(
                    "bond {key} is not present at step {s} or the step after"
                )),
                Some(b) => {
                    if let Some(o) = order
                        && b.order != *o
                    {
                        fail(format!("bond {key} has order {}, expected {o}", b.order));
                    }
                }
            }
            if !allow_preexisting && w.prev.is_some_and(|p| p.has_bond(from, to)) {
                fail(format!(
                    "bond {key} already exists before step {s} (set allowPreexisting to permit)"
                ));
            }
        }
        SemanticEvent::ChargeSet { atom_id, charge } => {
            let Some(expected) = charge.filter(|c| c.is_finite()) else {
                fail("charge must be a finite number".to_owned());
                return;
            };
            let matches = |scene: &ResolvedScene<'_>| {
                scene
                    .atom(atom_id)
                    .is_some_and(|a| approx_eq(a.charge, expected, CHARGE_TOLERANCE))
            };
            if !(matches(w.current) || w.next.is_some_and(matches)) {
                let found = w.current.atom(atom_id).map(|a| a.charge);
                fail(match found {
                    Some(c) => format!("atom '{atom_id}' has charge {c}, expected {expected}"),
                    None => format!("atom '{atom_id}' is not present at step {s}"),
                });
            }
        }
        SemanticEvent::Arrow { label, arrow_type } => {
            if w.current.arrow_labeled(label, arrow_type.as_deref()).is_none() {
                let kind = arrow_type
                    .as_deref()
                    .map(|t| format!(" of type '{t}'"))
                    .unwrap_or_default();
                fail(format!("no electron-movement arrow labeled '{label}'{kind} at step {s}"));
            }
        }
        SemanticEvent::Intermediate { species, atom_id } => match w.current.atom(atom_id) {
            None => fail(format!("atom '{atom_id}' is not present at step {s}")),
            Some(a) if species == "carbocation" && a.charge <= 0.0 => fail(format!(
                "carbocation atom '{atom_id}' must carry a positive charge, found {}",
                a.charge
            )),
            Some(_) => {}
        },
        SemanticEvent::Role { atom_id, .. } => {
            if let Some(id) = atom_id
                && !atom_known(id)
            {
                fail(format!("role references unknown atom '{id}'"));
            }
        }
        SemanticEvent::Unknown(_) => fail("unknown semantic event type".to_owned()),
    }
}
