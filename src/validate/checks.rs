use crate::geometry::curve::parse_cubic_path;
use crate::scene::model::{CueKind, MechanismDefinition};
use crate::schema::issue::{Issue, PathElem};
use std::collections::HashSet;

/// Referential integrity and finiteness of every cue.
pub(crate) fn check_structure(def: &MechanismDefinition, issues: &mut Vec<Issue>) {
    if def.steps.is_empty() {
        issues.push(Issue::at(&[PathElem::Field("steps")], "steps must not be empty"));
    }
    if def.duration_ms == 0 {
        issues.push(Issue::at(
            &[PathElem::Field("durationMs")],
            "durationMs must be positive",
        ));
    }

    // Pass 1: atoms, collecting every id that appears at any step.
    let mut atom_ids = HashSet::<&str>::new();
    for (i, atom) in def.atoms.iter().enumerate() {
        let at = cue_path(CueKind::Atom, i);
        if atom.id.trim().is_empty() {
            issues.push(Issue::at(&at, "atom id must be a non-empty string"));
        } else {
            atom_ids.insert(atom.id.as_str());
        }
        if !(atom.x.is_finite() && atom.y.is_finite()) {
            issues.push(Issue::at(
                &at,
                format!("atom '{}' has non-finite coordinates", atom.id),
            ));
        }
    }

    // Pass 2: everything that points at atoms.
    for (i, bond) in def.bonds.iter().enumerate() {
        let at = cue_path(CueKind::Bond, i);
        let missing: Vec<&str> = [bond.from.as_str(), bond.to.as_str()]
            .into_iter()
            .filter(|id| !atom_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            issues.push(Issue::at(
                &at,
                format!(
                    "bond {}-{} references unknown atoms: {}",
                    bond.from,
                    bond.to,
                    missing.join(", ")
                ),
            ));
        }
        if !(1..=3).contains(&bond.order) {
            let mut p = at.clone();
            p.push(PathElem::Field("order"));
            issues.push(Issue::at(&p, "bond order must be 1, 2 or 3"));
        }
    }

    for (i, d) in def.dipoles.iter().enumerate() {
        if !(d.x.is_finite() && d.y.is_finite()) {
            issues.push(Issue::at(
                &cue_path(CueKind::Dipole, i),
                "dipole has non-finite coordinates",
            ));
        }
    }
    for (i, lp) in def.lone_pairs.iter().enumerate() {
        if !(lp.x.is_finite() && lp.y.is_finite()) {
            issues.push(Issue::at(
                &cue_path(CueKind::LonePair, i),
                "lone pair has non-finite coordinates",
            ));
        }
    }

    for (i, arrow) in def.electron_movement.iter().enumerate() {
        let at = cue_path(CueKind::Arrow, i);
        let field = |name: &'static str| {
            let mut p = at.clone();
            p.push(PathElem::Field(name));
            p
        };
        match parse_cubic_path(&arrow.path) {
            Some(c) if c.p0.is_finite() && c.p3.is_finite() => {}
            _ => issues.push(Issue::at(
                &field("path"),
                format!("arrow path '{}' is not a valid cubic curve", arrow.path),
            )),
        }
        for (name, id) in [
            ("fromAtomId", arrow.from_atom_id.as_deref()),
            ("toAtomId", arrow.to_atom_id.as_deref()),
        ] {
            if let Some(id) = id
                && !atom_ids.contains(id)
            {
                issues.push(Issue::at(
                    &field(name),
                    format!("arrow references unknown atom '{id}'"),
                ));
            }
        }
    }

    check_step_cue_ids(def, issues);
}

fn check_step_cue_ids(def: &MechanismDefinition, issues: &mut Vec<Issue>) {
    let Some(rows) = &def.step_cue_ids else {
        return;
    };
    for (s, row) in rows.iter().enumerate() {
        for (j, id) in row.iter().enumerate() {
            let known = def
                .cue_registry
                .as_ref()
                .is_some_and(|reg| reg.contains_key(id));
            if !known {
                issues.push(Issue::at(
                    &[
                        PathElem::Field("stepCueIds"),
                        PathElem::Index(s),
                        PathElem::Index(j),
                    ],
                    format!("cue id '{id}' is not in the cue registry"),
                ));
            }
        }
    }
}

fn cue_path(kind: CueKind, index: usize) -> Vec<PathElem> {
    vec![PathElem::Field(kind.field()), PathElem::Index(index)]
}
