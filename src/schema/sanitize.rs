//! Permissive ingestion of author-supplied mechanism JSON.
//!
//! Nothing here fails. Entries missing an identity-bearing field are dropped, malformed numbers
//! fall back to per-field defaults, and every drop or coercion is recorded so callers can assert
//! on it instead of scraping logs.

use crate::foundation::core::{DEFAULT_DURATION_MS, DEFAULT_HEADLINE_PATH};
use crate::foundation::math::number_like;
use crate::geometry::curve::clamp_bend;
use crate::scene::model::{
    ArrowCue, AtomCue, BondCue, CueKind, DipoleCue, Lifetime, LonePairCue, MechanismDefinition,
    SemanticEvent, StepSemantics,
};
use crate::schema::issue::{Issue, PathElem};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_ATOM_X: f64 = 180.0;
pub const DEFAULT_ATOM_Y: f64 = 56.0;
pub const DEFAULT_DIPOLE_X: f64 = 180.0;
pub const DEFAULT_DIPOLE_Y: f64 = 56.0;
pub const DEFAULT_LONE_PAIR_X: f64 = 160.0;
pub const DEFAULT_LONE_PAIR_Y: f64 = 56.0;

/// A located ingestion note: a dropped entry or a coerced field.
pub type SanitizeWarning = Issue;

/// Result of a permissive ingestion pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized<T> {
    pub value: T,
    /// Entries removed because a required field was missing or malformed.
    pub dropped: usize,
    pub warnings: Vec<SanitizeWarning>,
}

impl<T> Sanitized<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sanitized<U> {
        Sanitized {
            value: f(self.value),
            dropped: self.dropped,
            warnings: self.warnings,
        }
    }
}

/// Text used when an override does not provide its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fallbacks {
    pub title: String,
    pub summary: String,
    pub steps: Vec<String>,
}

#[derive(Default)]
struct Ingest {
    dropped: usize,
    warnings: Vec<SanitizeWarning>,
}

impl Ingest {
    fn drop_entry(&mut self, path: &[PathElem], why: &str) {
        tracing::debug!(path = %crate::schema::issue::format_path(path), why, "dropped entry");
        self.dropped += 1;
        self.warnings.push(Issue::at(path, format!("dropped: {why}")));
    }

    fn note(&mut self, path: &[PathElem], message: impl Into<String>) {
        self.warnings.push(Issue::at(path, message));
    }

    fn finish<T>(self, value: T) -> Sanitized<T> {
        Sanitized {
            value,
            dropped: self.dropped,
            warnings: self.warnings,
        }
    }
}

/// Trimmed, non-empty string.
pub(crate) fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn finite_or(v: Option<&Value>, fallback: f64) -> f64 {
    v.and_then(number_like).unwrap_or(fallback)
}

/// `step`/`endStep` reader: non-negative integers only. Anything else present becomes `None`
/// and is reported, since it silently widens the cue's visibility window.
fn cue_step(obj: &Map<String, Value>, key: &'static str, path: &[PathElem], ing: &mut Ingest) -> Option<u32> {
    let raw = obj.get(key)?;
    if raw.is_null() {
        return None;
    }
    let parsed = number_like(raw)
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32);
    if parsed.is_none() {
        let mut p = path.to_vec();
        p.push(PathElem::Field(key));
        tracing::warn!(path = %crate::schema::issue::format_path(&p), value = %raw, "malformed cue step treated as unset");
        ing.note(&p, format!("{key} {raw} is not a non-negative integer; treated as unset"));
    }
    parsed
}

fn lifetime(obj: &Map<String, Value>, path: &[PathElem], ing: &mut Ingest) -> Lifetime {
    Lifetime {
        step: cue_step(obj, "step", path, ing),
        end_step: cue_step(obj, "endStep", path, ing),
    }
}

/// Walk an optional array of objects, dropping non-object entries.
fn each_object<T>(
    raw: Option<&Value>,
    kind: CueKind,
    ing: &mut Ingest,
    mut f: impl FnMut(&Map<String, Value>, &[PathElem], &mut Ingest) -> Option<T>,
) -> Vec<T> {
    let field = kind.field();
    let items = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            ing.note(&[PathElem::Field(field)], "expected an array; ignored");
            return Vec::new();
        }
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = [PathElem::Field(field), PathElem::Index(i)];
        let Some(obj) = item.as_object() else {
            ing.drop_entry(&path, "not an object");
            continue;
        };
        if let Some(v) = f(obj, &path, ing) {
            out.push(v);
        }
    }
    out
}

fn atoms(raw: Option<&Value>, ing: &mut Ingest) -> Vec<AtomCue> {
    each_object(raw, CueKind::Atom, ing, |obj, path, ing| {
        let Some(id) = non_empty_str(obj.get("id")) else {
            ing.drop_entry(path, "atom id is required");
            return None;
        };
        Some(AtomCue {
            id,
            x: finite_or(obj.get("x"), DEFAULT_ATOM_X),
            y: finite_or(obj.get("y"), DEFAULT_ATOM_Y),
            label: non_empty_str(obj.get("label")).unwrap_or_default(),
            charge: finite_or(obj.get("charge"), 0.0),
            lifetime: lifetime(obj, path, ing),
        })
    })
}

fn bonds(raw: Option<&Value>, ing: &mut Ingest) -> Vec<BondCue> {
    each_object(raw, CueKind::Bond, ing, |obj, path, ing| {
        let (Some(from), Some(to)) = (non_empty_str(obj.get("from")), non_empty_str(obj.get("to")))
        else {
            ing.drop_entry(path, "bond from/to are required");
            return None;
        };
        let order = finite_or(obj.get("order"), 1.0).floor().clamp(1.0, 3.0) as u8;
        Some(BondCue {
            from,
            to,
            order,
            lifetime: lifetime(obj, path, ing),
        })
    })
}

fn dipoles(raw: Option<&Value>, ing: &mut Ingest) -> Vec<DipoleCue> {
    each_object(raw, CueKind::Dipole, ing, |obj, path, ing| {
        let Some(text) = non_empty_str(obj.get("text")) else {
            ing.drop_entry(path, "dipole text is required");
            return None;
        };
        Some(DipoleCue {
            x: finite_or(obj.get("x"), DEFAULT_DIPOLE_X),
            y: finite_or(obj.get("y"), DEFAULT_DIPOLE_Y),
            text,
            lifetime: lifetime(obj, path, ing),
        })
    })
}

fn lone_pairs(raw: Option<&Value>, ing: &mut Ingest) -> Vec<LonePairCue> {
    each_object(raw, CueKind::LonePair, ing, |obj, path, ing| {
        Some(LonePairCue {
            x: finite_or(obj.get("x"), DEFAULT_LONE_PAIR_X),
            y: finite_or(obj.get("y"), DEFAULT_LONE_PAIR_Y),
            label: non_empty_str(obj.get("label")).unwrap_or_default(),
            lifetime: lifetime(obj, path, ing),
        })
    })
}

fn arrows(raw: Option<&Value>, ing: &mut Ingest) -> Vec<ArrowCue> {
    each_object(raw, CueKind::Arrow, ing, |obj, path, ing| {
        let Some(path_text) = non_empty_str(obj.get("path")) else {
            ing.drop_entry(path, "arrow path is required");
            return None;
        };
        let bend = obj.get("bend").and_then(number_like).map_or(1.0, clamp_bend);
        Some(ArrowCue {
            path: path_text,
            label: non_empty_str(obj.get("label")).unwrap_or_default(),
            bend,
            from_atom_id: non_empty_str(obj.get("fromAtomId")),
            to_atom_id: non_empty_str(obj.get("toAtomId")),
            arrow_type: non_empty_str(obj.get("arrowType")),
            lifetime: lifetime(obj, path, ing),
        })
    })
}

fn steps(raw: Option<&Value>, fallback: &[String], ing: &mut Ingest) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return fallback.to_vec();
    };
    if items.is_empty() {
        return fallback.to_vec();
    }
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match non_empty_str(Some(item)) {
            Some(s) => out.push(s),
            None => ing.drop_entry(
                &[PathElem::Field("steps"), PathElem::Index(i)],
                "step text must be a non-empty string",
            ),
        }
    }
    out
}

fn step_cue_ids(raw: Option<&Value>, ing: &mut Ingest) -> Option<Vec<Vec<String>>> {
    let items = raw?.as_array()?;
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let Some(ids) = row.as_array() else {
                ing.note(
                    &[PathElem::Field("stepCueIds"), PathElem::Index(i)],
                    "expected an array of cue ids; treated as empty",
                );
                return Vec::new();
            };
            ids.iter()
                .enumerate()
                .filter_map(|(j, id)| {
                    let out = non_empty_str(Some(id));
                    if out.is_none() {
                        ing.drop_entry(
                            &[
                                PathElem::Field("stepCueIds"),
                                PathElem::Index(i),
                                PathElem::Index(j),
                            ],
                            "cue id must be a non-empty string",
                        );
                    }
                    out
                })
                .collect()
        })
        .collect();
    Some(rows)
}

/// Object keyed by cue id, or an array of `{id, ...}` objects. Canonicalized to a sorted map.
pub fn cue_registry(raw: Option<&Value>) -> Sanitized<Option<BTreeMap<String, Value>>> {
    let mut ing = Ingest::default();
    let value = cue_registry_into(raw, &mut ing);
    ing.finish(value)
}

fn cue_registry_into(raw: Option<&Value>, ing: &mut Ingest) -> Option<BTreeMap<String, Value>> {
    let mut out = BTreeMap::new();
    match raw? {
        Value::Object(map) => {
            for (key, entry) in map {
                let id = key.trim();
                let path = [PathElem::Field("cueRegistry"), PathElem::Key(key.clone())];
                if id.is_empty() {
                    ing.drop_entry(&path, "cue id must be non-empty");
                } else if !entry.is_object() {
                    ing.drop_entry(&path, "cue must be an object");
                } else {
                    out.insert(id.to_owned(), entry.clone());
                }
            }
        }
        Value::Array(items) => {
            for (i, entry) in items.iter().enumerate() {
                let path = [PathElem::Field("cueRegistry"), PathElem::Index(i)];
                let Some(obj) = entry.as_object() else {
                    ing.drop_entry(&path, "cue must be an object");
                    continue;
                };
                let Some(id) = non_empty_str(obj.get("id")) else {
                    ing.drop_entry(&path, "cue id must be non-empty");
                    continue;
                };
                let mut obj = obj.clone();
                obj.insert("id".to_owned(), Value::String(id.clone()));
                if out.insert(id.clone(), Value::Object(obj)).is_some() {
                    ing.note(&path, format!("duplicate cue id '{id}'; later entry wins"));
                }
            }
        }
        _ => return None,
    }
    Some(out)
}

fn step_semantics(
    raw: Option<&Value>,
    step_len: usize,
    ing: &mut Ingest,
) -> Option<Vec<Option<StepSemantics>>> {
    let items = raw?.as_array()?;
    let mut out: Vec<Option<StepSemantics>> = items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let obj = entry.as_object()?;
            let events = match obj.get("events") {
                Some(Value::Array(evs)) => evs
                    .iter()
                    .enumerate()
                    .filter_map(|(j, ev)| {
                        if ev.is_object() {
                            Some(SemanticEvent::from(ev.clone()))
                        } else {
                            ing.drop_entry(
                                &[
                                    PathElem::Field("stepSemantics"),
                                    PathElem::Index(i),
                                    PathElem::Field("events"),
                                    PathElem::Index(j),
                                ],
                                "event must be an object",
                            );
                            None
                        }
                    })
                    .collect(),
                _ => Vec::new(),
            };
            let invariants = match obj.get("invariants") {
                Some(Value::Array(inv)) => inv.iter().filter_map(|s| non_empty_str(Some(s))).collect(),
                _ => Vec::new(),
            };
            Some(StepSemantics { events, invariants })
        })
        .collect();
    if out.len() < step_len {
        out.resize(step_len, None);
    }
    Some(out)
}

fn duration_ms(raw: Option<&Value>) -> u32 {
    raw.and_then(Value::as_f64)
        .filter(|d| d.is_finite() && *d >= 1.0)
        .map_or(DEFAULT_DURATION_MS, |d| d.floor().min(f64::from(u32::MAX)) as u32)
}

/// Build a definition for `id` from an optional curated override, filling gaps from
/// `fallbacks`. Cue arrays are empty when no override is given.
#[tracing::instrument(skip(raw, fallbacks), fields(has_override = raw.is_some()))]
pub fn sanitize_definition(
    id: &str,
    raw: Option<&Value>,
    fallbacks: &Fallbacks,
) -> Sanitized<MechanismDefinition> {
    let mut ing = Ingest::default();
    let empty = Map::new();
    let obj = match raw {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(obj)) => obj,
        Some(_) => {
            ing.note(&[], "override must be an object; ignored");
            &empty
        }
    };
    let get = |k: &str| obj.get(k);

    let steps = steps(get("steps"), &fallbacks.steps, &mut ing);
    let step_len = steps.len();
    let registry_raw = get("cueRegistry").filter(|v| !v.is_null()).or_else(|| get("cues"));

    let def = MechanismDefinition {
        id: id.trim().to_owned(),
        title: non_empty_str(get("title")).unwrap_or_else(|| fallbacks.title.clone()),
        summary: non_empty_str(get("summary")).unwrap_or_else(|| fallbacks.summary.clone()),
        path: non_empty_str(get("path")).unwrap_or_else(|| DEFAULT_HEADLINE_PATH.to_owned()),
        duration_ms: duration_ms(get("durationMs")),
        atoms: atoms(get("atoms"), &mut ing),
        bonds: bonds(get("bonds"), &mut ing),
        dipoles: dipoles(get("dipoles"), &mut ing),
        lone_pairs: lone_pairs(get("lonePairs"), &mut ing),
        electron_movement: arrows(get("electronMovement"), &mut ing),
        step_cue_ids: step_cue_ids(get("stepCueIds"), &mut ing),
        cue_registry: cue_registry_into(registry_raw, &mut ing),
        step_semantics: step_semantics(get("stepSemantics"), step_len, &mut ing),
        steps,
    };

    if ing.dropped > 0 {
        tracing::debug!(id = %def.id, dropped = ing.dropped, "sanitized with drops");
    }
    ing.finish(def)
}

/// Sanitize a self-contained definition object whose `id` lives inside it.
pub fn sanitize_standalone(raw: &Value) -> Sanitized<MechanismDefinition> {
    let id = non_empty_str(raw.get("id")).unwrap_or_default();
    let fallbacks = Fallbacks {
        title: title_case(&id),
        ..Fallbacks::default()
    };
    sanitize_definition(&id, Some(raw), &fallbacks)
}

/// `"alkene-hx_addition"` → `"Alkene Hx Addition"`; empty input → `"Mechanism animation"`.
pub fn title_case(value: &str) -> String {
    let words: Vec<String> = value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Mechanism animation".to_owned()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/sanitize.rs"]
mod tests;
