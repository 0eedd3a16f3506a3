use crate::foundation::core::DEFAULT_DURATION_MS;
use crate::foundation::math::{StableHasher, number_like};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Step window shared by every cue category.
///
/// `step: None` means "no start step": visible from the start under carry-forward, and at every
/// step under strict scoping. `end_step` is inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifetime {
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub end_step: Option<u32>,
}

/// How a cue's `step` is matched against the active step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionPolicy {
    /// Visible from `step` onward (a missing step counts as before the first step).
    CarryForward,
    /// Visible only at exactly `step`; a missing step is visible everywhere.
    Strict,
    /// Visible only at exactly `step`; a missing step is never visible.
    Exact,
}

impl Lifetime {
    pub const ALWAYS: Self = Self {
        step: None,
        end_step: None,
    };

    pub fn at(step: u32) -> Self {
        Self {
            step: Some(step),
            end_step: None,
        }
    }

    pub fn with_end_step(mut self, end_step: Option<u32>) -> Self {
        self.end_step = end_step;
        self
    }

    /// Start step as a signed rank, with a missing step ranked before step 0.
    pub fn rank(self) -> i64 {
        self.step.map_or(-1, i64::from)
    }

    fn within_end(self, step: u32) -> bool {
        self.end_step.is_none_or(|end| step <= end)
    }

    /// The single visibility predicate used by the resolver, the validator and preview tooling.
    pub fn is_visible_at(self, step: u32, policy: SelectionPolicy) -> bool {
        let started = match (policy, self.step) {
            (SelectionPolicy::CarryForward, None) => true,
            (SelectionPolicy::CarryForward, Some(s)) => s <= step,
            (SelectionPolicy::Strict, None) => true,
            (SelectionPolicy::Strict | SelectionPolicy::Exact, Some(s)) => s == step,
            (SelectionPolicy::Exact, None) => false,
        };
        started && self.within_end(step)
    }

    fn hash_into(self, h: &mut StableHasher) {
        h.write_opt_u32(self.step);
        h.write_opt_u32(self.end_step);
    }
}

/// Anything with a step window.
pub trait StepCue {
    fn lifetime(&self) -> Lifetime;
}

/// A cue whose entries collapse to the latest state per identity key under carry-forward.
pub trait KeyedCue: StepCue {
    fn key(&self) -> Cow<'_, str>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomCue {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub charge: f64,
    #[serde(flatten)]
    pub lifetime: Lifetime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondCue {
    pub from: String,
    pub to: String,
    #[serde(default = "default_bond_order")]
    pub order: u8,
    #[serde(flatten)]
    pub lifetime: Lifetime,
}

fn default_bond_order() -> u8 {
    1
}

impl BondCue {
    /// Undirected identity: the endpoint ids sorted and joined with `|`.
    pub fn key(&self) -> String {
        bond_key(&self.from, &self.to)
    }

    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

pub fn bond_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DipoleCue {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(flatten)]
    pub lifetime: Lifetime,
}

impl DipoleCue {
    /// `delta+`/`delta-` tokens spelled with the Greek letter.
    pub fn display_text(&self) -> String {
        self.text.replace("delta+", "δ+").replace("delta-", "δ-")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LonePairCue {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub lifetime: Lifetime,
}

/// Curved electron-movement arrow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowCue {
    pub path: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_bend")]
    pub bend: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_atom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_atom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_type: Option<String>,
    #[serde(flatten)]
    pub lifetime: Lifetime,
}

fn default_bend() -> f64 {
    1.0
}

impl ArrowCue {
    /// The authored curve with its bend applied, or `None` when the path does not parse.
    pub fn curve(&self) -> Option<kurbo::CubicBez> {
        let c = crate::geometry::curve::parse_cubic_path(&self.path)?;
        Some(crate::geometry::curve::apply_bend(&c, self.bend))
    }
}

macro_rules! impl_step_cue {
    ($($ty:ty),*) => {
        $(impl StepCue for $ty {
            fn lifetime(&self) -> Lifetime {
                self.lifetime
            }
        })*
    };
}

impl_step_cue!(AtomCue, BondCue, DipoleCue, LonePairCue, ArrowCue);

impl KeyedCue for AtomCue {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }
}

impl KeyedCue for BondCue {
    fn key(&self) -> Cow<'_, str> {
        Cow::Owned(BondCue::key(self))
    }
}

/// Cue category, used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CueKind {
    Atom,
    Bond,
    Dipole,
    LonePair,
    Arrow,
}

impl CueKind {
    /// JSON field name holding this category.
    pub fn field(self) -> &'static str {
        match self {
            Self::Atom => "atoms",
            Self::Bond => "bonds",
            Self::Dipole => "dipoles",
            Self::LonePair => "lonePairs",
            Self::Arrow => "electronMovement",
        }
    }
}

/// Declared chemistry assertions for one step. Only the validator reads these.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepSemantics {
    #[serde(default)]
    pub events: Vec<SemanticEvent>,
    #[serde(default)]
    pub invariants: Vec<String>,
}

/// A typed chemistry event. Unrecognized `type` values are kept verbatim so the validator can
/// report them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SemanticEvent {
    BondBreak {
        from: String,
        to: String,
        order: Option<u8>,
    },
    BondForm {
        from: String,
        to: String,
        order: Option<u8>,
        allow_preexisting: bool,
    },
    ChargeSet {
        atom_id: String,
        charge: Option<f64>,
    },
    Arrow {
        label: String,
        arrow_type: Option<String>,
    },
    Intermediate {
        species: String,
        atom_id: String,
    },
    Role {
        atom_id: Option<String>,
        role: Option<String>,
    },
    Unknown(Value),
}

impl SemanticEvent {
    /// The event's `type` tag.
    pub fn kind(&self) -> Cow<'_, str> {
        match self {
            Self::BondBreak { .. } => Cow::Borrowed("bondBreak"),
            Self::BondForm { .. } => Cow::Borrowed("bondForm"),
            Self::ChargeSet { .. } => Cow::Borrowed("chargeSet"),
            Self::Arrow { .. } => Cow::Borrowed("arrow"),
            Self::Intermediate { .. } => Cow::Borrowed("intermediate"),
            Self::Role { .. } => Cow::Borrowed("role"),
            Self::Unknown(v) => match v.get("type") {
                Some(Value::String(s)) => Cow::Owned(s.clone()),
                Some(other) => Cow::Owned(other.to_string()),
                None => Cow::Borrowed("<missing>"),
            },
        }
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
        .unwrap_or_default()
}

fn opt_str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    Some(str_field(obj, key)).filter(|s| !s.is_empty())
}

fn order_field(obj: &Map<String, Value>) -> Option<u8> {
    obj.get("order")
        .and_then(number_like)
        .map(|n| n.floor().clamp(1.0, 3.0) as u8)
}

impl From<Value> for SemanticEvent {
    fn from(v: Value) -> Self {
        let Value::Object(obj) = &v else {
            return Self::Unknown(v);
        };
        match obj.get("type").and_then(Value::as_str) {
            Some("bondBreak") => Self::BondBreak {
                from: str_field(obj, "from"),
                to: str_field(obj, "to"),
                order: order_field(obj),
            },
            Some("bondForm") => Self::BondForm {
                from: str_field(obj, "from"),
                to: str_field(obj, "to"),
                order: order_field(obj),
                allow_preexisting: obj
                    .get("allowPreexisting")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            Some("chargeSet") => Self::ChargeSet {
                atom_id: str_field(obj, "atomId"),
                charge: obj.get("charge").and_then(number_like),
            },
            Some("arrow") => Self::Arrow {
                label: str_field(obj, "label"),
                arrow_type: opt_str_field(obj, "arrowType"),
            },
            Some("intermediate") => Self::Intermediate {
                species: str_field(obj, "species"),
                atom_id: str_field(obj, "atomId"),
            },
            Some("role") => Self::Role {
                atom_id: opt_str_field(obj, "atomId"),
                role: opt_str_field(obj, "role"),
            },
            _ => Self::Unknown(v),
        }
    }
}

impl From<SemanticEvent> for Value {
    fn from(e: SemanticEvent) -> Self {
        let mut obj = Map::new();
        let mut put = |k: &str, v: Value| {
            obj.insert(k.to_owned(), v);
        };
        match e {
            SemanticEvent::BondBreak { from, to, order } => {
                put("type", "bondBreak".into());
                put("from", from.into());
                put("to", to.into());
                if let Some(o) = order {
                    put("order", o.into());
                }
            }
            SemanticEvent::BondForm {
                from,
                to,
                order,
                allow_preexisting,
            } => {
                put("type", "bondForm".into());
                put("from", from.into());
                put("to", to.into());
                if let Some(o) = order {
                    put("order", o.into());
                }
                if allow_preexisting {
                    put("allowPreexisting", true.into());
                }
            }
            SemanticEvent::ChargeSet { atom_id, charge } => {
                put("type", "chargeSet".into());
                put("atomId", atom_id.into());
                put("charge", charge.map_or(Value::Null, Value::from));
            }
            SemanticEvent::Arrow { label, arrow_type } => {
                put("type", "arrow".into());
                put("label", label.into());
                if let Some(t) = arrow_type {
                    put("arrowType", t.into());
                }
            }
            SemanticEvent::Intermediate { species, atom_id } => {
                put("type", "intermediate".into());
                put("species", species.into());
                put("atomId", atom_id.into());
            }
            SemanticEvent::Role { atom_id, role } => {
                put("type", "role".into());
                if let Some(a) = atom_id {
                    put("atomId", a.into());
                }
                if let Some(r) = role {
                    put("role", r.into());
                }
            }
            SemanticEvent::Unknown(v) => return v,
        }
        Value::Object(obj)
    }
}

/// One declarative mechanism animation. Immutable once produced by the sanitizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanismDefinition {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Headline progress-marker curve, independent of the cue geometry.
    pub path: String,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    pub steps: Vec<String>,
    #[serde(default)]
    pub atoms: Vec<AtomCue>,
    #[serde(default)]
    pub bonds: Vec<BondCue>,
    #[serde(default)]
    pub dipoles: Vec<DipoleCue>,
    #[serde(default)]
    pub lone_pairs: Vec<LonePairCue>,
    #[serde(default)]
    pub electron_movement: Vec<ArrowCue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_cue_ids: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_registry: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_semantics: Option<Vec<Option<StepSemantics>>>,
}

fn default_duration_ms() -> u32 {
    DEFAULT_DURATION_MS
}

impl MechanismDefinition {
    /// A definition with the given id and steps and no cues.
    pub fn empty(id: impl Into<String>, steps: Vec<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            summary: String::new(),
            path: crate::foundation::core::DEFAULT_HEADLINE_PATH.to_owned(),
            duration_ms: DEFAULT_DURATION_MS,
            steps,
            atoms: Vec::new(),
            bonds: Vec::new(),
            dipoles: Vec::new(),
            lone_pairs: Vec::new(),
            electron_movement: Vec::new(),
            step_cue_ids: None,
            cue_registry: None,
            step_semantics: None,
            id,
        }
    }

    /// Number of discrete steps, never less than 1.
    pub fn step_count(&self) -> u32 {
        u32::try_from(self.steps.len()).unwrap_or(u32::MAX).max(1)
    }

    /// Whether any drawable cue exists. A registered definition without cues is a valid,
    /// visually empty mechanism.
    pub fn has_visual_cues(&self) -> bool {
        !(self.atoms.is_empty()
            && self.bonds.is_empty()
            && self.dipoles.is_empty()
            && self.lone_pairs.is_empty()
            && self.electron_movement.is_empty())
    }

    pub fn step_text(&self, step: u32) -> Option<&str> {
        self.steps.get(step as usize).map(String::as_str)
    }

    /// Content fingerprint. Two definitions with equal contents hash equal regardless of where
    /// they live in memory.
    pub fn fingerprint(&self) -> u64 {
        let mut h = StableHasher::new();
        h.write_str(&self.id);
        h.write_str(&self.title);
        h.write_str(&self.summary);
        h.write_str(&self.path);
        h.write_u32(self.duration_ms);
        h.write_u64(self.steps.len() as u64);
        for s in &self.steps {
            h.write_str(s);
        }

        h.write_u64(self.atoms.len() as u64);
        for a in &self.atoms {
            h.write_str(&a.id);
            h.write_f64(a.x);
            h.write_f64(a.y);
            h.write_str(&a.label);
            h.write_f64(a.charge);
            a.lifetime.hash_into(&mut h);
        }
        h.write_u64(self.bonds.len() as u64);
        for b in &self.bonds {
            h.write_str(&b.from);
            h.write_str(&b.to);
            h.write_u8(b.order);
            b.lifetime.hash_into(&mut h);
        }
        h.write_u64(self.dipoles.len() as u64);
        for d in &self.dipoles {
            h.write_f64(d.x);
            h.write_f64(d.y);
            h.write_str(&d.text);
            d.lifetime.hash_into(&mut h);
        }
        h.write_u64(self.lone_pairs.len() as u64);
        for l in &self.lone_pairs {
            h.write_f64(l.x);
            h.write_f64(l.y);
            h.write_str(&l.label);
            l.lifetime.hash_into(&mut h);
        }
        h.write_u64(self.electron_movement.len() as u64);
        for e in &self.electron_movement {
            h.write_str(&e.path);
            h.write_str(&e.label);
            h.write_f64(e.bend);
            h.write_opt_str(e.from_atom_id.as_deref());
            h.write_opt_str(e.to_atom_id.as_deref());
            h.write_opt_str(e.arrow_type.as_deref());
            e.lifetime.hash_into(&mut h);
        }

        match &self.step_cue_ids {
            None => h.write_u8(0),
            Some(rows) => {
                h.write_u8(1);
                h.write_u64(rows.len() as u64);
                for row in rows {
                    h.write_u64(row.len() as u64);
                    for id in row {
                        h.write_str(id);
                    }
                }
            }
        }
        match &self.cue_registry {
            None => h.write_u8(0),
            Some(reg) => {
                h.write_u8(1);
                h.write_u64(reg.len() as u64);
                for (k, v) in reg {
                    h.write_str(k);
                    h.write_json(v);
                }
            }
        }
        match &self.step_semantics {
            None => h.write_u8(0),
            Some(entries) => {
                h.write_u8(1);
                h.write_u64(entries.len() as u64);
                for entry in entries {
                    match entry {
                        None => h.write_u8(0),
                        Some(sem) => {
                            h.write_u8(1);
                            h.write_u64(sem.events.len() as u64);
                            for ev in &sem.events {
                                h.write_json(&Value::from(ev.clone()));
                            }
                            h.write_u64(sem.invariants.len() as u64);
                            for inv in &sem.invariants {
                                h.write_str(inv);
                            }
                        }
                    }
                }
            }
        }

        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
