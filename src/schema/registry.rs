use crate::eval::scene::SceneOptions;
use crate::foundation::error::{MechError, MechResult};
use crate::scene::model::MechanismDefinition;
use crate::schema::issue::PathElem;
use crate::schema::overrides::OverrideTable;
use crate::schema::sanitize::{Fallbacks, Sanitized, SanitizeWarning, sanitize_definition, title_case};
use crate::validate::{ValidationGate, validate_mechanism};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// A reaction pathway edge from the link dataset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionLink {
    #[serde(default)]
    pub animation_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub source: Option<Endpoint>,
    #[serde(default)]
    pub target: Option<Endpoint>,
    #[serde(default)]
    pub mechanism_summary: Option<String>,
}

/// A link endpoint: a bare compound id, or a resolved node object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Id(String),
    Node {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

/// A compound node as it appears in the dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompoundNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The `{nodes, links}` dataset shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinkDataset {
    #[serde(default)]
    pub nodes: Vec<CompoundNode>,
    #[serde(default)]
    pub links: Vec<ReactionLink>,
}

impl LinkDataset {
    pub fn from_json_str(s: &str) -> MechResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> MechResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MechError::serde(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn compound_names(&self) -> CompoundNames {
        self.nodes
            .iter()
            .filter_map(|n| Some((n.id.clone(), n.name.clone()?)))
            .collect()
    }
}

/// External compound id → display name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundNames {
    names: HashMap<String, String>,
}

impl FromIterator<(String, String)> for CompoundNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl CompoundNames {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display name for a link endpoint, `"Compound"` when nothing usable is present.
    pub fn endpoint_name(&self, endpoint: Option<&Endpoint>) -> String {
        let non_empty = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        let resolved = match endpoint {
            Some(Endpoint::Id(id)) => {
                let id = id.trim();
                (!id.is_empty()).then(|| self.get(id).unwrap_or(id).to_owned())
            }
            Some(Endpoint::Node { id, name }) => non_empty(name).or_else(|| {
                non_empty(id).map(|id| self.get(&id).map_or(id.clone(), str::to_owned))
            }),
            None => None,
        };
        resolved.unwrap_or_else(|| "Compound".to_owned())
    }
}

/// Templated text for a link without curated copy.
pub fn link_fallbacks(link: &ReactionLink, animation_id: &str, names: &CompoundNames) -> Fallbacks {
    let source = names.endpoint_name(link.source.as_ref());
    let target = names.endpoint_name(link.target.as_ref());
    let label = link.label.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let kind = link.kind.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let title = label.map_or_else(|| title_case(animation_id), |l| format!("{l} mechanism"));
    let summary = link
        .mechanism_summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("{source} to {target} reaction pathway."), str::to_owned);
    let pathway = label.or(kind).unwrap_or("Pathway").to_lowercase();

    Fallbacks {
        title,
        summary,
        steps: vec![
            format!("{source}: reactants orient for {pathway}."),
            format!("Electron flow follows {pathway} with stated reagents."),
            format!("{target}: product stabilizes and route is complete."),
        ],
    }
}

/// Read-only map from animation id to its sanitized definition.
#[derive(Debug, Clone, Default)]
pub struct MechanismRegistry {
    entries: BTreeMap<String, Arc<MechanismDefinition>>,
}

/// What the host should show for a requested pathway.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    NoAnimationId,
    NotRegistered(String),
    /// Registered, structurally valid, but nothing to draw.
    NoCues(Arc<MechanismDefinition>),
    Ready(Arc<MechanismDefinition>),
}

impl Availability {
    /// Fallback text for the states that cannot play.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NoAnimationId => Some("No animation ID is attached to this pathway yet."),
            Self::NotRegistered(_) => Some("No animation asset is registered for this pathway yet."),
            Self::NoCues(_) => Some("This mechanism has no visual cues yet."),
            Self::Ready(_) => None,
        }
    }

    pub fn definition(&self) -> Option<&Arc<MechanismDefinition>> {
        match self {
            Self::NoCues(d) | Self::Ready(d) => Some(d),
            _ => None,
        }
    }
}

impl MechanismRegistry {
    /// Build one entry per link carrying a non-empty animation id. A later link with the same id
    /// replaces the earlier entry.
    #[tracing::instrument(skip_all, fields(links = links.len(), overrides = overrides.len()))]
    pub fn build(
        links: &[ReactionLink],
        overrides: &OverrideTable,
        names: &CompoundNames,
    ) -> Sanitized<Self> {
        let mut entries = BTreeMap::new();
        let mut dropped = 0;
        let mut warnings: Vec<SanitizeWarning> = Vec::new();

        for link in links {
            let Some(id) = link
                .animation_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            let fallbacks = link_fallbacks(link, id, names);
            let out = sanitize_definition(id, overrides.get(id), &fallbacks);
            dropped += out.dropped;
            warnings.extend(out.warnings.into_iter().map(|mut w| {
                w.path.insert(0, PathElem::Key(id.to_owned()));
                w
            }));
            entries.insert(id.to_owned(), Arc::new(out.value));
        }

        tracing::debug!(entries = entries.len(), dropped, "mechanism registry built");
        Sanitized {
            value: Self { entries },
            dropped,
            warnings,
        }
    }

    /// [`Self::build`], then validate every entry in id order when `gate` is enabled. The first
    /// failing definition aborts the build with its aggregated error.
    pub fn build_validated(
        links: &[ReactionLink],
        overrides: &OverrideTable,
        names: &CompoundNames,
        gate: ValidationGate,
        scene_opts: SceneOptions,
    ) -> MechResult<Sanitized<Self>> {
        let built = Self::build(links, overrides, names);
        if gate.is_enabled() {
            for def in built.value.definitions() {
                validate_mechanism(def, scene_opts)?;
            }
        }
        Ok(built)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<MechanismDefinition>> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<MechanismDefinition>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the display state for a link's animation id.
    pub fn availability(&self, animation_id: Option<&str>) -> Availability {
        let Some(id) = animation_id.map(str::trim).filter(|s| !s.is_empty()) else {
            return Availability::NoAnimationId;
        };
        match self.entries.get(id) {
            None => Availability::NotRegistered(id.to_owned()),
            Some(def) if def.has_visual_cues() => Availability::Ready(Arc::clone(def)),
            Some(def) => Availability::NoCues(Arc::clone(def)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/registry.rs"]
mod tests;
