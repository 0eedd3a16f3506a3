use crate::foundation::error::{MechError, MechResult};
use crate::geometry::curve::parse_cubic_path;
use crate::schema::issue::{Issue, Issues, PathElem};
use crate::schema::sanitize::non_empty_str;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const OPTIONAL_ARRAYS: [&str; 6] = [
    "atoms",
    "bonds",
    "dipoles",
    "lonePairs",
    "electronMovement",
    "stepSemantics",
];

/// Curated per-mechanism overrides keyed by animation id, in their raw author-facing form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: BTreeMap<String, Value>,
}

impl OverrideTable {
    pub fn from_value(v: Value) -> MechResult<Self> {
        let Value::Object(map) = v else {
            return Err(MechError::serde(
                "override table must be a JSON object keyed by animation id",
            ));
        };
        Ok(Self {
            entries: map.into_iter().collect(),
        })
    }

    pub fn from_json_str(s: &str) -> MechResult<Self> {
        Self::from_value(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> MechResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MechError::serde(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Raw override for an animation id.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the author-facing file contract, collecting every violation.
    pub fn check_contract(&self) -> Result<(), Issues> {
        let mut issues = Vec::new();
        for (key, entry) in &self.entries {
            check_entry(key, entry, &mut issues);
        }
        Issues::into_result(issues)
    }
}

fn check_entry(key: &str, entry: &Value, issues: &mut Vec<Issue>) {
    let root = [PathElem::Key(key.to_owned())];
    let at = |field: &'static str| {
        let mut p = root.to_vec();
        p.push(PathElem::Field(field));
        p
    };

    let Some(obj) = entry.as_object() else {
        issues.push(Issue::at(&root, "entry must be an object"));
        return;
    };

    match obj.get("id").and_then(Value::as_str) {
        Some(id) if id == key => {}
        Some(id) => issues.push(Issue::at(
            &at("id"),
            format!("id '{id}' must equal its key '{key}'"),
        )),
        None => issues.push(Issue::at(&at("id"), "id is required")),
    }

    for field in ["title", "summary", "path"] {
        if non_empty_str(obj.get(field)).is_none() {
            issues.push(Issue::at(&at(field), format!("{field} must be a non-empty string")));
        }
    }
    if let Some(path) = non_empty_str(obj.get("path"))
        && parse_cubic_path(&path).is_none()
    {
        issues.push(Issue::at(&at("path"), "path must be a cubic curve 'M x y C x1 y1, x2 y2, x3 y3'"));
    }

    match obj.get("steps") {
        Some(Value::Array(steps)) if !steps.is_empty() => {
            for (i, s) in steps.iter().enumerate() {
                if non_empty_str(Some(s)).is_none() {
                    let mut p = at("steps");
                    p.push(PathElem::Index(i));
                    issues.push(Issue::at(&p, "step must be a non-empty string"));
                }
            }
        }
        _ => issues.push(Issue::at(&at("steps"), "steps must be a non-empty array")),
    }

    for field in OPTIONAL_ARRAYS {
        if let Some(v) = obj.get(field)
            && !v.is_array()
            && !v.is_null()
        {
            issues.push(Issue::at(&at(field), format!("{field} must be an array")));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/overrides.rs"]
mod tests;
