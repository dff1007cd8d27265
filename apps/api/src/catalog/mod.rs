//! Static skill/role/resource catalogs — loaded once at startup, read-only afterwards.
//!
//! The catalog is the only data shared between requests, so it is validated
//! up front and handed out behind an `Arc`. A role that fails validation
//! (weights not summing to 1, required level out of range) aborts startup —
//! these are deployment mistakes, not request errors.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SKILLS_JSON: &str = include_str!("data/skills.json");
const ROLES_JSON: &str = include_str!("data/roles.json");
const RESOURCES_JSON: &str = include_str!("data/resources.json");

/// Tolerance for role weight sums.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Catalog validation failure. Fatal at startup, never raised per-request.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("role '{role}' references unknown skill '{skill}'")]
    UnknownSkill { role: String, skill: String },

    #[error("role '{role}': required level for '{skill}' must be in [0, 1], got {value}")]
    InvalidRequiredLevel {
        role: String,
        skill: String,
        value: f64,
    },

    #[error("role '{role}': weight for '{skill}' must be non-negative, got {value}")]
    NegativeWeight {
        role: String,
        skill: String,
        value: f64,
    },

    #[error("role '{role}': weights sum to {total}, expected 1")]
    WeightSum { role: String, total: f64 },

    #[error("resource '{resource}': coverage for '{skill}' must be in [0, 1], got {value}")]
    InvalidCoverage {
        resource: String,
        skill: String,
        value: f64,
    },

    #[error("duplicate resource id '{0}'")]
    DuplicateResourceId(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A skill known to the system, with its display grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    pub group: String,
}

/// Per-skill requirement inside a role: target level and relative weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub required: f64,
    pub weight: f64,
}

/// A target role: display metadata plus the skill → requirement mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDef {
    pub label: String,
    pub description: String,
    pub icon: String,
    pub skills: BTreeMap<String, SkillRequirement>,
}

/// Resource delivery format. Drives selection order (practice seeds first)
/// and the fallback display icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Practice,
    Theory,
    Video,
    Course,
}

/// A learning resource from the curated catalog. Immutable — per-request
/// scoring decorates copies, never the catalog entry itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Estimated hours to complete.
    pub time: f64,
    /// Skill → fraction of that skill the resource covers. Skills outside
    /// the vocabulary are tolerated and simply never contribute benefit.
    pub coverage: BTreeMap<String, f64>,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub icon_type: String,
}

/// The ordered skill vocabulary: every skill name with a stable index.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SkillVocabulary {
    pub fn new(skills: &[SkillDef]) -> Self {
        let names: Vec<String> = skills.iter().map(|s| s.name.clone()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, skill: &str) -> Option<usize> {
        self.index.get(skill).copied()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Skill names in vocabulary (index) order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// The full static catalog shared read-only by every request.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub skills: Vec<SkillDef>,
    pub vocabulary: SkillVocabulary,
    pub roles: BTreeMap<String, RoleDef>,
    pub resources: Vec<Resource>,
}

// ────────────────────────────────────────────────────────────────────────────
// Loading & validation
// ────────────────────────────────────────────────────────────────────────────

impl Catalog {
    /// Loads the embedded catalog and validates it. Call once at startup.
    pub fn load_default() -> Result<Self, CatalogError> {
        let skills: Vec<SkillDef> = serde_json::from_str(SKILLS_JSON)?;
        let roles: BTreeMap<String, RoleDef> = serde_json::from_str(ROLES_JSON)?;
        let resources: Vec<Resource> = serde_json::from_str(RESOURCES_JSON)?;
        Self::build(skills, roles, resources)
    }

    /// Builds and validates a catalog from already-parsed parts.
    pub fn build(
        skills: Vec<SkillDef>,
        roles: BTreeMap<String, RoleDef>,
        resources: Vec<Resource>,
    ) -> Result<Self, CatalogError> {
        let vocabulary = SkillVocabulary::new(&skills);

        for (role_name, role) in &roles {
            validate_role(role_name, role, &vocabulary)?;
        }
        validate_resources(&resources)?;

        Ok(Self {
            skills,
            vocabulary,
            roles,
            resources,
        })
    }

    pub fn role(&self, name: &str) -> Option<&RoleDef> {
        self.roles.get(name)
    }
}

fn validate_role(
    role_name: &str,
    role: &RoleDef,
    vocabulary: &SkillVocabulary,
) -> Result<(), CatalogError> {
    let mut total_weight = 0.0;

    for (skill, req) in &role.skills {
        if vocabulary.index_of(skill).is_none() {
            return Err(CatalogError::UnknownSkill {
                role: role_name.to_string(),
                skill: skill.clone(),
            });
        }
        if !(0.0..=1.0).contains(&req.required) {
            return Err(CatalogError::InvalidRequiredLevel {
                role: role_name.to_string(),
                skill: skill.clone(),
                value: req.required,
            });
        }
        if req.weight < 0.0 {
            return Err(CatalogError::NegativeWeight {
                role: role_name.to_string(),
                skill: skill.clone(),
                value: req.weight,
            });
        }
        total_weight += req.weight;
    }

    if (total_weight - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(CatalogError::WeightSum {
            role: role_name.to_string(),
            total: total_weight,
        });
    }

    Ok(())
}

fn validate_resources(resources: &[Resource]) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();

    for resource in resources {
        if !seen.insert(resource.id.as_str()) {
            return Err(CatalogError::DuplicateResourceId(resource.id.clone()));
        }
        for (skill, coverage) in &resource.coverage {
            if !(0.0..=1.0).contains(coverage) {
                return Err(CatalogError::InvalidCoverage {
                    resource: resource.id.clone(),
                    skill: skill.clone(),
                    value: *coverage,
                });
            }
        }
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
