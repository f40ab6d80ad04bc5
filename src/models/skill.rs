use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A capability tag, used both on employees and as a project requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    /// Free-form grouping label (e.g. "Backend", "Cloud").
    #[serde(default)]
    pub category: String,
}

/// Input for creating a new skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkillInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
}

/// Input for updating an existing skill. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSkillInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A skill reference as it appears inside other payloads: either a bare id
/// or an embedded skill object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillRef {
    Id(Uuid),
    Skill(Skill),
}

impl SkillRef {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Id(id) => *id,
            Self::Skill(skill) => skill.id,
        }
    }

    /// The embedded skill, or a bare one carrying only the id.
    pub fn into_skill(self) -> Skill {
        match self {
            Self::Id(id) => Skill {
                id,
                name: String::new(),
                category: String::new(),
            },
            Self::Skill(skill) => skill,
        }
    }
}

/// Deserializes a skill list as an ordered set: later duplicates by id are dropped.
///
/// Entries may be full skill objects or bare ids. A bare id yields a skill
/// with an empty name; constraint checks only look at ids.
pub(crate) fn dedup_skills<'de, D>(deserializer: D) -> Result<Vec<Skill>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<SkillRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(dedup_by_id(refs.into_iter().map(SkillRef::into_skill).collect()))
}

pub(crate) fn dedup_by_id(skills: Vec<Skill>) -> Vec<Skill> {
    let mut seen = std::collections::HashSet::new();
    skills.into_iter().filter(|s| seen.insert(s.id)).collect()
}
