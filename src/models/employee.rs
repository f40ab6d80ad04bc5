use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fte::Fte;
use super::skill::Skill;

/// A person who can be allocated to projects.
///
/// `max_fte` is the capacity ceiling (1.0 = full time). Committed and
/// available FTE are never stored here; they are derived from allocations
/// on every read (see [`crate::capacity`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    /// Human-facing employee code (e.g. `EMP-0042`).
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub designation: String,
    pub status: EmployeeStatus,
    #[serde(rename = "maxFTE", alias = "maxFte", default = "default_max_fte")]
    pub max_fte: Fte,
    #[serde(default)]
    pub skills: Vec<EmployeeSkill>,
}

pub(crate) fn default_max_fte() -> Fte {
    Fte::FULL
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    pub fn has_skill(&self, skill_id: Uuid) -> bool {
        self.skills.iter().any(|s| s.skill.id == skill_id)
    }

    pub fn primary_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.is_primary).map(|s| &s.skill)
    }
}

/// Employment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::OnLeave => "ON_LEAVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "ON_LEAVE" => Some(Self::OnLeave),
            _ => None,
        }
    }
}

/// A skill held by an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSkill {
    pub skill: Skill,
    pub proficiency: Proficiency,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
            Self::Expert => "EXPERT",
        }
    }
}

/// A skill assignment inside employee create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSkillInput {
    pub skill_id: Uuid,
    pub proficiency: Proficiency,
    #[serde(default)]
    pub is_primary: bool,
}

/// Input for creating a new employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeInput {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    pub status: EmployeeStatus,
    #[serde(rename = "maxFTE", default = "default_max_fte")]
    pub max_fte: Fte,
    #[serde(default)]
    pub skills: Vec<EmployeeSkillInput>,
}

/// Input for updating an existing employee. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(rename = "maxFTE", skip_serializing_if = "Option::is_none")]
    pub max_fte: Option<Fte>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<EmployeeSkillInput>>,
}
