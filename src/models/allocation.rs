use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fte::{Fte, FteFields};
use super::skill::SkillRef;

/// A time-bounded assignment of one employee to one project at a given FTE.
///
/// The date range is inclusive on both ends. A missing `end_date` means the
/// allocation is open-ended. `status` is only set when the server carries an
/// explicit override; otherwise use [`Allocation::status_at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AllocationWire", into = "AllocationWire")]
pub struct Allocation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub project_id: Uuid,
    pub fte: Fte,
    pub role: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub billable: bool,
    /// Skill ids; a subset of the project's tech stack when it has one.
    pub assigned_skills: Vec<Uuid>,
    pub status: Option<AllocationStatus>,
}

impl Allocation {
    /// Whether `date` falls inside `[start_date, end_date]`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Whether the two inclusive ranges share at least one day.
    pub fn overlaps(&self, other: &Allocation) -> bool {
        let starts_before_other_ends = other.end_date.map_or(true, |end| self.start_date <= end);
        let ends_after_other_starts = self.end_date.map_or(true, |end| other.start_date <= end);
        starts_before_other_ends && ends_after_other_starts
    }

    /// The explicit override if present, otherwise derived from the date range.
    pub fn status_at(&self, as_of: NaiveDate) -> AllocationStatus {
        if let Some(status) = self.status {
            return status;
        }
        if as_of < self.start_date {
            AllocationStatus::Pending
        } else if self.end_date.is_some_and(|end| end < as_of) {
            AllocationStatus::Completed
        } else {
            AllocationStatus::Active
        }
    }

    /// Legacy percentage form of `fte`.
    pub fn allocation_percentage(&self) -> f64 {
        self.fte.percentage()
    }
}

/// Lifecycle status of an allocation.
///
/// - `Pending`: starts in the future
/// - `Active`: the reference date lies inside the range
/// - `Completed`: ended before the reference date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    Active,
    Pending,
    Completed,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

fn default_billable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocationWire {
    id: Uuid,
    employee_id: Uuid,
    project_id: Uuid,
    #[serde(flatten)]
    fte: FteFields,
    #[serde(default)]
    role: String,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default = "default_billable")]
    billable: bool,
    #[serde(default)]
    assigned_skills: Vec<SkillRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<AllocationStatus>,
}

impl TryFrom<AllocationWire> for Allocation {
    type Error = String;

    fn try_from(wire: AllocationWire) -> Result<Self, Self::Error> {
        let fte = wire
            .fte
            .resolve()
            .ok_or_else(|| format!("allocation {} has neither fte nor allocationPercentage", wire.id))?;

        Ok(Allocation {
            id: wire.id,
            employee_id: wire.employee_id,
            project_id: wire.project_id,
            fte,
            role: wire.role,
            start_date: wire.start_date,
            end_date: wire.end_date,
            billable: wire.billable,
            assigned_skills: wire.assigned_skills.iter().map(SkillRef::id).collect(),
            status: wire.status,
        })
    }
}

impl From<Allocation> for AllocationWire {
    fn from(a: Allocation) -> Self {
        AllocationWire {
            id: a.id,
            employee_id: a.employee_id,
            project_id: a.project_id,
            fte: a.fte.into(),
            role: a.role,
            start_date: a.start_date,
            end_date: a.end_date,
            billable: a.billable,
            assigned_skills: a.assigned_skills.into_iter().map(SkillRef::Id).collect(),
            status: a.status,
        }
    }
}

/// Input for creating a new allocation.
///
/// Serializes both `fte` and `allocationPercentage` so either kind of server
/// reads the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "AllocationPayload")]
pub struct CreateAllocationInput {
    pub employee_id: Uuid,
    pub project_id: Uuid,
    pub fte: Fte,
    pub role: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub billable: bool,
    pub assigned_skills: Vec<Uuid>,
}

/// Input for updating an existing allocation. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "AllocationPayload")]
pub struct UpdateAllocationInput {
    pub employee_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub fte: Option<Fte>,
    pub role: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date, making the allocation open-ended.
    pub end_date: Option<Option<NaiveDate>>,
    pub billable: Option<bool>,
    pub assigned_skills: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    employee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<Uuid>,
    #[serde(flatten)]
    fte: FteFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    /// Outer `None` leaves the field out; `Some(None)` sends an explicit null.
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_skills: Option<Vec<Uuid>>,
}

impl From<CreateAllocationInput> for AllocationPayload {
    fn from(input: CreateAllocationInput) -> Self {
        AllocationPayload {
            employee_id: Some(input.employee_id),
            project_id: Some(input.project_id),
            fte: input.fte.into(),
            role: Some(input.role),
            start_date: Some(input.start_date),
            end_date: input.end_date.map(Some),
            billable: Some(input.billable),
            assigned_skills: Some(input.assigned_skills),
        }
    }
}

impl From<UpdateAllocationInput> for AllocationPayload {
    fn from(input: UpdateAllocationInput) -> Self {
        AllocationPayload {
            employee_id: input.employee_id,
            project_id: input.project_id,
            fte: input.fte.into(),
            role: input.role,
            start_date: input.start_date,
            end_date: input.end_date,
            billable: input.billable,
            assigned_skills: input.assigned_skills,
        }
    }
}

/// Form state for an allocation being created or edited.
///
/// Every field may be missing while the user is typing; conversion into an
/// input enforces the required ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationDraft {
    /// Set when editing an existing allocation.
    pub id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub fte: Option<Fte>,
    pub role: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub billable: bool,
    pub assigned_skills: Vec<Uuid>,
}

impl From<&Allocation> for AllocationDraft {
    fn from(a: &Allocation) -> Self {
        AllocationDraft {
            id: Some(a.id),
            employee_id: Some(a.employee_id),
            project_id: Some(a.project_id),
            fte: Some(a.fte),
            role: a.role.clone(),
            start_date: Some(a.start_date),
            end_date: a.end_date,
            billable: a.billable,
            assigned_skills: a.assigned_skills.clone(),
        }
    }
}
