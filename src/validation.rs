//! Local input validation.
//!
//! Runs before any remote call. Every check is performed and all failures
//! are returned together so a form can mark each offending field at once.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::models::*;

/// Validation result: `Ok(())` or every detected problem.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Payloads that can be checked locally before submission.
pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

#[derive(Default)]
struct Checks {
    errors: Vec<ValidationError>,
}

impl Checks {
    fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(ValidationError::Required { field });
        }
    }

    /// A field that may be omitted, but not blanked.
    fn not_blank(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(v) = value {
            self.required(field, v);
        }
    }

    fn date_order(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.errors.push(ValidationError::DateOrder { field: "endDate" });
            }
        }
    }

    fn allocation_fte(&mut self, fte: Option<Fte>) {
        if let Some(fte) = fte {
            if !fte.is_valid_allocation() {
                self.errors.push(ValidationError::FteOutOfRange {
                    value: fte.fraction(),
                });
            }
        }
    }

    fn max_fte(&mut self, max_fte: Option<Fte>) {
        if let Some(max) = max_fte {
            if max.fraction() <= 0.0 {
                self.errors.push(ValidationError::MaxFteOutOfRange {
                    value: max.fraction(),
                });
            }
        }
    }

    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Validate for CreateEmployeeInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.required("employeeId", &self.employee_id);
        checks.required("name", &self.name);
        checks.required("email", &self.email);
        checks.max_fte(Some(self.max_fte));
        checks.finish()
    }
}

impl Validate for UpdateEmployeeInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.not_blank("employeeId", self.employee_id.as_deref());
        checks.not_blank("name", self.name.as_deref());
        checks.not_blank("email", self.email.as_deref());
        checks.max_fte(self.max_fte);
        checks.finish()
    }
}

impl Validate for CreateProjectInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.required("name", &self.name);
        checks.date_order(self.start_date, self.end_date);
        checks.finish()
    }
}

impl Validate for UpdateProjectInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.not_blank("name", self.name.as_deref());
        checks.date_order(self.start_date, self.end_date);
        checks.finish()
    }
}

impl Validate for CreateSkillInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.required("name", &self.name);
        checks.finish()
    }
}

impl Validate for UpdateSkillInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.not_blank("name", self.name.as_deref());
        checks.finish()
    }
}

impl Validate for CreateAllocationInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.allocation_fte(Some(self.fte));
        checks.date_order(Some(self.start_date), self.end_date);
        checks.finish()
    }
}

impl Validate for UpdateAllocationInput {
    fn validate(&self) -> ValidationResult {
        let mut checks = Checks::default();
        checks.allocation_fte(self.fte);
        checks.date_order(self.start_date, self.end_date.flatten());
        checks.finish()
    }
}

impl AllocationDraft {
    /// Checks required fields and converts into a create payload.
    pub fn to_create_input(&self) -> Result<CreateAllocationInput, Vec<ValidationError>> {
        let (employee_id, project_id, fte, start_date) = self.required_fields()?;
        let input = CreateAllocationInput {
            employee_id,
            project_id,
            fte,
            role: self.role.trim().to_string(),
            start_date,
            end_date: self.end_date,
            billable: self.billable,
            assigned_skills: self.assigned_skills.clone(),
        };
        input.validate()?;
        Ok(input)
    }

    /// Checks required fields and converts into a full-replacement update payload.
    pub fn to_update_input(&self) -> Result<UpdateAllocationInput, Vec<ValidationError>> {
        let (employee_id, project_id, fte, start_date) = self.required_fields()?;
        let input = UpdateAllocationInput {
            employee_id: Some(employee_id),
            project_id: Some(project_id),
            fte: Some(fte),
            role: Some(self.role.trim().to_string()),
            start_date: Some(start_date),
            end_date: Some(self.end_date),
            billable: Some(self.billable),
            assigned_skills: Some(self.assigned_skills.clone()),
        };
        input.validate()?;
        Ok(input)
    }

    fn required_fields(
        &self,
    ) -> Result<(uuid::Uuid, uuid::Uuid, Fte, NaiveDate), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.employee_id.is_none() {
            errors.push(ValidationError::Required { field: "employeeId" });
        }
        if self.project_id.is_none() {
            errors.push(ValidationError::Required { field: "projectId" });
        }
        if self.fte.is_none() {
            errors.push(ValidationError::Required { field: "fte" });
        }
        if self.start_date.is_none() {
            errors.push(ValidationError::Required { field: "startDate" });
        }
        match (self.employee_id, self.project_id, self.fte, self.start_date) {
            (Some(e), Some(p), Some(f), Some(s)) if errors.is_empty() => Ok((e, p, f, s)),
            _ => Err(errors),
        }
    }
}
