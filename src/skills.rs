//! Skill constraints between allocations and projects.
//!
//! A project with a non-empty tech stack restricts the skills an allocation
//! on it may carry to exactly that stack. A project with an empty stack is
//! unconstrained: any skill from the global catalog may be assigned.

use uuid::Uuid;

use crate::error::SkillMismatchError;
use crate::models::{AllocationDraft, Project, Skill};

/// Skills that may be attached to an allocation on `project`.
///
/// Returns the tech stack in its declared order, or the whole catalog when the
/// project declares none.
pub fn available_skills_for(project: &Project, catalog: &[Skill]) -> Vec<Skill> {
    if project.has_tech_stack() {
        project.tech_stack.clone()
    } else {
        catalog.to_vec()
    }
}

/// Checks `assigned` against `project`'s tech stack.
///
/// Fails on the first skill outside a non-empty stack.
pub fn validate_assignment(assigned: &[Uuid], project: &Project) -> Result<(), SkillMismatchError> {
    if !project.has_tech_stack() {
        return Ok(());
    }
    match assigned.iter().find(|id| !project.requires_skill(**id)) {
        Some(&skill_id) => Err(SkillMismatchError { skill_id }),
        None => Ok(()),
    }
}

/// The subset of `assigned` that stays valid on `project`, in original order.
pub fn reconcile_assigned_skills(assigned: &[Uuid], project: &Project) -> Vec<Uuid> {
    if !project.has_tech_stack() {
        return assigned.to_vec();
    }
    assigned
        .iter()
        .copied()
        .filter(|id| project.requires_skill(*id))
        .collect()
}

/// Skill resolution against a fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct SkillResolver {
    catalog: Vec<Skill>,
}

/// What changed when an allocation draft moved to another project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectChange {
    pub kept: Vec<Uuid>,
    pub dropped: Vec<Uuid>,
}

impl SkillResolver {
    pub fn new(catalog: Vec<Skill>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &[Skill] {
        &self.catalog
    }

    /// Like [`available_skills_for`], with tech-stack entries that arrived as
    /// bare ids filled in from the catalog.
    pub fn available_skills_for(&self, project: &Project) -> Vec<Skill> {
        available_skills_for(project, &self.catalog)
            .into_iter()
            .map(|skill| match self.catalog.iter().find(|s| s.id == skill.id) {
                Some(known) if skill.name.is_empty() => known.clone(),
                _ => skill,
            })
            .collect()
    }

    pub fn validate_assignment(&self, assigned: &[Uuid], project: &Project) -> Result<(), SkillMismatchError> {
        validate_assignment(assigned, project)
    }

    /// Points `draft` at `project` and drops assigned skills the new project
    /// does not allow.
    pub fn resolve_project_change(&self, draft: &mut AllocationDraft, project: &Project) -> ProjectChange {
        let kept = reconcile_assigned_skills(&draft.assigned_skills, project);
        let dropped = draft
            .assigned_skills
            .iter()
            .copied()
            .filter(|id| !kept.contains(id))
            .collect::<Vec<_>>();

        if !dropped.is_empty() {
            tracing::debug!(
                project = %project.id,
                dropped = dropped.len(),
                "Dropped assigned skills outside the new project's tech stack"
            );
        }

        draft.project_id = Some(project.id);
        draft.assigned_skills = kept.clone();
        ProjectChange { kept, dropped }
    }

    /// Looks up catalog entries for `ids`, skipping unknown ids.
    pub fn lookup(&self, ids: &[Uuid]) -> Vec<&Skill> {
        ids.iter()
            .filter_map(|id| self.catalog.iter().find(|s| s.id == *id))
            .collect()
    }
}
