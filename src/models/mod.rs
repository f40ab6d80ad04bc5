//! Domain models for the staffing console.
//!
//! # Core Concepts
//!
//! - [`Employee`]: a person with a capacity ceiling (`max_fte`) and a skill set.
//! - [`Project`]: a client engagement declaring a required tech stack.
//! - [`Skill`]: a capability tag shared by employees and projects.
//! - [`Allocation`]: a dated, fractional assignment of an employee to a project.
//!
//! ## Derived values
//!
//! Committed FTE, available FTE and allocation status are never stored on
//! these records. They are recomputed from allocations on every read by
//! [`crate::capacity`] and [`Allocation::status_at`].
//!
//! ## Wire format
//!
//! The remote store speaks camelCase JSON with SCREAMING_SNAKE_CASE enum
//! values. FTE travels as a fraction (`fte`) and, for older servers, as a
//! percentage (`allocationPercentage`); see [`Fte`].

mod allocation;
mod employee;
mod fte;
mod page;
mod project;
mod skill;

pub use allocation::*;
pub use employee::*;
pub use fte::{Fte, FTE_EPSILON};
pub use page::*;
pub use project::*;
pub use skill::{CreateSkillInput, Skill, SkillRef, UpdateSkillInput};

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::validation::Validate;

/// The four collections managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Project,
    Allocation,
    Skill,
}

impl EntityKind {
    /// Collection path segment on the remote API.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Employee => "employees",
            Self::Project => "projects",
            Self::Allocation => "allocations",
            Self::Skill => "skills",
        }
    }

    /// Singular noun used in messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Project => "project",
            Self::Allocation => "allocation",
            Self::Skill => "skill",
        }
    }
}

/// A record kind held in a [`crate::store::Store`].
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned {
    type Create: Clone + Debug + Serialize + Validate;
    type Update: Clone + Debug + Serialize + Validate;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;
}

impl Entity for Employee {
    type Create = CreateEmployeeInput;
    type Update = UpdateEmployeeInput;

    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Project {
    type Create = CreateProjectInput;
    type Update = UpdateProjectInput;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Allocation {
    type Create = CreateAllocationInput;
    type Update = UpdateAllocationInput;

    const KIND: EntityKind = EntityKind::Allocation;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Skill {
    type Create = CreateSkillInput;
    type Update = UpdateSkillInput;

    const KIND: EntityKind = EntityKind::Skill;

    fn id(&self) -> Uuid {
        self.id
    }
}
