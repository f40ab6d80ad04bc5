#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use staffing_console::error::RemoteError;
use staffing_console::models::*;
use staffing_console::store::Remote;
use tokio::sync::oneshot;
use uuid::Uuid;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

pub fn skill(name: &str) -> Skill {
    Skill {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: "Engineering".to_string(),
    }
}

pub fn employee(name: &str, max_fte: f64) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        employee_id: format!("EMP-{}", &name.to_uppercase()),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        department: "Engineering".to_string(),
        designation: "Engineer".to_string(),
        status: EmployeeStatus::Active,
        max_fte: Fte::new(max_fte),
        skills: Vec::new(),
    }
}

pub fn project(name: &str, tech_stack: &[Skill]) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
        client: "Acme".to_string(),
        description: None,
        status: ProjectStatus::InProgress,
        priority: ProjectPriority::Medium,
        start_date: None,
        end_date: None,
        tech_stack: tech_stack.to_vec(),
    }
}

pub fn allocation(employee: &Employee, project: &Project, fte: f64, start: &str, end: Option<&str>) -> Allocation {
    Allocation {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        project_id: project.id,
        fte: Fte::new(fte),
        role: "Developer".to_string(),
        start_date: date(start),
        end_date: end.map(date),
        billable: true,
        assigned_skills: Vec::new(),
        status: None,
    }
}

pub fn create_input(employee: &Employee, project: &Project, fte: f64, start: &str, end: Option<&str>) -> CreateAllocationInput {
    CreateAllocationInput {
        employee_id: employee.id,
        project_id: project.id,
        fte: Fte::new(fte),
        role: "Developer".to_string(),
        start_date: date(start),
        end_date: end.map(date),
        billable: true,
        assigned_skills: Vec::new(),
    }
}

pub fn create_employee_input(name: &str) -> CreateEmployeeInput {
    CreateEmployeeInput {
        employee_id: format!("EMP-{}", name.to_uppercase()),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        department: "Engineering".to_string(),
        designation: "Engineer".to_string(),
        status: EmployeeStatus::Active,
        max_fte: Fte::FULL,
        skills: Vec::new(),
    }
}

/// Entities the in-memory remote knows how to materialize.
pub trait Fake: Entity {
    fn build(input: &Self::Create) -> Self;
    fn apply(&mut self, patch: &Self::Update);
}

impl Fake for Employee {
    fn build(input: &CreateEmployeeInput) -> Self {
        Employee {
            id: Uuid::new_v4(),
            employee_id: input.employee_id.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            department: input.department.clone(),
            designation: input.designation.clone(),
            status: input.status,
            max_fte: input.max_fte,
            skills: Vec::new(),
        }
    }

    fn apply(&mut self, patch: &UpdateEmployeeInput) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref department) = patch.department {
            self.department = department.clone();
        }
        if let Some(max_fte) = patch.max_fte {
            self.max_fte = max_fte;
        }
    }
}

impl Fake for Allocation {
    fn build(input: &CreateAllocationInput) -> Self {
        Allocation {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            project_id: input.project_id,
            fte: input.fte,
            role: input.role.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            billable: input.billable,
            assigned_skills: input.assigned_skills.clone(),
            status: None,
        }
    }

    fn apply(&mut self, patch: &UpdateAllocationInput) {
        if let Some(fte) = patch.fte {
            self.fte = fte;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(ref skills) = patch.assigned_skills {
            self.assigned_skills = skills.clone();
        }
    }
}

impl Fake for Project {
    fn build(input: &CreateProjectInput) -> Self {
        Project {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            client: input.client.clone(),
            description: input.description.clone(),
            status: input.status,
            priority: input.priority,
            start_date: input.start_date,
            end_date: input.end_date,
            tech_stack: Vec::new(),
        }
    }

    fn apply(&mut self, patch: &UpdateProjectInput) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

type Gate<E> = oneshot::Receiver<Result<Page<E>, RemoteError>>;

/// In-memory remote. List calls can be gated so a test decides when, and in
/// which order, they resolve.
pub struct FakeRemote<E> {
    pub items: Mutex<Vec<E>>,
    gates: Mutex<VecDeque<Gate<E>>>,
    fail_with: Mutex<Option<RemoteError>>,
    stalled: AtomicBool,
    pub list_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl<E: Fake> FakeRemote<E> {
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items: Mutex::new(items),
            gates: Mutex::new(VecDeque::new()),
            fail_with: Mutex::new(None),
            stalled: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    /// The next list call waits for a value sent on the returned channel.
    pub fn gate(&self) -> oneshot::Sender<Result<Page<E>, RemoteError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Every subsequent call fails with `error`.
    pub fn fail_with(&self, error: RemoteError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    /// Subsequent calls succeed again.
    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    /// Writes never complete, as if the server stopped answering.
    pub fn stall_writes(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    async fn write_started(&self) {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Result<(), RemoteError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn position(&self, id: Uuid) -> Result<usize, RemoteError> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| RemoteError::rejected(404, "Not found"))
    }
}

impl<E: Fake> Remote<E> for FakeRemote<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(rx) = gate {
            return rx
                .await
                .unwrap_or_else(|_| Err(RemoteError::Transport("gate dropped".into())));
        }
        self.failure()?;

        let items = self.items.lock().unwrap().clone();
        let total = items.len() as u64;
        let page = query.page.unwrap_or(0) as usize;
        let size = query.size.map(|s| s as usize).unwrap_or(items.len());
        let rows = items.into_iter().skip(page * size).take(size).collect();
        Ok(Page::new(rows, total))
    }

    async fn get(&self, id: Uuid) -> Result<E, RemoteError> {
        self.failure()?;
        let index = self.position(id)?;
        Ok(self.items.lock().unwrap()[index].clone())
    }

    async fn create(&self, input: &E::Create) -> Result<E, RemoteError> {
        self.write_started().await;
        self.failure()?;
        let entity = E::build(input);
        self.items.lock().unwrap().insert(0, entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: Uuid, input: &E::Update) -> Result<E, RemoteError> {
        self.write_started().await;
        self.failure()?;
        let index = self.position(id)?;
        let mut items = self.items.lock().unwrap();
        items[index].apply(input);
        Ok(items[index].clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError> {
        self.write_started().await;
        self.failure()?;
        let index = self.position(id)?;
        self.items.lock().unwrap().remove(index);
        Ok(())
    }
}
