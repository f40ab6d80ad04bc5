use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use staffing_console::analytics::utilization_report_with_roster;
use staffing_console::capacity::{overallocation_windows, today, Roster};
use staffing_console::client::{HttpClient, HttpRemote};
use staffing_console::config::Config;
use staffing_console::models::*;
use staffing_console::query::{Combinator, QueryState, QuickFilter};
use staffing_console::skills::SkillResolver;
use staffing_console::store::{Outcome, Store};

#[derive(Parser)]
#[command(name = "staffctl")]
#[command(about = "Staffing console: employees, projects and allocations from the command line")]
struct Cli {
    /// Base URL of the staffing API
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Paging {
    /// Sort as `field` or `field,asc|desc`
    #[arg(long)]
    sort: Option<String>,

    /// Page index, starting at 0
    #[arg(long, default_value = "0")]
    page: u32,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    size: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// List employees
    Employees {
        /// Free-text search over name, email and employee id
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// ACTIVE, INACTIVE or ON_LEAVE
        #[arg(long)]
        status: Option<String>,
        /// all, bench, allocated or overallocated
        #[arg(short, long, default_value = "all")]
        quick: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// List projects
    Projects {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[command(flatten)]
        paging: Paging,
    },
    /// List allocations
    Allocations {
        #[arg(long)]
        employee: Option<Uuid>,
        #[arg(long)]
        project: Option<Uuid>,
        #[command(flatten)]
        paging: Paging,
    },
    /// Utilization report for the whole roster
    Utilization {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Skills that may be assigned on a project
    Skills { project_id: Uuid },
    /// Periods in which an employee is over-allocated
    Windows { employee_id: Uuid },
}

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "staffing_console=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

struct Console {
    client: HttpClient,
    combinator: Combinator,
    page_size: u32,
}

impl Console {
    fn store<E: Entity>(&self) -> Store<E, HttpRemote<E>> {
        Store::new(self.client.remote())
    }

    fn query_state(&self, paging: &Paging) -> Result<QueryState> {
        let mut state = QueryState::new(paging.size.unwrap_or(self.page_size));
        if let Some(ref sort) = paging.sort {
            let sort = Sort::parse(sort).ok_or_else(|| anyhow!("Invalid sort: {sort}"))?;
            state.set_sort(Some(sort));
        }
        Ok(state)
    }

    /// Everything in a collection, up to the broad fetch size.
    async fn fetch_all<E: Entity>(&self) -> Result<Vec<E>> {
        let outcome = self
            .store::<E>()
            .list(ListQuery::paged(0, self.combinator.broad_fetch_size()))
            .await;
        Ok(data(outcome, E::KIND.path())?.items)
    }
}

fn data<T>(outcome: Outcome<T>, what: &str) -> Result<T> {
    outcome
        .into_result()
        .with_context(|| format!("Failed to load {what}"))?
        .ok_or_else(|| anyhow!("No data returned for {what}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn print_page<T: Serialize>(page: &Page<T>, state: &QueryState) -> Result<()> {
    print_json(&json!({
        "page": state.page(),
        "pageSize": state.page_size(),
        "totalPages": state.total_pages(),
        "totalElements": page.total,
        "content": page.items,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    tracing::debug!(base_url = %config.base_url, "Using staffing API");

    let console = Console {
        client: HttpClient::from_config(&config).context("Failed to build HTTP client")?,
        combinator: Combinator::new(config.broad_fetch_size),
        page_size: config.page_size,
    };

    match cli.command {
        Commands::Employees {
            search,
            department,
            status,
            quick,
            paging,
        } => {
            let quick = QuickFilter::from_str(&quick)
                .ok_or_else(|| anyhow!("Unknown quick filter: {quick}"))?;
            let mut state = console.query_state(&paging)?;
            state.set_search(search.unwrap_or_default());
            state.set_filter("department", department.unwrap_or_default());
            if let Some(status) = status {
                let status = EmployeeStatus::from_str(&status)
                    .ok_or_else(|| anyhow!("Unknown employee status: {status}"))?;
                state.set_filter("status", status.as_str());
            }
            state.set_quick_filter(quick);
            let mut state = state.with_page(paging.page);

            let employees = console.store::<Employee>();
            let allocations = console.store::<Allocation>();
            let projects = console.store::<Project>();
            let outcome = console
                .combinator
                .run_employees(&employees, &allocations, &projects, &mut state, today())
                .await;
            print_page(&data(outcome, "employees")?, &state)?;
        }
        Commands::Projects {
            search,
            status,
            priority,
            paging,
        } => {
            let mut state = console.query_state(&paging)?;
            state.set_search(search.unwrap_or_default());
            if let Some(status) = status {
                let status = ProjectStatus::from_str(&status)
                    .ok_or_else(|| anyhow!("Unknown project status: {status}"))?;
                state.set_filter("status", status.as_str());
            }
            if let Some(priority) = priority {
                let priority = ProjectPriority::from_str(&priority)
                    .ok_or_else(|| anyhow!("Unknown project priority: {priority}"))?;
                state.set_filter("priority", priority.as_str());
            }
            let mut state = state.with_page(paging.page);

            let outcome = console
                .combinator
                .run(&console.store::<Project>(), &mut state)
                .await;
            print_page(&data(outcome, "projects")?, &state)?;
        }
        Commands::Allocations {
            employee,
            project,
            paging,
        } => {
            let mut state = console.query_state(&paging)?;
            if let Some(employee) = employee {
                state.set_filter("employeeId", employee.to_string());
            }
            if let Some(project) = project {
                state.set_filter("projectId", project.to_string());
            }
            let mut state = state.with_page(paging.page);

            let outcome = console
                .combinator
                .run(&console.store::<Allocation>(), &mut state)
                .await;
            print_page(&data(outcome, "allocations")?, &state)?;
        }
        Commands::Utilization { as_of } => {
            let as_of = as_of.unwrap_or_else(today);
            let employees: Vec<Employee> = console.fetch_all().await?;
            let projects: Vec<Project> = console.fetch_all().await?;
            let allocations: Vec<Allocation> = console.fetch_all().await?;
            tracing::info!(
                employees = employees.len(),
                projects = projects.len(),
                allocations = allocations.len(),
                %as_of,
                "Building utilization report"
            );

            let roster = Roster::from_entities(&employees, &projects);
            let report = utilization_report_with_roster(&employees, &allocations, &roster, as_of);
            print_json(&report)?;
        }
        Commands::Skills { project_id } => {
            let project = data(console.store::<Project>().get(project_id).await, "project")?;
            let resolver = SkillResolver::new(console.fetch_all().await?);
            print_json(&resolver.available_skills_for(&project))?;
        }
        Commands::Windows { employee_id } => {
            let employee = data(console.store::<Employee>().get(employee_id).await, "employee")?;
            let query = ListQuery::paged(0, console.combinator.broad_fetch_size())
                .with_filter("employeeId", employee_id.to_string());
            let allocations = data(console.store::<Allocation>().list(query).await, "allocations")?;
            let projects: Vec<Project> = console.fetch_all().await?;
            let roster = Roster::new([employee.id], projects.iter().map(|p| p.id));
            let allocations = roster.retain_valid(&allocations.items);
            print_json(&json!({
                "employeeId": employee.id,
                "maxFTE": employee.max_fte,
                "windows": overallocation_windows(&employee, &allocations),
            }))?;
        }
    }

    Ok(())
}
