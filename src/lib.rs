//! Resource allocation core for a staffing console.
//!
//! - [`models`]: employees, projects, skills and allocations as they travel on the wire
//! - [`capacity`]: FTE and availability, computed from allocations on every read
//! - [`skills`]: which skills an allocation may carry for a given project
//! - [`store`]: cached, remote-backed collections with last-write-wins reads
//! - [`query`]: search, filters, quick filters, sort and paging
//! - [`client`]: the HTTP remote
//! - [`analytics`]: roster-wide utilization reports

pub mod analytics;
pub mod capacity;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod skills;
pub mod store;
pub mod validation;
