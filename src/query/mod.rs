//! Query combinator: turns search, filters, quick filter, sort and paging
//! into one deterministic result page.
//!
//! # Two paths
//!
//! - **Remote**: only equality filters, sort and paging are active. They are
//!   sent to the server as-is and the server's page is the result.
//! - **Local**: a quick filter or a free-text search is active. Neither can be
//!   expressed as a remote equality filter, so a broad page (up to
//!   `broad_fetch_size` rows) is fetched and the whole pipeline runs in
//!   memory. The cost is one large read per resolution; the result is exact
//!   as long as the collection fits in the broad page.

mod filter;
mod plan;
mod state;

pub use filter::*;
pub use plan::{Combinator, QueryPlan, DEFAULT_BROAD_FETCH_SIZE};
pub use state::{total_pages, QueryState, QuickFilter, DEFAULT_PAGE_SIZE};
