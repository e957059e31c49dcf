// Job listing engine: filter, sort, paginate.
// Pure and synchronous; fetching belongs to `source`, and handlers glue the two.

pub mod categories;
pub mod filters;
pub mod handlers;
pub mod materialize;
pub mod pagination;
pub mod query;
pub mod session;
pub mod sorting;

pub use materialize::DEFAULT_ITEMS_PER_PAGE;
