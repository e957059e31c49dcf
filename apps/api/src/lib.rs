//! Job listing service: a pure filter/sort/paginate engine over job postings,
//! plus the HTTP surface and job sources around it.

pub mod config;
pub mod errors;
pub mod listing;
pub mod models;
pub mod routes;
pub mod source;
pub mod state;
pub mod visitors;
