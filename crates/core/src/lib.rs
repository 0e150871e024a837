//! `costs-core` — shared building blocks for the web front end.
//!
//! This crate is intentionally free of HTTP and session concerns: it names the
//! routes of the application and models the pagination headers returned by the
//! upstream API.

pub mod pagination;
pub mod route;

pub use pagination::{PAGINATION_HEADERS, Pagination};
pub use route::{Route, is_valid_identifier};
