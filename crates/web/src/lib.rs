//! Server-rendered front end for the Costs to Expect API.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
