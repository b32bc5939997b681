//! Core library components.
//!
//! The reference parser, grouping, fetching, environment composition and
//! launch strategies, plus the secret store clients they talk to.

pub mod compose;
pub mod config;
pub mod constants;
pub mod fetch;
pub mod group;
pub mod launch;
pub mod plan;
pub mod reference;
pub mod store;
