//! perfscope: trading performance analysis for exported trade records.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete readers and writers in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
