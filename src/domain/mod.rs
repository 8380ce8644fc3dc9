//! Core domain types and logic.

pub mod config;
pub mod datetime;
pub mod error;
pub mod frame;
pub mod header_score;
pub mod input;
pub mod metrics;
pub mod normalize;
pub mod returns;
pub mod session;
pub mod trade;
