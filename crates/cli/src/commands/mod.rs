//! CLI Commands

pub mod clean;
pub mod email;
pub mod report;
