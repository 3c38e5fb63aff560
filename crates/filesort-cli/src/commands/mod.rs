pub mod auth;
pub mod classify;
pub mod completions;
pub mod config;
pub mod history;
pub mod remind;
pub mod reorganize;
pub mod stats;
