//! Command implementations

pub mod cache;
pub mod completions;
pub mod config;
pub mod hotels;
pub mod intent;
pub mod recommend;
pub mod search;
pub mod suggest;
