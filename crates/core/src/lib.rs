//! Domain rules for the academic project manager.
//!
//! Everything here is pure: callers load rows, pass facts in and get back
//! either a plan to apply or a [`error::CoreError`].

pub mod account;
pub mod classes;
pub mod consolidation;
pub mod error;
pub mod group;
pub mod pagination;
pub mod roles;
pub mod task;
pub mod types;
