//! Row types and DTOs, one module per table family.
//!
//! Row structs serialize with the API's Portuguese field names; credential
//! and bookkeeping columns are never serialized.

pub mod class;
pub mod discipline;
pub mod group;
pub mod professor;
pub mod project;
pub mod student;
pub mod task;
