pub mod account;
pub mod auth;
pub mod classes;
pub mod disciplines;
pub mod groups;
pub mod professors;
pub mod projects;
pub mod students;
pub mod tasks;
