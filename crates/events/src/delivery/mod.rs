//! External delivery channels.

pub mod email;
