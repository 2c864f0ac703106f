//! Concrete implementations of the domain's ports.

pub mod memory;
pub mod sqlite;
pub mod web;
