pub mod artifact;
pub mod experience;
pub mod followup;
pub mod questions;
pub mod trajectory;
