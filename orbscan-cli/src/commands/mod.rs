//! CLI command implementations.

pub mod common;
pub mod inspect;
pub mod simulate;
