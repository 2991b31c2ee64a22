//! Query shapes for the behavioral query core
//!
//! Each function returns a [`BuiltQuery`] for a given dialect. The repositories
//! only bind and execute; no backend builds SQL of its own for these shapes.

pub mod boundary;
pub mod builder;
pub mod identity;
pub mod stickiness;
pub mod volume;

pub use builder::{BuiltQuery, ConditionBuilder, QueryParam};
