//! Concrete strategy implementations of the [`crate::strategy::Strategy`]
//! trait.

pub mod grid;
