//! Value objects

pub mod principal;

pub use principal::Principal;
