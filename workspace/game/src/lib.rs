//! Core of the pet game: the stat engine, the session gate and the
//! character store.

pub mod auth;
pub mod error;
pub mod roster;
pub mod sessions;
pub mod stats;

#[cfg(test)]
mod testing;

pub use error::{GameError, Result};
