//! # Congregation Common Library
//!
//! Shared code for the congregation schedule import service:
//! - Error types
//! - Configuration loading (TOML + environment)
//! - Roster Index (name → publicador id resolution)
//! - Portuguese free-text date normalization
//! - Family/crew name splitting

pub mod config;
pub mod date_pt;
pub mod error;
pub mod names;
pub mod roster;

pub use date_pt::{parse_portuguese_date, DateNormalizer, NormalizedDate};
pub use error::{Error, Result};
pub use names::split_family_names;
pub use roster::{NameMatcher, RosterEntry, RosterIndex, SimilarityMatcher};
