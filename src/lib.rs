//! Campaign image generator - plans six pose directives from a master
//! prompt, then synthesizes six composite campaign images that keep a hero
//! subject and a selling item visually consistent across all shots.
//!
//! The interesting part is the orchestration layer: provider client,
//! retry/backoff for transient failures, error normalization, and the
//! concurrent fan-out with partial-failure aggregation.

pub mod ai;
pub mod app;
pub mod campaign;
pub mod error;
pub mod models;
pub mod prompts;
pub mod retry;

pub use error::{Error, ErrorKind, Result};
