//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Link`] - A tracking link and its preview metadata
//! - [`Click`] - One recorded human click
//! - [`ClickSummary`] - Aggregated counters for one link
//!
//! Creation inputs live next to their entity (`NewLink`, `NewClick`); the
//! store assigns ids and timestamps.

pub mod click;
pub mod link;
pub mod summary;

pub use click::{Click, NewClick, UNKNOWN_COUNTRY};
pub use link::{Link, LinkPreview, NewLink};
pub use summary::ClickSummary;
