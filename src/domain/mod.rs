//! Domain layer containing business entities and rules.
//!
//! # Architecture
//!
//! - [`entities`] - Links, clicks, and click summaries
//! - [`repositories`] - Storage trait definitions
//! - [`crawler`] - Pluggable bot/crawler classification
//! - [`platform`] - Platform tagging from destination hosts
//!
//! The domain layer does not depend on infrastructure or presentation
//! layers. Storage backends implement the repository traits in
//! `crate::infrastructure::persistence`.
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves the short code
//! 2. [`crawler::CrawlerDetector`] classifies the user agent
//! 3. Human clicks go through [`crate::application::services::ClickService`],
//!    which writes to the primary store and falls back to the in-memory store
//! 4. [`crate::application::services::StatsService`] merges both stores

pub mod crawler;
pub mod entities;
pub mod platform;
pub mod repositories;
