#![deny(missing_docs)]
//! Anime Lookup Bot
//!
//! A Telegram bot that searches the Jikan (MyAnimeList) catalog, lets the
//! user pick a title from an inline keyboard and replies with a formatted
//! card, hiding mature material.

/// Telegram bot implementation
pub mod bot;
/// Anime catalog client
pub mod catalog;
/// Configuration management
pub mod config;
/// Mature content classification
pub mod content_filter;
/// Token-redacting log output
pub mod logging;
/// Dispatcher wiring and the process-wide error boundary
pub mod runner;
/// Text helpers
pub mod utils;
