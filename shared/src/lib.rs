//! Shared types, session lifecycle, and format resolution for Vidgrab.
pub mod cleanup;
pub mod errors;
pub mod format_resolver;
pub mod models;
pub mod session_store;
pub mod youtube_url;
