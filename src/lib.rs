//! Blogicum - a small blog publishing platform
//!
//! Users write posts filed under categories and optionally tagged with a
//! location; other users read and comment on them. This library holds
//! everything except process startup, so the HTTP tests can build the app.

pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;
