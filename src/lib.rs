//! Headless user preferences panel: notification and theme settings with
//! validation, debounced auto-save against a flaky backend, and a page-wide
//! theme persisted to local storage.

pub mod config;
pub mod debounce;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod panel;
pub mod storage;
pub mod theme;
pub mod web;
