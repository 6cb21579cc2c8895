//! Multi-day workshop schedule block for a headless-CMS field.
//!
//! The block edits a nested day → item document through an explicit
//! view-model tree ([`editor::ScheduleEditor`]), migrates the legacy
//! single-day shape, and moves schedules between blocks through a versioned
//! export envelope.

pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod host;
pub mod sanitize;
pub mod schedule;
pub mod transfer;
pub mod web;

pub use error::{Error, Result};
