//! Fin-Snap library
//!
//! Orchestration core (key store, output sections, provider adapters,
//! search controller) plus the terminal UI built on top of it.

pub mod event;
pub mod keys;
pub mod logging;
pub mod provider;
pub mod search;
pub mod sections;
pub mod storage;
pub mod tui;
