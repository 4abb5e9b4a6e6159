//! # Stopclock Core Library
//!
//! This library provides the core logic for Stopclock, a persistent
//! minutes:seconds stopwatch. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary; any GUI surface is
//! a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Stopwatch**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()` while running
//! - **Storage**: SQLite-backed key-value persistence for the stopwatch
//!   snapshot and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Stopwatch`]: Core stopwatch state machine
//! - [`StopwatchStore`]: Snapshot persistence and restoration
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use storage::{Config, Database, StopwatchStore};
pub use timer::{Snapshot, Stopwatch, MIN_FOLD_INTERVAL_MS};
