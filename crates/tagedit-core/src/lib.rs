//! tagedit-core library.
//!
//! Control logic for the tag edit dialog: rename a tag, validate the name on
//! every change, submit the update through the entity store, surface store
//! errors on the form, and hand deletion off to a confirmation dialog.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library errors, `anyhow::Result` for
//!   config loading and the CLI.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod controller;
pub mod desk;
pub mod dialog;
pub mod error;
pub mod form;
pub mod model;
pub mod sanitize;
pub mod scenario;
pub mod session;
pub mod store;
pub mod validate;

pub use controller::{ControllerSnapshot, EditDialogController, Phase};
pub use session::{DialogEvent, EditSession, Effect};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeDoctests;
