//! Core of the xcal calendar inspector.
//!
//! This crate provides:
//! - `document`: reading, validating and writing .ics files
//! - `store`, `tree`, `selection`, `undo`: the visibility engine behind an open file
//! - `pipeline`: the external transformation tool protocol
//! - `persistence`: optional storage of events and to-dos
//! - `session`: the context object tying these together

pub mod component;
pub mod config;
pub mod document;
pub mod error;
pub mod persistence;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod store;
pub mod tree;
pub mod undo;

pub use component::{ComponentDetail, ComponentKind, ComponentRecord};
pub use error::{XcalError, XcalResult};
pub use session::Session;
pub use store::{ComponentStore, Visibility};
