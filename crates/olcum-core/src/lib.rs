//! Chimney × parameter matrix editing for environmental measurement records.
//!
//! [`matrix`] holds the shared model, counters and payload conversion. The
//! creation [`wizard`] and the [`edit`] session are the two adapters built on
//! it; [`view`] turns either one's matrix into keyed controls.

pub mod common;
pub mod domain;
pub mod edit;
pub mod matrix;
pub mod page;
pub mod remote;
pub mod view;
pub mod wizard;
