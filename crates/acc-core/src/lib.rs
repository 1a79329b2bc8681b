//! Core types, classification rules and report assembly for the
//! account-creation tool's per-user statistics page.
//!
//! This crate has no HTTP or database dependencies. Storage backends and the
//! API layer depend on it; it describes the data it needs through the traits
//! in [`collab`].

#![allow(async_fn_in_trait)]

pub mod audit;
pub mod classify;
pub mod collab;
pub mod error;
pub mod event;
pub mod identification;
pub mod linkage;
pub mod permission;
pub mod report;
pub mod rules;
pub mod summary;
pub mod user;

pub use error::{Collaborator, Error, Result};
pub use report::{AssembleOptions, ReportAssembler, UserReport};

#[cfg(test)]
mod tests;
