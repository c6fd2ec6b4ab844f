//! Foundation types and traits for wmibar.
//!
//! This crate contains the backend-agnostic types shared by all wmibar
//! crates: colors, geometry, font specs, native window events, the drawing
//! backend trait, and error types.

pub mod backend;
pub mod color;
pub mod error;
pub mod font;
pub mod geometry;
pub mod input;
