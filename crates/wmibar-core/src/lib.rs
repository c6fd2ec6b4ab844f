//! wmibar core.
//!
//! Platform-agnostic bar logic: the control dispatcher, item allocation,
//! the item registry and layout engine, the render pipeline, and input
//! routing. Drawing and windowing go through
//! [`wmibar_types::backend::BarBackend`]; this crate has no platform
//! dependencies.

// Re-exports from wmibar-types (foundation types and traits).
pub use wmibar_types::backend;
pub use wmibar_types::color;
pub use wmibar_types::error;
pub use wmibar_types::font;
pub use wmibar_types::geometry;
pub use wmibar_vfs as vfs;

pub mod bar;
pub mod config;
pub mod ctl;
pub mod input;
pub mod item;
pub mod layout;
pub mod render;
pub mod spawn;

#[cfg(test)]
mod test_utils;

pub use bar::{Bar, Hook};
pub use config::BarConfig;
pub use spawn::{ShellSpawner, Spawner};
