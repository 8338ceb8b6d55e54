#![forbid(unsafe_code)]

//! Core primitives for sheetkit.
//!
//! This crate provides:
//! - [`geometry`]: point-space [`Point`], [`Size`], [`Rect`], and [`EdgeInsets`]
//! - [`gesture`]: the immutable [`GestureSample`] record delivered by a host drag recognizer
//! - [`color`]: the [`Rgba`] color used for backdrop dimming
//!
//! Time values use [`web_time`] so the crates build for wasm hosts as well as
//! native ones.

pub mod color;
pub mod geometry;
pub mod gesture;

pub use color::Rgba;
pub use geometry::{EdgeInsets, Point, Rect, Size};
pub use gesture::GestureSample;

pub use web_time::{Duration, Instant};
