#![forbid(unsafe_code)]

//! Style vocabulary for vizhost decorations.
//!
//! # This crate provides
//! - [`Hsl`] and [`heat_color`], the cold-to-hot heat map.
//! - [`DecorationClassCache`], the per-pass color to CSS class mapping
//!   and the style sheet text it produces.
//!
//! Nothing here touches the host; widgets hand the produced class names
//! to the editor and the sheet text to a host style sheet.

/// Heat map colors.
pub mod heat;
/// Per-pass CSS classes for decoration colors.
pub mod rules;

pub use heat::{Hsl, heat_color, resolve_color};
pub use rules::{DEFAULT_DECORATION_OPACITY, DecorationClassCache, StyleRule};
