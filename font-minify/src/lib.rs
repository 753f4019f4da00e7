//! Shrink the web fonts shipped with a built single-page application.
//!
//! The pipeline walks the static assets of a project (markup, stylesheets,
//! scripts, templates and JSON data), collects every character and icon name
//! the assets can render, and subsets each referenced font down to the glyphs
//! that are actually reachable:
//!
//! - [`codepoints`] loads the icon name → code point table used to resolve
//!   ligature icon names such as `home`.
//! - [`walk`] and [`extract`] enumerate assets and collect usage into a
//!   [`usage::Usage`] run context.
//! - [`glyph`] and [`resolve`] turn that usage into the set of glyph
//!   identifiers present in a given font.
//! - [`driver`], [`font`], [`woff`] and [`subset`] load, subset and save each
//!   font in place.
//!
//! [`pipeline::run`] chains all of these together.

#![forbid(unsafe_code)]

pub mod codepoints;
pub mod driver;
mod error;
pub mod extract;
pub mod font;
pub mod glyph;
pub mod pipeline;
pub mod resolve;
pub mod subset;
pub mod usage;
pub mod walk;
pub mod woff;

pub use error::Error;
pub use pipeline::{run, Options};
