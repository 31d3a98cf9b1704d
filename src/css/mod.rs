//! Stylesheets and media queries.

mod media;
mod stylesheet;

pub use media::{ColorScheme, MediaQueryList, MediaType, Viewport};
pub use stylesheet::{CssRule, MediaRule, StyleRule, Stylesheet};
