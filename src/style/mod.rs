//! Style resolution: declaration storage, inheritance and the cascade.
//!
//! - [`PropertyManager`] stores the declarations of one block
//! - [`resolve_style`] computes an element's style across shadow boundaries
//! - [`get_computed_style`] and friends mirror the CSSOM entry points

mod cascade;
mod declaration;
mod inherited;
mod property_manager;

pub use cascade::{CascadeWalk, MatchedStyle, collect_matched_styles, resolve_style};
pub use declaration::{element_style, get_computed_style, remove_inline_property, set_inline_property};
pub use inherited::{INHERITED_PROPERTIES, is_inherited};
pub use property_manager::{PropertyManager, PropertyValue};
