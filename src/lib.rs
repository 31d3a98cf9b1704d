//! # shade
//!
//! Computed CSS style resolution for HTML documents with shadow DOM.
//!
//! ## Features
//!
//! - Parse HTML into an arena DOM, including declarative shadow roots
//! - Match `<style>` sheets and `@media` rules against a configurable viewport
//! - Scope each sheet to the tree it lives in: document sheets never reach
//!   into shadow trees and shadow sheets never leak out
//! - Inherit the inheritable properties from ancestors, across shadow hosts
//!
//! ## Quick Start
//!
//! ```
//! use shade::dom::parse_html;
//! use shade::style::get_computed_style;
//!
//! let dom = parse_html(r#"
//!     <style>body { color: navy } p { margin: 0 }</style>
//!     <body><p id="intro" style="font-size: 12px">Hello</p></body>
//! "#);
//! let intro = dom.get_element_by_id(dom.document(), "intro").unwrap();
//!
//! let style = get_computed_style(&dom, intro).unwrap();
//! assert_eq!(style.get_property_value("color"), "navy");
//! assert_eq!(style.get_property_value("margin"), "0");
//! assert_eq!(style.get_property_value("font-size"), "12px");
//! ```
//!
//! ## Shadow DOM
//!
//! ```
//! use shade::dom::parse_html;
//! use shade::style::get_computed_style;
//!
//! let dom = parse_html(r#"
//!     <style>span { color: red }</style>
//!     <div id="host" style="font-weight: bold">
//!       <template shadowrootmode="open">
//!         <style>span { text-decoration: underline }</style>
//!         <span id="inner">shadowed</span>
//!       </template>
//!     </div>
//! "#);
//! let host = dom.get_element_by_id(dom.document(), "host").unwrap();
//! let root = dom.shadow_root(host).unwrap();
//! let inner = dom.get_element_by_id(root, "inner").unwrap();
//!
//! let style = get_computed_style(&dom, inner).unwrap();
//! assert_eq!(style.get_property_value("color"), "");
//! assert_eq!(style.get_property_value("text-decoration"), "underline");
//! assert_eq!(style.get_property_value("font-weight"), "bold");
//! ```

pub mod css;
pub mod dom;
mod error;
pub mod style;

pub use css::{Stylesheet, Viewport};
pub use dom::{ArenaDom, ArenaNodeId, parse_html};
pub use error::{Error, Result};
pub use style::{PropertyManager, PropertyValue, resolve_style};
