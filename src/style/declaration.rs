//! CSSOM-style entry points over [`resolve_style`].

use super::cascade::resolve_style;
use super::property_manager::PropertyManager;
use crate::dom::{ArenaDom, ArenaNodeId};
use crate::error::Result;

/// `getComputedStyle(element)`.
pub fn get_computed_style(dom: &ArenaDom, element: ArenaNodeId) -> Result<PropertyManager> {
    resolve_style(dom, element, true)
}

/// `element.style`: the declarations of the inline `style` attribute.
pub fn element_style(dom: &ArenaDom, element: ArenaNodeId) -> Result<PropertyManager> {
    resolve_style(dom, element, false)
}

/// `element.style.setProperty(name, value, priority)`.
///
/// Rewrites the `style` attribute from the updated declarations. An empty
/// value removes the property.
pub fn set_inline_property(
    dom: &mut ArenaDom,
    element: ArenaNodeId,
    name: &str,
    value: &str,
    important: bool,
) -> Result<()> {
    let mut style = element_style(dom, element)?;
    style.set_property(name, value, important);
    write_inline_style(dom, element, &style)
}

/// `element.style.removeProperty(name)`, returning the removed value.
pub fn remove_inline_property(
    dom: &mut ArenaDom,
    element: ArenaNodeId,
    name: &str,
) -> Result<Option<String>> {
    let mut style = element_style(dom, element)?;
    let Some(removed) = style.remove_property(name) else {
        return Ok(None);
    };
    write_inline_style(dom, element, &style)?;
    Ok(Some(removed.value))
}

fn write_inline_style(dom: &mut ArenaDom, element: ArenaNodeId, style: &PropertyManager) -> Result<()> {
    if style.is_empty() {
        dom.remove_attr(element, "style")?;
        return Ok(());
    }
    dom.set_attr(element, "style", &style.css_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_inline_property_writes_attribute() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[("style", "color: red")]);
        dom.append(dom.document(), p);

        set_inline_property(&mut dom, p, "Margin", "0", true).unwrap();
        assert_eq!(dom.get_attr(p, "style"), Some("color: red; margin: 0 !important;"));
        assert_eq!(element_style(&dom, p).unwrap().get_property_priority("margin"), "important");

        set_inline_property(&mut dom, p, "color", "blue", false).unwrap();
        assert_eq!(get_computed_style(&dom, p).unwrap().get_property_value("color"), "blue");
    }

    #[test]
    fn test_remove_inline_property() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[("style", "color: red; margin: 0")]);
        dom.append(dom.document(), p);

        assert_eq!(remove_inline_property(&mut dom, p, "color").unwrap(), Some("red".into()));
        assert_eq!(dom.get_attr(p, "style"), Some("margin: 0;"));
        assert_eq!(remove_inline_property(&mut dom, p, "color").unwrap(), None);

        remove_inline_property(&mut dom, p, "margin").unwrap();
        assert_eq!(dom.get_attr(p, "style"), None);
    }

    #[test]
    fn test_element_style_without_attribute() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[]);
        assert!(element_style(&dom, p).unwrap().is_empty());
        // Disconnected elements still expose their inline declarations.
        dom.set_attr(p, "style", "color: red").unwrap();
        assert_eq!(element_style(&dom, p).unwrap().len(), 1);
        assert!(get_computed_style(&dom, p).unwrap().is_empty());
    }
}
