//! Declaration block storage.
//!
//! A [`PropertyManager`] holds the declarations of one declaration block in
//! insertion order, keyed by property name. It is built by parsing raw
//! declaration text (`color: red; font-size: 12px !important`) and is what
//! style resolution hands back to callers.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, Delimiter, ParseError, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, parse_important,
};
use indexmap::IndexMap;

/// Value and priority of a single declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyValue {
    pub value: String,
    pub important: bool,
}

impl PropertyValue {
    pub fn new(value: impl Into<String>, important: bool) -> Self {
        Self {
            value: value.into(),
            important,
        }
    }
}

/// Ordered map of property name to [`PropertyValue`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PropertyManager {
    properties: IndexMap<String, PropertyValue>,
}

impl PropertyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse declaration text. Invalid declarations are skipped.
    pub fn from_css_text(css_text: &str) -> Self {
        let mut manager = Self::new();
        let mut input = ParserInput::new(css_text);
        let mut parser = Parser::new(&mut input);
        let mut decl_parser = DeclarationListParser;

        for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
            match result {
                Ok((name, value)) => manager.insert_parsed(name, value),
                Err((_, slice)) => log::trace!("skipped declaration: {}", slice.trim()),
            }
        }
        manager
    }

    /// Cascade one parsed declaration into the block: an important value is
    /// only displaced by another important value.
    fn insert_parsed(&mut self, name: String, value: PropertyValue) {
        if let Some(existing) = self.properties.get(&name)
            && existing.important
            && !value.important
        {
            return;
        }
        self.properties.insert(name, value);
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// Replace the whole mapping.
    pub fn set_properties(&mut self, properties: IndexMap<String, PropertyValue>) {
        self.properties = properties;
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(normalize_name(name).as_str())
    }

    /// Value of `name`, or the empty string when it is not set.
    pub fn get_property_value(&self, name: &str) -> &str {
        self.get(name).map(|v| v.value.as_str()).unwrap_or("")
    }

    /// `"important"` for important declarations, otherwise the empty string.
    pub fn get_property_priority(&self, name: &str) -> &str {
        match self.get(name) {
            Some(v) if v.important => "important",
            _ => "",
        }
    }

    /// Set `name` to `value`, replacing any existing declaration. An empty
    /// value removes the property.
    pub fn set_property(&mut self, name: &str, value: &str, important: bool) {
        let value = value.trim();
        if value.is_empty() {
            self.remove_property(name);
            return;
        }
        self.properties
            .insert(normalize_name(name), PropertyValue::new(value, important));
    }

    /// Remove `name`, returning its previous value.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(normalize_name(name).as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Name of the property at `index` in declaration order.
    pub fn item(&self, index: usize) -> Option<&str> {
        self.properties.get_index(index).map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize as declaration text: `color: red; margin: 0 !important;`.
    pub fn css_text(&self) -> String {
        self.properties
            .iter()
            .map(|(name, v)| {
                if v.important {
                    format!("{name}: {} !important;", v.value)
                } else {
                    format!("{name}: {};", v.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Property names are ASCII case-insensitive, custom properties excepted.
fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

struct DeclarationListParser;

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = (String, PropertyValue);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = (String, PropertyValue);
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = (String, PropertyValue);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        input.parse_until_before(Delimiter::Bang, |i| {
            while i.next().is_ok() {}
            Ok::<_, ParseError<'i, ()>>(())
        })?;
        let value = input.slice_from(start).trim();
        let important = input.try_parse(parse_important).is_ok();
        input.expect_exhausted()?;
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok((normalize_name(&name), PropertyValue::new(value, important)))
    }
}

impl<'i> RuleBodyItemParser<'i, (String, PropertyValue), ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
