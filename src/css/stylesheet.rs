//! CSS stylesheet parsing and rule structures.

use cssparser::{
    AtRuleParser, CowRcStr, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    StyleSheetParser,
};
use selectors::parser::{ParseRelative, SelectorList};

use super::media::MediaQueryList;
use crate::dom::ArenaSelectors;
use crate::style::PropertyManager;

/// A parsed CSS stylesheet: its rules in source order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// A rule in a stylesheet.
///
/// Only style and media rules take part in resolution; every other at-rule
/// is dropped while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum CssRule {
    Style(StyleRule),
    Media(MediaRule),
}

/// `selector { declarations }`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Selector list as written.
    pub selector_text: String,
    /// Full serialized rule, e.g. `div { color: red; }`.
    pub css_text: String,
}

/// `@media condition { rules }`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRule {
    pub condition_text: String,
    pub rules: Vec<CssRule>,
}

impl CssRule {
    pub fn style(selector_text: impl Into<String>, css_text: impl Into<String>) -> Self {
        CssRule::Style(StyleRule {
            selector_text: selector_text.into(),
            css_text: css_text.into(),
        })
    }

    pub fn media(condition_text: impl Into<String>, rules: Vec<CssRule>) -> Self {
        CssRule::Media(MediaRule {
            condition_text: condition_text.into(),
            rules,
        })
    }

    /// Serialized form of the rule.
    pub fn css_text(&self) -> String {
        match self {
            CssRule::Style(rule) => rule.css_text.clone(),
            CssRule::Media(rule) => {
                let inner: Vec<String> = rule.rules.iter().map(CssRule::css_text).collect();
                format!("@media {} {{ {} }}", rule.condition_text, inner.join(" "))
            }
        }
    }
}

impl StyleRule {
    /// Text between the first `{` and the last `}` of `css_text`.
    ///
    /// Empty when either brace is missing or they are out of order.
    pub fn declaration_body(&self) -> &str {
        let text = self.css_text.as_str();
        match (text.find('{'), text.rfind('}')) {
            (Some(open), Some(close)) if open < close => &text[open + 1..close],
            _ => "",
        }
    }
}

impl Stylesheet {
    /// Parse a CSS stylesheet from a string.
    ///
    /// Rules with invalid selectors are dropped. An `@media` rule with an
    /// unparseable condition is kept with the condition `not all`.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();
        parse_rule_list(&mut parser, &mut rules);
        Self { rules }
    }
}

fn parse_rule_list<'i>(input: &mut Parser<'i, '_>, rules: &mut Vec<CssRule>) {
    let mut rule_parser = TopLevelRuleParser { rules };
    for result in StyleSheetParser::new(input, &mut rule_parser) {
        if let Err((_, slice)) = result {
            log::debug!("dropped css rule: {}", slice.trim());
        }
    }
}

struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

enum AtRulePrelude {
    Media(String),
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = AtRulePrelude;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        if !name.eq_ignore_ascii_case("media") {
            return Err(input.new_custom_error(()));
        }
        let start = input.position();
        while input.next().is_ok() {}
        let text = input.slice_from(start).trim();
        let condition = match MediaQueryList::parse(text) {
            Ok(_) => text.to_string(),
            Err(e) => {
                log::debug!("{e}, treating as `not all`");
                "not all".to_string()
            }
        };
        Ok(AtRulePrelude::Media(condition))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let AtRulePrelude::Media(condition) = prelude;
        let mut rules = Vec::new();
        parse_rule_list(input, &mut rules);
        self.rules.push(CssRule::media(condition, rules));
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let location = input.current_source_location();
        let start = input.position();
        if SelectorList::parse(&ArenaSelectors, input, ParseRelative::No).is_err() {
            return Err(location.new_custom_error(()));
        }
        Ok(input.slice_from(start).trim().to_string())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let declarations = PropertyManager::from_css_text(input.slice_from(start));

        let css_text = if declarations.is_empty() {
            format!("{prelude} {{ }}")
        } else {
            format!("{prelude} {{ {} }}", declarations.css_text())
        };
        self.rules.push(CssRule::style(prelude, css_text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_rule(rule: &CssRule) -> &StyleRule {
        match rule {
            CssRule::Style(style) => style,
            other => panic!("expected style rule, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_style_rules() {
        let sheet = Stylesheet::parse("p { color: red } .a, .b{font-size:12px;margin:0}");
        assert_eq!(sheet.rules.len(), 2);

        let first = style_rule(&sheet.rules[0]);
        assert_eq!(first.selector_text, "p");
        assert_eq!(first.css_text, "p { color: red; }");
        assert_eq!(first.declaration_body(), " color: red; ");

        let second = style_rule(&sheet.rules[1]);
        assert_eq!(second.selector_text, ".a, .b");
        assert_eq!(second.css_text, ".a, .b { font-size: 12px; margin: 0; }");
    }

    #[test]
    fn test_important_survives_normalization() {
        let sheet = Stylesheet::parse("div { color: blue !important; color: red }");
        let rule = style_rule(&sheet.rules[0]);
        assert_eq!(rule.css_text, "div { color: blue !important; }");
    }

    #[test]
    fn test_invalid_selector_dropped() {
        let sheet = Stylesheet::parse("p:unknown-thing { color: red } span { color: blue }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(style_rule(&sheet.rules[0]).selector_text, "span");
    }

    #[test]
    fn test_media_rules_nest() {
        let sheet = Stylesheet::parse(
            "@media screen and (min-width: 600px) { p { color: red } @media print { b { color: blue } } }",
        );
        assert_eq!(sheet.rules.len(), 1);
        let CssRule::Media(media) = &sheet.rules[0] else {
            panic!("expected media rule");
        };
        assert_eq!(media.condition_text, "screen and (min-width: 600px)");
        assert_eq!(media.rules.len(), 2);
        assert!(matches!(&media.rules[1], CssRule::Media(inner) if inner.condition_text == "print"));
    }

    #[test]
    fn test_invalid_media_condition_becomes_not_all() {
        let sheet = Stylesheet::parse("@media (min-width: ) { p { color: red } }");
        let CssRule::Media(media) = &sheet.rules[0] else {
            panic!("expected media rule");
        };
        assert_eq!(media.condition_text, "not all");
        assert_eq!(media.rules.len(), 1);
    }

    #[test]
    fn test_other_at_rules_skipped() {
        let sheet = Stylesheet::parse(
            "@import url(a.css); @font-face { font-family: x } @keyframes k { from { top: 0 } } p { color: red }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(style_rule(&sheet.rules[0]).selector_text, "p");
    }

    #[test]
    fn test_declaration_body_malformed() {
        let rule = StyleRule {
            selector_text: "p".into(),
            css_text: "p } color: red {".into(),
        };
        assert_eq!(rule.declaration_body(), "");

        let rule = StyleRule {
            selector_text: "p".into(),
            css_text: "p color: red".into(),
        };
        assert_eq!(rule.declaration_body(), "");
    }

    #[test]
    fn test_rule_css_text() {
        let rule = CssRule::media("print", vec![CssRule::style("p", "p { color: red; }")]);
        assert_eq!(rule.css_text(), "@media print { p { color: red; } }");
    }
}
