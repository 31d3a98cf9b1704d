//! Media query evaluation against a viewport.
//!
//! Supports the subset of Media Queries 4 that a static document can answer:
//! media types, `not`/`only`, `and`-joined features (`width`, `height`,
//! `aspect-ratio`, `resolution` with `min-`/`max-` prefixes or range syntax,
//! `orientation`, `prefers-color-scheme`). Unknown features never match.

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::error::{Error, Result};

/// Pixels per `em`/`rem` in media queries (the initial font size).
const EM_PX: f32 = 16.0;

/// Media type of the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Screen,
    Print,
}

/// User's preferred color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// The document's default view: everything media queries are evaluated
/// against.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub media_type: MediaType,
    pub color_scheme: ColorScheme,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            device_pixel_ratio: 1.0,
            media_type: MediaType::Screen,
            color_scheme: ColorScheme::Light,
        }
    }
}

impl Viewport {
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    /// `window.matchMedia(query).matches`.
    ///
    /// Fails with [`Error::InvalidMediaQuery`] when `query` does not parse.
    pub fn match_media(&self, query: &str) -> Result<bool> {
        Ok(MediaQueryList::parse(query)?.matches(self))
    }
}

/// A comma-separated list of media queries. Matches if any query matches;
/// an empty list matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

#[derive(Debug, Clone, PartialEq)]
struct MediaQuery {
    negated: bool,
    media_type: QueryType,
    features: Vec<MediaFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QueryType {
    All,
    Screen,
    Print,
    /// Valid but unknown type, never matches.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq)]
enum MediaFeature {
    Width(Comparison, f32),
    Height(Comparison, f32),
    AspectRatio(Comparison, f32),
    /// Dots per CSS pixel.
    Resolution(Comparison, f32),
    Orientation(Orientation),
    PrefersColorScheme(ColorScheme),
    /// Boolean context on a known feature, e.g. `(width)`.
    Supported,
    Unknown,
}

impl MediaQueryList {
    /// Parse a media query list.
    pub fn parse(text: &str) -> Result<Self> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        if parser.is_exhausted() {
            return Ok(Self {
                queries: Vec::new(),
            });
        }
        let queries = parser
            .parse_comma_separated(parse_media_query)
            .map_err(|e| Error::InvalidMediaQuery {
                query: text.to_string(),
                reason: format!("{:?}", e.kind),
            })?;
        Ok(Self { queries })
    }

    /// Evaluate against `viewport`.
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.matches(viewport))
    }
}

impl MediaQuery {
    fn matches(&self, viewport: &Viewport) -> bool {
        let type_matches = match self.media_type {
            QueryType::All => true,
            QueryType::Screen => viewport.media_type == MediaType::Screen,
            QueryType::Print => viewport.media_type == MediaType::Print,
            QueryType::Unknown => false,
        };
        let matched = type_matches && self.features.iter().all(|f| f.matches(viewport));
        matched != self.negated
    }
}

impl MediaFeature {
    fn matches(&self, viewport: &Viewport) -> bool {
        match *self {
            MediaFeature::Width(op, px) => op.compare(viewport.width, px),
            MediaFeature::Height(op, px) => op.compare(viewport.height, px),
            MediaFeature::AspectRatio(op, ratio) => {
                viewport.height > 0.0 && op.compare(viewport.width / viewport.height, ratio)
            }
            MediaFeature::Resolution(op, dppx) => op.compare(viewport.device_pixel_ratio, dppx),
            MediaFeature::Orientation(orientation) => {
                let actual = if viewport.height >= viewport.width {
                    Orientation::Portrait
                } else {
                    Orientation::Landscape
                };
                actual == orientation
            }
            MediaFeature::PrefersColorScheme(scheme) => viewport.color_scheme == scheme,
            MediaFeature::Supported => true,
            MediaFeature::Unknown => false,
        }
    }
}

impl Comparison {
    fn compare(self, actual: f32, expected: f32) -> bool {
        match self {
            Comparison::Lt => actual < expected,
            Comparison::Le => actual <= expected,
            Comparison::Eq => (actual - expected).abs() < f32::EPSILON * actual.abs().max(1.0),
            Comparison::Ge => actual >= expected,
            Comparison::Gt => actual > expected,
        }
    }
}

impl QueryType {
    fn from_ident(ident: &str) -> Self {
        match ident {
            "all" => QueryType::All,
            "screen" => QueryType::Screen,
            "print" => QueryType::Print,
            _ => QueryType::Unknown,
        }
    }
}

fn parse_media_query<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<MediaQuery, ParseError<'i, ()>> {
    let mut negated = false;
    let mut media_type = None;

    if let Ok(ident) = input.try_parse(|i| i.expect_ident_cloned()) {
        let ident = ident.to_ascii_lowercase();
        match ident.as_str() {
            "not" | "only" => {
                negated = ident == "not";
                match input.try_parse(|i| i.expect_ident_cloned()) {
                    Ok(ty) => media_type = Some(parse_media_type(input, &ty)?),
                    // `not (feature)` negates a bare condition
                    Err(_) if negated => {}
                    Err(e) => return Err(e.into()),
                }
            }
            _ => media_type = Some(parse_media_type(input, &ident)?),
        }
    }

    let mut features = Vec::new();
    if media_type.is_none() {
        features.push(parse_feature(input)?);
    }
    while input
        .try_parse(|i| i.expect_ident_matching("and"))
        .is_ok()
    {
        features.push(parse_feature(input)?);
    }

    Ok(MediaQuery {
        negated,
        media_type: media_type.unwrap_or(QueryType::All),
        features,
    })
}

fn parse_media_type<'i>(
    input: &Parser<'i, '_>,
    ident: &str,
) -> std::result::Result<QueryType, ParseError<'i, ()>> {
    let ident = ident.to_ascii_lowercase();
    match ident.as_str() {
        "and" | "or" | "not" | "only" | "layer" => Err(input.new_custom_error(())),
        other => Ok(QueryType::from_ident(other)),
    }
}

fn parse_feature<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<MediaFeature, ParseError<'i, ()>> {
    input.expect_parenthesis_block()?;
    input.parse_nested_block(parse_feature_body)
}

fn parse_feature_body<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<MediaFeature, ParseError<'i, ()>> {
    let name = input.expect_ident_cloned()?.to_ascii_lowercase();
    if input.is_exhausted() {
        return Ok(if is_known_feature(&name) {
            MediaFeature::Supported
        } else {
            MediaFeature::Unknown
        });
    }

    let (op, name) = if input.try_parse(|i| i.expect_colon()).is_ok() {
        if let Some(base) = name.strip_prefix("min-") {
            (Comparison::Ge, base.to_string())
        } else if let Some(base) = name.strip_prefix("max-") {
            (Comparison::Le, base.to_string())
        } else {
            (Comparison::Eq, name)
        }
    } else {
        (parse_comparison(input)?, name)
    };

    let feature = match name.as_str() {
        "width" => MediaFeature::Width(op, parse_length(input)?),
        "height" => MediaFeature::Height(op, parse_length(input)?),
        "aspect-ratio" => MediaFeature::AspectRatio(op, parse_ratio(input)?),
        "resolution" => MediaFeature::Resolution(op, parse_resolution(input)?),
        "orientation" if op == Comparison::Eq => {
            let location = input.current_source_location();
            let ident = input.expect_ident_cloned()?.to_ascii_lowercase();
            match ident.as_str() {
                "portrait" => MediaFeature::Orientation(Orientation::Portrait),
                "landscape" => MediaFeature::Orientation(Orientation::Landscape),
                _ => return Err(location.new_custom_error(())),
            }
        }
        "prefers-color-scheme" if op == Comparison::Eq => {
            let location = input.current_source_location();
            let ident = input.expect_ident_cloned()?.to_ascii_lowercase();
            match ident.as_str() {
                "light" => MediaFeature::PrefersColorScheme(ColorScheme::Light),
                "dark" => MediaFeature::PrefersColorScheme(ColorScheme::Dark),
                _ => return Err(location.new_custom_error(())),
            }
        }
        _ => {
            while input.next().is_ok() {}
            MediaFeature::Unknown
        }
    };
    Ok(feature)
}

fn is_known_feature(name: &str) -> bool {
    matches!(
        name,
        "width" | "height" | "aspect-ratio" | "resolution" | "orientation" | "color"
            | "prefers-color-scheme"
    )
}

fn parse_comparison<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<Comparison, ParseError<'i, ()>> {
    let location = input.current_source_location();
    let token = input.next()?.clone();
    fn or_equal(input: &mut Parser) -> bool {
        input.try_parse(|i| i.expect_delim('=')).is_ok()
    }
    match token {
        Token::Delim('<') => Ok(if or_equal(input) {
            Comparison::Le
        } else {
            Comparison::Lt
        }),
        Token::Delim('>') => Ok(if or_equal(input) {
            Comparison::Ge
        } else {
            Comparison::Gt
        }),
        Token::Delim('=') => Ok(Comparison::Eq),
        _ => Err(location.new_custom_error(())),
    }
}

/// Length in CSS pixels.
fn parse_length<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<f32, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match input.next()?.clone() {
        Token::Dimension { value, unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "px" => Ok(value),
            "em" | "rem" => Ok(value * EM_PX),
            _ => Err(location.new_custom_error(())),
        },
        Token::Number { value, .. } if value == 0.0 => Ok(0.0),
        _ => Err(location.new_custom_error(())),
    }
}

/// Resolution in dots per CSS pixel.
fn parse_resolution<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<f32, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match input.next()?.clone() {
        Token::Dimension { value, unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "dppx" | "x" => Ok(value),
            "dpi" => Ok(value / 96.0),
            "dpcm" => Ok(value * 2.54 / 96.0),
            _ => Err(location.new_custom_error(())),
        },
        _ => Err(location.new_custom_error(())),
    }
}

fn parse_ratio<'i>(input: &mut Parser<'i, '_>) -> std::result::Result<f32, ParseError<'i, ()>> {
    let numerator = input.expect_number()?;
    let denominator = if input.try_parse(|i| i.expect_delim('/')).is_ok() {
        input.expect_number()?
    } else {
        1.0
    };
    if denominator == 0.0 {
        return Err(input.new_custom_error(()));
    }
    Ok(numerator / denominator)
}
