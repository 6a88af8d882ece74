//! Conversion engines and their option bundle

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-side conversion strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Primary engine, honours `use_engine_default_formatting`
    #[default]
    Primary,
    /// Alternate engine, always applies the supplied options
    Alternate,
}

impl Engine {
    /// Tag sent in the `engine` form field
    pub fn tag(&self) -> &'static str {
        match self {
            Engine::Primary => "primary",
            Engine::Alternate => "alternate",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Block style a spacing entry applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    /// Body paragraphs
    BodyText,
    /// Level 1 heading
    Heading1,
    /// Level 2 heading
    Heading2,
    /// Level 3 heading
    Heading3,
    /// Level 4 heading
    Heading4,
}

impl BlockStyle {
    /// Every block style, in document order
    pub const ALL: [BlockStyle; 5] = [
        BlockStyle::BodyText,
        BlockStyle::Heading1,
        BlockStyle::Heading2,
        BlockStyle::Heading3,
        BlockStyle::Heading4,
    ];
}

/// Space before and after a block, in points
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Space before the block
    pub before: f32,
    /// Space after the block
    pub after: f32,
}

impl Spacing {
    /// Spacing with the given before/after values
    pub fn new(before: f32, after: f32) -> Self {
        Self { before, after }
    }
}

/// Spacing per block style
///
/// Serialises as a JSON object keyed by style name, e.g.
/// `{"body_text": {"before": 0.0, "after": 6.0}, "heading1": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpacingConfig(pub BTreeMap<BlockStyle, Spacing>);

impl SpacingConfig {
    /// Spacing for `style`, if configured
    pub fn get(&self, style: BlockStyle) -> Option<Spacing> {
        self.0.get(&style).copied()
    }

    /// Set the spacing for `style`
    pub fn set(&mut self, style: BlockStyle, spacing: Spacing) {
        self.0.insert(style, spacing);
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        let defaults = [
            (BlockStyle::BodyText, Spacing::new(0.0, 6.0)),
            (BlockStyle::Heading1, Spacing::new(12.0, 6.0)),
            (BlockStyle::Heading2, Spacing::new(10.0, 4.0)),
            (BlockStyle::Heading3, Spacing::new(8.0, 4.0)),
            (BlockStyle::Heading4, Spacing::new(6.0, 3.0)),
        ];
        Self(defaults.into_iter().collect())
    }
}

/// Bullet style for unordered lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMarker {
    /// Filled circle
    #[default]
    Disc,
    /// Hollow circle
    Circle,
    /// Filled square
    Square,
    /// En dash
    Dash,
    /// Numbered
    Decimal,
}

/// Document formatting sent as the JSON `options` field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormattingOptions {
    /// Line spacing multiplier (default: 1.15)
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,

    /// Table font size in points (default: 10)
    #[serde(default = "default_table_font_size")]
    pub table_font_size: u32,

    /// Body font size in points (default: 11)
    #[serde(default = "default_body_font_size")]
    pub body_font_size: u32,

    /// Shade alternating table rows (default: true)
    #[serde(default = "default_true")]
    pub alternate_rows: bool,

    /// Bullet style (default: disc)
    #[serde(default)]
    pub list_marker: ListMarker,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            line_spacing: default_line_spacing(),
            table_font_size: default_table_font_size(),
            body_font_size: default_body_font_size(),
            alternate_rows: true,
            list_marker: ListMarker::default(),
        }
    }
}

/// Everything a conversion request carries besides the file and engine
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Spacing per block style
    #[serde(default)]
    pub spacing: SpacingConfig,

    /// Fonts, line spacing, tables and lists
    #[serde(default)]
    pub formatting: FormattingOptions,

    /// Let the primary engine apply its own defaults
    ///
    /// With the primary engine the spacing and formatting values become
    /// advisory and are not range-checked; they are still sent.
    #[serde(default)]
    pub use_engine_default_formatting: bool,
}

/// Accepted line spacing multipliers
const LINE_SPACING_RANGE: std::ops::RangeInclusive<f32> = 0.5..=5.0;
/// Accepted font sizes in points
const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 6..=72;
/// Accepted spacing values in points
const SPACING_RANGE: std::ops::RangeInclusive<f32> = 0.0..=144.0;

impl ConversionOptions {
    /// Whether the values will be applied by `engine` rather than ignored
    pub fn is_authoritative_for(&self, engine: Engine) -> bool {
        !(engine == Engine::Primary && self.use_engine_default_formatting)
    }

    /// Range-check the values that `engine` will apply
    pub fn validate_for(&self, engine: Engine) -> Result<()> {
        if !self.is_authoritative_for(engine) {
            return Ok(());
        }

        let f = &self.formatting;
        if !LINE_SPACING_RANGE.contains(&f.line_spacing) {
            return Err(Error::InvalidInput(format!(
                "line spacing {} is outside {:?}",
                f.line_spacing, LINE_SPACING_RANGE
            )));
        }
        for (name, size) in [("table", f.table_font_size), ("body", f.body_font_size)] {
            if !FONT_SIZE_RANGE.contains(&size) {
                return Err(Error::InvalidInput(format!(
                    "{} font size {} is outside {:?}",
                    name, size, FONT_SIZE_RANGE
                )));
            }
        }
        for (style, spacing) in &self.spacing.0 {
            if !SPACING_RANGE.contains(&spacing.before) || !SPACING_RANGE.contains(&spacing.after) {
                return Err(Error::InvalidInput(format!(
                    "spacing for {:?} is outside {:?}",
                    style, SPACING_RANGE
                )));
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_line_spacing() -> f32 {
    1.15
}

fn default_table_font_size() -> u32 {
    10
}

fn default_body_font_size() -> u32 {
    11
}
