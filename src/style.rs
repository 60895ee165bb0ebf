//! Per-feature style resolution
//!
//! Turns a layer's [`StyleConfig`] plus one feature into the concrete visual
//! style the rendering surface applies: a circle marker description for point
//! layers, a fill-and-stroke path description for everything else.

use crate::color::color_for;
use crate::config::{GeometryKind, StyleBase, StyleConfig};
use crate::feature::Feature;

/// Default fill/marker color when the configuration leaves it unset.
const DEFAULT_COLOR: &str = "#3388ff";
/// Path stroke default.
const PATH_STROKE_COLOR: &str = "white";
/// Marker stroke default.
const MARKER_STROKE_COLOR: &str = "#000";
const DEFAULT_STROKE_WEIGHT: f64 = 1.0;
const PATH_FILL_OPACITY: f64 = 0.6;
const MARKER_FILL_OPACITY: f64 = 0.8;
const MARKER_RADIUS: f64 = 4.0;

/// Concrete style decision for one feature.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStyle {
    /// Circle marker for point layers.
    Marker {
        color: String,
        radius: f64,
        stroke_color: String,
        stroke_weight: f64,
        fill_opacity: f64,
    },
    /// Fill and stroke for polygon and line layers.
    Path {
        color: String,
        stroke_color: String,
        stroke_weight: f64,
        fill_opacity: f64,
    },
}

impl ResolvedStyle {
    /// The fill/marker color of either shape.
    #[inline]
    pub fn color(&self) -> &str {
        match self {
            Self::Marker { color, .. } => color,
            Self::Path { color, .. } => color,
        }
    }
}

/// Decide the visual style for one feature.
///
/// Category styles with a configured field use the mapped color for the
/// feature's stringified value and fall back to a deterministic hash color
/// for unmapped values. All other configurations, including graduated ones
/// whose classification fields are currently inert, use the default color.
pub fn resolve_style(feature: &Feature, style: &StyleConfig, kind: GeometryKind) -> ResolvedStyle {
    let base = style.base();
    let color = match style {
        StyleConfig::Category {
            field: Some(field),
            color_map,
            ..
        } => {
            let value = feature.property_string(field);
            match color_map.get(&value) {
                Some(mapped) => mapped.clone(),
                None => color_for(&value),
            }
        }
        // A category style without a field behaves like a fixed style, and
        // graduated classification falls through until it is wired up.
        StyleConfig::Category { .. } | StyleConfig::Graduated { .. } | StyleConfig::Simple(_) => {
            color_or(base.color.as_deref(), DEFAULT_COLOR)
        }
    };

    // Single dispatch point on geometry kind; a new kind gets a new arm here.
    match kind {
        GeometryKind::Point => ResolvedStyle::Marker {
            color,
            radius: number_or(base.radius, MARKER_RADIUS),
            stroke_color: color_or(base.stroke_color.as_deref(), MARKER_STROKE_COLOR),
            stroke_weight: number_or(base.stroke_weight, DEFAULT_STROKE_WEIGHT),
            fill_opacity: number_or(base.fill_opacity, MARKER_FILL_OPACITY),
        },
        GeometryKind::Polygon => ResolvedStyle::Path {
            color,
            stroke_color: color_or(base.stroke_color.as_deref(), PATH_STROKE_COLOR),
            stroke_weight: number_or(base.stroke_weight, DEFAULT_STROKE_WEIGHT),
            fill_opacity: number_or(base.fill_opacity, PATH_FILL_OPACITY),
        },
    }
}

/// `value || default` over color strings: empty counts as unset.
pub(crate) fn color_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(color) if !color.is_empty() => color.to_string(),
        _ => default.to_string(),
    }
}

/// `value || default` over numbers: zero counts as unset.
pub(crate) fn number_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(number) if number != 0.0 => number,
        _ => default,
    }
}
