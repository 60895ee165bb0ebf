//! Label visibility policy and markup
//!
//! Labels are permanent text annotations anchored to features. Visibility
//! diverges by geometry kind: polygon layers label by default and mute
//! listed values, point layers are quiet by default and label listed values.

use crate::config::{GeometryKind, LabelAnchor, LabelConfig};
use crate::feature::Feature;
use crate::style::color_or;

const DEFAULT_FONT_SIZE: u32 = 14;
const DEFAULT_FONT_COLOR: &str = "#000000";
const DEFAULT_FONT_FAMILY: &str = "sans-serif";
const DEFAULT_FONT_WEIGHT: &str = "normal";

/// A permanently visible text annotation for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnnotation {
    /// Inline-styled markup the surface places at the anchor.
    pub markup: String,
    pub anchor: LabelAnchor,
    /// Extra class for the annotation element.
    pub css_class: Option<String>,
}

/// Decide whether a feature's label is visible.
///
/// Requires `show`, a configured field and a non-empty value. Polygon layers
/// then show everything not listed in `exclude`; point layers show only
/// values listed in `include`.
pub fn should_show_label(feature: &Feature, label: &LabelConfig, kind: GeometryKind) -> bool {
    if !label.show {
        return false;
    }
    let Some(field) = label.field.as_deref() else {
        return false;
    };
    let value = feature.property_string(field);
    if value.is_empty() {
        return false;
    }

    match kind {
        GeometryKind::Polygon => !label.exclude.contains(&value),
        GeometryKind::Point => label.include.contains(&value),
    }
}

/// Build the annotation for a feature, or `None` when the policy hides it.
pub fn label_annotation(
    feature: &Feature,
    label: &LabelConfig,
    kind: GeometryKind,
) -> Option<LabelAnnotation> {
    if !should_show_label(feature, label, kind) {
        return None;
    }
    let value = feature.property_string(label.field.as_deref()?);

    Some(LabelAnnotation {
        markup: label_markup(&value, label),
        anchor: label.anchor,
        css_class: label.css_class.clone(),
    })
}

/// Wrap a label value in a span carrying the configured font styling.
pub fn label_markup(value: &str, label: &LabelConfig) -> String {
    let font_size = match label.font_size {
        Some(size) if size != 0 => size,
        _ => DEFAULT_FONT_SIZE,
    };
    format!(
        "<span style=\"font-size:{}px;color:{};font-family:{};font-weight:{}\">{}</span>",
        font_size,
        color_or(label.font_color.as_deref(), DEFAULT_FONT_COLOR),
        color_or(label.font_family.as_deref(), DEFAULT_FONT_FAMILY),
        color_or(label.font_weight.as_deref(), DEFAULT_FONT_WEIGHT),
        value
    )
}
