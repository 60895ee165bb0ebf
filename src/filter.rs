//! Feature filtering
//!
//! The filter gate runs before any style, label or popup work; a feature
//! that fails it contributes nothing to the composed layer.

use crate::config::FilterConfig;
use crate::feature::Feature;

/// Decide whether a feature is rendered at all.
///
/// No configuration, or a configuration without a field, passes everything.
/// Exclusion takes precedence over inclusion; a non-empty include list then
/// acts as an allow-list. Membership compares raw JSON values, so `5` and
/// `"5"` are distinct.
pub fn passes_filter(feature: &Feature, filter: Option<&FilterConfig>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let Some(field) = filter.field.as_deref() else {
        return true;
    };

    let value = feature.property(field);

    if let Some(value) = value
        && filter.exclude.contains(value)
    {
        return false;
    }

    if !filter.include.is_empty() {
        return match value {
            Some(value) => filter.include.contains(value),
            None => false,
        };
    }

    true
}
