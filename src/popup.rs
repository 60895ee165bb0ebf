//! Popup content rendering
//!
//! Popups are click-triggered markup derived from a feature's properties,
//! either through a text template with placeholders or as a generated
//! two-column property table.

use crate::config::{PopupConfig, PopupMode};
use crate::feature::{Feature, display_value};

/// Render popup markup for one feature, or `None` for no popup.
///
/// Template mode substitutes `{propertyName}` placeholders with stringified
/// property values; placeholders naming properties the feature lacks stay
/// as-is. List mode renders a table over the configured fields, or over
/// every property when no fields are configured. Disabled configurations
/// and empty content produce `None`.
pub fn render_popup(feature: &Feature, popup: Option<&PopupConfig>) -> Option<String> {
    let popup = popup?;
    if !popup.show {
        return None;
    }

    let content = match popup.mode {
        PopupMode::Template => match popup.template.as_deref() {
            Some(template) if !template.is_empty() => render_template(feature, template),
            // Template mode without a template degrades to the field list.
            _ => render_list(feature, &popup.fields),
        },
        PopupMode::List => render_list(feature, &popup.fields),
    };

    if content.is_empty() { None } else { Some(content) }
}

fn render_template(feature: &Feature, template: &str) -> String {
    let mut out = template.to_string();
    for (name, value) in &feature.properties {
        let placeholder = format!("{{{}}}", name);
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &display_value(value));
        }
    }
    out
}

fn render_list(feature: &Feature, fields: &[String]) -> String {
    let mut rows = String::new();
    if fields.is_empty() {
        for (name, value) in &feature.properties {
            push_row(&mut rows, name, &display_value(value));
        }
    } else {
        for name in fields {
            push_row(&mut rows, name, &feature.property_string(name));
        }
    }

    if rows.is_empty() {
        String::new()
    } else {
        format!("<table class=\"popup-properties\">{}</table>", rows)
    }
}

fn push_row(rows: &mut String, name: &str, value: &str) {
    rows.push_str("<tr><th>");
    rows.push_str(name);
    rows.push_str("</th><td>");
    rows.push_str(value);
    rows.push_str("</td></tr>");
}
