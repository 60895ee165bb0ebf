//! Map assembly
//!
//! Walks a map configuration in layer order, resolves each visible layer's
//! geometry and wires every per-feature decision into composed layers on a
//! rendering surface. A layer that cannot be resolved is logged and skipped;
//! assembly of the map as a whole always completes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{LayerConfig, MapConfig};
use crate::feature::FeatureCollection;
use crate::filter::passes_filter;
use crate::label::label_annotation;
use crate::popup::render_popup;
use crate::source::{Fetcher, SourceResolver};
use crate::style::resolve_style;
use crate::surface::{ComposedLayer, FeatureRender, RenderSurface};

/// Turns map configurations into layers on a surface.
///
/// Holds the source resolver, and with it the geometry cache, so repeated
/// assemblies of the same configuration reuse fetched collections.
pub struct MapAssembler<F> {
    resolver: SourceResolver<F>,
}

impl<F: Fetcher> MapAssembler<F> {
    /// Assembler around an existing resolver (and its cache).
    pub fn new(resolver: SourceResolver<F>) -> Self {
        Self { resolver }
    }

    /// The underlying source resolver.
    #[inline]
    pub fn resolver(&self) -> &SourceResolver<F> {
        &self.resolver
    }

    /// Assemble one map view onto `surface` and hand it back.
    ///
    /// Layers are processed in configured order, which is paint order; each
    /// layer's position in the list is its z-index. Hidden layers are
    /// skipped silently, unresolvable ones with a warning. The surface
    /// always comes back carrying every layer that could be composed.
    pub async fn assemble<S: RenderSurface>(&self, config: &MapConfig, mut surface: S) -> S {
        surface.initialize(config.center, config.zoom, config.custom_style.as_deref());
        surface.bind_tiles(&config.tiles);

        let mut composed = 0usize;
        for (z_index, layer) in config.layers.iter().enumerate() {
            if !layer.visible {
                debug!(layer = %layer.name, "skipping hidden layer");
                continue;
            }

            let collection = match self.resolver.resolve(layer).await {
                Ok(Some(collection)) => collection,
                Ok(None) => {
                    warn!(layer = %layer.name, "layer has no geometry source, skipping");
                    continue;
                }
                Err(error) => {
                    warn!(layer = %layer.name, error = %error, "failed to resolve layer geometry, skipping");
                    continue;
                }
            };

            surface.add_layer(compose_layer(layer, z_index, collection));
            composed += 1;
        }

        debug!(
            layers = config.layers.len(),
            composed = composed,
            "map assembled"
        );
        surface
    }
}

/// Wire one resolved layer into per-feature render plans.
fn compose_layer(
    config: &LayerConfig,
    z_index: usize,
    collection: Arc<FeatureCollection>,
) -> ComposedLayer {
    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        if !passes_filter(feature, config.filter.as_ref()) {
            continue;
        }

        let style = resolve_style(feature, &config.style, config.geometry);
        let label = config
            .label
            .as_ref()
            .and_then(|label| label_annotation(feature, label, config.geometry));
        let popup = render_popup(feature, config.popup.as_ref());

        features.push(FeatureRender {
            index,
            style,
            label,
            popup,
        });
    }

    debug!(
        layer = %config.name,
        rendered = features.len(),
        total = collection.features.len(),
        "layer composed"
    );

    ComposedLayer {
        id: config.id,
        name: config.name.clone(),
        kind: config.geometry,
        z_index,
        min_zoom: config.min_zoom,
        max_zoom: config.max_zoom,
        collection,
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        FilterConfig, GeometryKind, LabelConfig, PopupConfig, PopupMode, StyleConfig,
    };
    use crate::style::ResolvedStyle;
    use serde_json::json;

    fn create_test_collection() -> Arc<FeatureCollection> {
        Arc::new(
            serde_json::from_value(json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [22.57, 51.25]},
                        "properties": {"name": "Lublin", "kind": "city", "population": 339682}
                    },
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [23.17, 51.13]},
                        "properties": {"name": "Chełm", "kind": "city", "population": 60231}
                    },
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [22.28, 51.55]},
                        "properties": {"name": "Kock", "kind": "town", "population": 3254}
                    }
                ]
            }))
            .expect("valid collection"),
        )
    }

    #[test]
    fn test_compose_applies_filter_and_keeps_indices() {
        let config = LayerConfig {
            id: 1,
            name: "cities".to_string(),
            geometry: GeometryKind::Point,
            filter: Some(FilterConfig {
                field: Some("kind".to_string()),
                exclude: vec![json!("town")],
                include: vec![],
            }),
            ..LayerConfig::default()
        };

        let layer = compose_layer(&config, 3, create_test_collection());

        assert_eq!(layer.z_index, 3);
        assert_eq!(layer.feature_count(), 2);
        assert_eq!(layer.hidden_count(), 1);
        let indices: Vec<usize> = layer.features.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_compose_wires_style_label_and_popup() {
        let config = LayerConfig {
            id: 1,
            name: "cities".to_string(),
            geometry: GeometryKind::Point,
            style: serde_json::from_value(json!({
                "type": "category",
                "field": "kind",
                "color_map": {"city": "#aa0000"}
            }))
            .expect("valid style"),
            label: Some(LabelConfig {
                show: true,
                field: Some("name".to_string()),
                include: vec!["Lublin".to_string()],
                ..LabelConfig::default()
            }),
            popup: Some(PopupConfig {
                show: true,
                mode: PopupMode::Template,
                fields: vec![],
                template: Some("{name} ({population})".to_string()),
            }),
            ..LayerConfig::default()
        };

        let layer = compose_layer(&config, 0, create_test_collection());
        assert_eq!(layer.feature_count(), 3);

        let lublin = &layer.features[0];
        match &lublin.style {
            ResolvedStyle::Marker { color, .. } => assert_eq!(color, "#aa0000"),
            other => panic!("expected marker style, got {:?}", other),
        }
        assert!(lublin.label.as_ref().expect("label").markup.contains(">Lublin<"));
        assert_eq!(lublin.popup.as_deref(), Some("Lublin (339682)"));

        // Chełm is not in the label include list; points stay quiet.
        assert!(layer.features[1].label.is_none());
        assert_eq!(layer.features[1].popup.as_deref(), Some("Chełm (60231)"));
    }

    #[test]
    fn test_compose_without_decorations() {
        let config = LayerConfig {
            id: 1,
            name: "plain".to_string(),
            style: StyleConfig::default(),
            ..LayerConfig::default()
        };

        let layer = compose_layer(&config, 0, create_test_collection());
        for feature in &layer.features {
            assert!(feature.label.is_none());
            assert!(feature.popup.is_none());
            assert!(matches!(feature.style, ResolvedStyle::Path { .. }));
        }
    }
}
