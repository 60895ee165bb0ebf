//! Rendering surface seam and composed layer model
//!
//! The engine stops at decisions: a [`ComposedLayer`] pairs a shared,
//! read-only feature collection with per-feature render plans, and a
//! [`RenderSurface`] implementation owns pixels, panning, zooming and
//! gesture wiring.

use std::sync::Arc;

use geo::{Point, Rect};

use crate::config::{GeometryKind, TileSource};
use crate::feature::{BoundsTracker, Feature, FeatureCollection};
use crate::label::LabelAnnotation;
use crate::style::ResolvedStyle;

/// Interactive surface an assembled map is written onto.
///
/// Assembly drives exactly this sequence: `initialize`, `bind_tiles`, then
/// `add_layer` once per successfully composed layer, in paint order.
pub trait RenderSurface {
    /// Position the view.
    fn initialize(&mut self, center: Point<f64>, zoom: f64, custom_style: Option<&str>);

    /// Bind the base tile source.
    fn bind_tiles(&mut self, tiles: &TileSource);

    /// Add the next layer above the ones already added.
    fn add_layer(&mut self, layer: ComposedLayer);
}

/// One renderable layer: shared geometry plus per-feature decisions.
#[derive(Debug, Clone)]
pub struct ComposedLayer {
    /// Identity of the originating layer configuration.
    pub id: i64,
    pub name: String,
    pub kind: GeometryKind,
    /// Stacking position; lower sits below higher.
    pub z_index: usize,
    /// Zoom range within which the surface keeps the layer visible.
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// The resolved feature collection, shared and never mutated.
    pub collection: Arc<FeatureCollection>,
    /// Render plans for exactly the features that passed the filter, in
    /// input order. Indices point into `collection.features`.
    pub features: Vec<FeatureRender>,
}

/// Render decisions for a single feature.
#[derive(Debug, Clone)]
pub struct FeatureRender {
    /// Index into the owning layer's collection.
    pub index: usize,
    pub style: ResolvedStyle,
    /// Permanent annotation, when the label policy shows one.
    pub label: Option<LabelAnnotation>,
    /// Markup bound to feature clicks, when popups are configured.
    pub popup: Option<String>,
}

impl ComposedLayer {
    /// Number of features this layer renders.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Number of source features the filter removed.
    #[inline]
    pub fn hidden_count(&self) -> usize {
        self.collection.features.len() - self.features.len()
    }

    /// The source feature behind a render plan.
    #[inline]
    pub fn feature(&self, render: &FeatureRender) -> Option<&Feature> {
        self.collection.features.get(render.index)
    }

    /// WGS84 bounding box of the rendered features only, for fit-to-view.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut tracker = BoundsTracker::new();
        for render in &self.features {
            if let Some(feature) = self.feature(render)
                && let Some(geometry) = &feature.geometry
            {
                tracker.visit_geometry(geometry);
            }
        }
        tracker.finish()
    }
}
