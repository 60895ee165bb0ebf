//! Mapweave - Declarative Layer Composition for Interactive Feature Maps
//!
//! This library turns declarative map descriptions into fully styled, filtered,
//! labeled and popup-wired layers on an interactive map surface. Geometry arrives
//! as GeoJSON, either inline or fetched from remote sources, and every visual and
//! behavioral decision is derived from per-layer configuration records.
//!
//! # Architecture
//!
//! - **[`MapConfig`]**: Declarative description of one map view and its layers
//! - **[`SourceResolver`]**: Geometry acquisition with a memoizing URL cache
//! - **[`MapAssembler`]**: Orchestrates resolution and per-feature decisions
//! - **[`RenderSurface`]**: Seam to whatever owns pixels, panning and zooming
//!
//! # Failure Isolation
//!
//! A layer that cannot be resolved is logged and skipped; the rest of the map
//! still assembles. Assembly itself never fails.

mod assemble;
mod color;
mod config;
mod feature;
mod filter;
mod label;
mod popup;
mod source;
mod style;
mod surface;

// Public API exports
pub use assemble::MapAssembler;
pub use color::color_for;
pub use config::{
    FilterConfig, GeometryKind, LabelAnchor, LabelConfig, LayerConfig, MapConfig, PopupConfig,
    PopupMode, SourceKind, StyleBase, StyleConfig, TileSource,
};
pub use feature::{Feature, FeatureCollection, Geometry};
pub use filter::passes_filter;
pub use label::{LabelAnnotation, label_annotation, label_markup, should_show_label};
pub use popup::render_popup;
#[cfg(feature = "http")]
pub use source::HttpFetcher;
pub use source::{Fetcher, GeometryCache, SourceResolver};
pub use style::{ResolvedStyle, resolve_style};
pub use surface::{ComposedLayer, FeatureRender, RenderSurface};

/// Error types for geometry acquisition
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("geometry fetch for {url} returned {status_text}")]
    Fetch { url: String, status_text: String },

    #[error("geometry request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("invalid feature collection from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> GeometryCache = GeometryCache::new;
        let _: fn() -> TileSource = TileSource::openstreetmap;
        let _: fn(&str) -> String = color_for;
    }
}
