//! Declarative map and layer configuration
//!
//! These types mirror the stored records that describe one map view: tiles,
//! viewport, and an ordered list of layers, each carrying its own style,
//! filter, label and popup sub-configuration. Everything deserializes from
//! the JSON the configuration store produces; optional fields default so
//! partially filled records still assemble.

use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::feature::FeatureCollection;

/// Configuration for one map view.
///
/// Immutable for the duration of an assembly call. Layer order is paint
/// order: earlier entries sit below later ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Base tile source drawn under all feature layers. Default: OpenStreetMap
    #[serde(default)]
    pub tiles: TileSource,
    /// Initial zoom level.
    pub zoom: f64,
    /// Initial center in WGS84, longitude in `x` and latitude in `y`.
    pub center: Point<f64>,
    /// Feature layers in paint order.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    /// Free-form style override text handed to the surface verbatim.
    #[serde(default)]
    pub custom_style: Option<String>,
}

/// Descriptor for a slippy-map tile source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// URL template with `{z}`/`{x}`/`{y}` (and optionally `{s}`) placeholders.
    pub url_template: String,
    /// Attribution text the surface must display.
    pub attribution: String,
    /// Maximum zoom level the source serves. Default: 19
    #[serde(default = "default_max_tile_zoom")]
    pub max_zoom: u8,
    /// Subdomain letters substituted for `{s}`, if the template uses any.
    #[serde(default)]
    pub subdomains: Option<String>,
}

impl TileSource {
    /// OpenStreetMap standard raster tiles.
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
            subdomains: None,
        }
    }

    /// OpenTopoMap topographic tiles (max zoom 17).
    pub fn opentopomap() -> Self {
        Self {
            url_template: "https://tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenTopoMap (CC-BY-SA)".to_string(),
            max_zoom: 17,
            subdomains: None,
        }
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

/// How a layer's features are drawn.
///
/// `Polygon` is the catch-all for every non-point geometry; lines render as
/// unfilled paths on the surface but share the polygon decision logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    #[default]
    Polygon,
}

impl<'de> Deserialize<'de> for GeometryKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "point" => Self::Point,
            _ => Self::Polygon,
        })
    }
}

/// Where a layer's geometry comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Feature collection embedded in the configuration record.
    #[default]
    Inline,
    /// Arbitrary GeoJSON endpoint named by `source_url`.
    Url,
    /// Layer API endpoint derived from the layer id.
    Database,
}

/// Configuration for a single feature layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Stable identity; also names the endpoint for `database` sources.
    pub id: i64,
    pub name: String,
    /// Rendering mode for the layer's features. Default: polygon
    #[serde(default)]
    pub geometry: GeometryKind,
    #[serde(default)]
    pub source: SourceKind,
    /// Inline feature collection; takes priority over any URL.
    #[serde(default)]
    pub data: Option<FeatureCollection>,
    /// Endpoint for `url` sources; empty counts as unset.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Hidden layers are skipped during assembly. Default: true
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    #[serde(default)]
    pub label: Option<LabelConfig>,
    #[serde(default)]
    pub popup: Option<PopupConfig>,
    /// Zoom range within which the surface keeps the layer visible.
    #[serde(default)]
    pub min_zoom: Option<f64>,
    #[serde(default)]
    pub max_zoom: Option<f64>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            geometry: GeometryKind::default(),
            source: SourceKind::default(),
            data: None,
            source_url: None,
            visible: true,
            style: StyleConfig::default(),
            filter: None,
            label: None,
            popup: None,
            min_zoom: None,
            max_zoom: None,
        }
    }
}

/// Visual style for a layer, dispatched on the `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StyleConfig {
    /// One fixed style for every feature.
    Simple(StyleBase),
    /// Per-feature color chosen from a property value.
    Category {
        #[serde(flatten)]
        base: StyleBase,
        /// Property supplying the category value.
        #[serde(default)]
        field: Option<String>,
        /// Explicit value to color assignments. Unmapped values fall back to
        /// a deterministic hash color.
        #[serde(default)]
        color_map: HashMap<String, String>,
    },
    /// Numeric bucketing along a color ramp. The classification fields are
    /// stored but not consulted yet; these layers currently render exactly
    /// like `Simple`.
    Graduated {
        #[serde(flatten)]
        base: StyleBase,
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        buckets: Option<u32>,
        #[serde(default)]
        breaks: Vec<f64>,
        /// Ramp endpoints, low color to high color.
        #[serde(default)]
        ramp: Option<(String, String)>,
    },
}

impl StyleConfig {
    /// Shared style fields regardless of variant.
    #[inline]
    pub fn base(&self) -> &StyleBase {
        match self {
            Self::Simple(base) => base,
            Self::Category { base, .. } => base,
            Self::Graduated { base, .. } => base,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::Simple(StyleBase::default())
    }
}

/// Style fields shared by every [`StyleConfig`] variant.
///
/// Unset fields resolve to per-geometry defaults, and falsy values (zero
/// weight, zero radius, empty color strings) resolve the same way; stored
/// records rely on that, so an explicit `0` weight draws at the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleBase {
    /// Fill color for paths, marker color for points.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub stroke_weight: Option<f64>,
    #[serde(default)]
    pub fill_opacity: Option<f64>,
    /// Marker radius in pixels; ignored for paths.
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Include/exclude predicate over one feature property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Property the filter inspects; without it every feature passes.
    #[serde(default)]
    pub field: Option<String>,
    /// Values that always exclude a feature, taking precedence over `include`.
    #[serde(default)]
    pub exclude: Vec<Value>,
    /// When non-empty, only these values pass.
    #[serde(default)]
    pub include: Vec<Value>,
}

/// Where a label annotation attaches relative to its feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAnchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    Auto,
}

/// Permanent text annotations driven by one feature property.
///
/// The default visibility policy diverges by geometry: polygon layers label
/// everything except values in `exclude`, point layers label nothing except
/// values in `include`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub show: bool,
    /// Property supplying the label text.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub anchor: LabelAnchor,
    /// Extra CSS class on the annotation element.
    #[serde(default)]
    pub css_class: Option<String>,
    /// Font size in pixels. Default: 14
    #[serde(default)]
    pub font_size: Option<u32>,
    /// Default: #000000
    #[serde(default)]
    pub font_color: Option<String>,
    /// Default: sans-serif
    #[serde(default)]
    pub font_family: Option<String>,
    /// Default: normal
    #[serde(default)]
    pub font_weight: Option<String>,
    /// Point layers: values whose labels are shown.
    #[serde(default)]
    pub include: Vec<String>,
    /// Polygon layers: values whose labels are muted.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Click popups rendered from feature properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopupConfig {
    #[serde(default)]
    pub show: bool,
    #[serde(default)]
    pub mode: PopupMode,
    /// List mode: properties to show; empty means every property.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Template mode: text with `{propertyName}` placeholders.
    #[serde(default)]
    pub template: Option<String>,
}

/// How popup content is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupMode {
    /// Two-column table of property names and values.
    #[default]
    List,
    /// Free text with `{propertyName}` substitution.
    Template,
}

fn default_true() -> bool {
    true
}

fn default_max_tile_zoom() -> u8 {
    19
}
