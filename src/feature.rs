//! GeoJSON feature model
//!
//! Pass-through serde types for externally supplied feature collections. The
//! engine inspects the flat property dictionary and the geometry `type` tag;
//! coordinates stay untouched raw JSON and are handed to the rendering surface
//! verbatim, so any valid GeoJSON survives a round trip through this model.

use geo::{Coord, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An ordered collection of geographic features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// GeoJSON object type, retained for round-tripping.
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single geographic entity: geometry plus a flat property dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Properties drive every style, filter, label and popup decision.
    /// GeoJSON allows `"properties": null`; that reads as an empty dictionary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

/// Raw geometry: the `type` tag plus whatever members the object carries
/// (`coordinates`, nested `geometries`, foreign keys), kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub members: Map<String, Value>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: feature_collection_type(),
            features: Vec::new(),
        }
    }
}

impl FeatureCollection {
    /// Combined WGS84 bounding box of every feature, with longitude in `x`
    /// and latitude in `y`. `None` when no coordinate exists.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut tracker = BoundsTracker::new();
        for feature in &self.features {
            if let Some(geometry) = &feature.geometry {
                tracker.visit_geometry(geometry);
            }
        }
        tracker.finish()
    }
}

impl Feature {
    /// Look up a property by name.
    #[inline]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Stringified form of a property, as used for category lookups, label
    /// text and membership lists. Absent and `null` values stringify to the
    /// empty string.
    pub fn property_string(&self, name: &str) -> String {
        self.property(name).map(display_value).unwrap_or_default()
    }

    /// WGS84 bounding box of this feature's geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut tracker = BoundsTracker::new();
        if let Some(geometry) = &self.geometry {
            tracker.visit_geometry(geometry);
        }
        tracker.finish()
    }
}

/// Render a JSON value the way it reads in a flat property table: strings
/// bare, numbers and booleans in their JSON form, `null` empty.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Single-pass min/max accumulator over raw GeoJSON coordinate arrays.
pub(crate) struct BoundsTracker {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    any: bool,
}

impl BoundsTracker {
    pub(crate) fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            any: false,
        }
    }

    /// Fold one geometry's positions into the running bounds. Handles every
    /// GeoJSON geometry type, including nested `GeometryCollection`s.
    pub(crate) fn visit_geometry(&mut self, geometry: &Geometry) {
        if let Some(coordinates) = geometry.members.get("coordinates") {
            self.visit(coordinates);
        }
        if let Some(geometries) = geometry.members.get("geometries") {
            self.visit(geometries);
        }
    }

    /// The finished bounds, or `None` if no position was seen.
    pub(crate) fn finish(self) -> Option<Rect<f64>> {
        if !self.any {
            return None;
        }
        Some(Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        ))
    }

    // A position is an array whose first two elements are numbers; anything
    // else that is an array nests positions, and objects are geometries from
    // a GeometryCollection.
    fn visit(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                let position = (
                    items.first().and_then(Value::as_f64),
                    items.get(1).and_then(Value::as_f64),
                );
                if let (Some(x), Some(y)) = position {
                    self.push(x, y);
                } else {
                    for item in items {
                        self.visit(item);
                    }
                }
            }
            Value::Object(members) => {
                if let Some(coordinates) = members.get("coordinates") {
                    self.visit(coordinates);
                }
                if let Some(geometries) = members.get("geometries") {
                    self.visit(geometries);
                }
            }
            _ => {}
        }
    }

    fn push(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.any = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_collection(value: Value) -> FeatureCollection {
        serde_json::from_value(value).expect("valid feature collection")
    }

    #[test]
    fn test_parse_minimal_collection() {
        let collection = parse_collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [22.57, 51.25]},
                    "properties": {"name": "Lublin", "population": 339682}
                }
            ]
        }));

        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.property_string("name"), "Lublin");
        assert_eq!(feature.property_string("population"), "339682");
        assert_eq!(
            feature.geometry.as_ref().map(|g| g.kind.as_str()),
            Some("Point")
        );
    }

    #[test]
    fn test_null_and_missing_properties() {
        let collection = parse_collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": null},
                {"type": "Feature", "geometry": null}
            ]
        }));

        for feature in &collection.features {
            assert!(feature.properties.is_empty());
            assert_eq!(feature.property_string("anything"), "");
            assert!(feature.property("anything").is_none());
        }
    }

    #[test]
    fn test_property_stringification() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {
                "s": "text", "i": 42, "f": 1.5, "b": true, "n": null
            }
        }))
        .expect("valid feature");

        assert_eq!(feature.property_string("s"), "text");
        assert_eq!(feature.property_string("i"), "42");
        assert_eq!(feature.property_string("f"), "1.5");
        assert_eq!(feature.property_string("b"), "true");
        assert_eq!(feature.property_string("n"), "");
    }

    #[test]
    fn test_geometry_members_survive_round_trip() {
        let original = json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            },
            "properties": {}
        });

        let feature: Feature = serde_json::from_value(original.clone()).expect("valid feature");
        let back = serde_json::to_value(&feature).expect("serializable feature");
        assert_eq!(back["geometry"], original["geometry"]);
    }

    #[test]
    fn test_bounds_spans_all_features() {
        let collection = parse_collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [22.57, 51.25]},
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[19.94, 50.06], [21.01, 52.23]]
                    },
                    "properties": {}
                }
            ]
        }));

        let bounds = collection.bounds().expect("bounds");
        assert!((bounds.min().x - 19.94).abs() < 1e-9);
        assert!((bounds.min().y - 50.06).abs() < 1e-9);
        assert!((bounds.max().x - 22.57).abs() < 1e-9);
        assert!((bounds.max().y - 52.23).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_handles_geometry_collection() {
        let collection = parse_collection(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Point", "coordinates": [1.0, 2.0]},
                        {"type": "Point", "coordinates": [-3.0, 4.0]}
                    ]
                },
                "properties": {}
            }]
        }));

        let bounds = collection.bounds().expect("bounds");
        assert!((bounds.min().x - -3.0).abs() < 1e-9);
        assert!((bounds.max().y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_empty_collection() {
        assert!(FeatureCollection::default().bounds().is_none());

        let no_geometry = parse_collection(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": null, "properties": {}}]
        }));
        assert!(no_geometry.bounds().is_none());
    }
}
