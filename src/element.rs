//! Map elements: layers, features, geometry and the small value types
//! shared across the protocol.
//!
//! A layer descriptor is pure data; the handle to whatever the renderer
//! built for it lives in the model's layer entries, never here.

use serde::{Deserialize, Serialize};

use crate::style::StyleSelector;

/// A coordinate in the configured spatial reference system.
pub type Coordinate = [f64; 2];

/// A bounding box: `[min_x, min_y, max_x, max_y]`.
pub type Extent = [f64; 4];

/// Viewport size in pixels: `[width, height]`.
pub type Size = [u32; 2];

/// Which band of the layer stack a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerGroup {
    /// Background layers; candidates for the background chooser.
    Background,
    /// Ordinary data layers.
    Foreground,
    /// Transient tool layers (measuring sketch, drawing sketch, ...).
    Tools,
}

/// Settings for a WMS-backed layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsSettings {
    /// The WMS layer name as known by the service.
    pub name: String,
    /// Base URLs of the serving instances; opaque to the core.
    pub urls: Vec<String>,
    pub version: Option<String>,
    pub format: Option<String>,
    pub tile_size: Option<u32>,
}

/// Settings for a vector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSettings {
    pub selectable: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub style: Option<StyleSelector>,
}

/// The kind of data source behind a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Tiled WMS, served from a tile cache.
    TiledWms(WmsSettings),
    /// Plain (untiled) WMS.
    Wms(WmsSettings),
    /// Client-side vector data.
    Vector(VectorSettings),
    /// An empty layer, used as the "no background" choice.
    Blanco,
}

/// A named, ordered visual data source. The title is the primary key:
/// at most one layer with a given title exists in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub title: String,
    pub kind: LayerKind,
}

impl Layer {
    /// Whether this layer may be offered in the background chooser.
    pub fn background_capable(&self) -> bool {
        matches!(
            self.kind,
            LayerKind::TiledWms(_) | LayerKind::Wms(_) | LayerKind::Blanco
        )
    }
}

/// A geometry in map coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    /// Outer ring first, then holes.
    Polygon(Vec<Vec<Coordinate>>),
}

/// A feature on a vector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub geometry: Geometry,
    /// Free-form attributes, opaque to the core.
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// How pointer selection behaves on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    Multiple,
    #[default]
    None,
}

/// A pointer/draw interaction the renderer is asked to activate.
///
/// Removal matches on equality of the request, mirroring the original
/// protocol where the interaction object itself identified what to
/// remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionRequest {
    DrawPoint,
    DrawLine,
    DrawPolygon,
    Modify,
    Select,
}

/// A transient visual overlay (e.g. a measurement tooltip). Identified
/// by an issuer-chosen id so it can be removed without a return
/// message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: String,
    pub content: String,
    pub position: Option<Coordinate>,
}

/// An informational message shown over the map, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoMessage {
    pub id: String,
    pub title: String,
    pub content: String,
}
