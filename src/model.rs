//! The authoritative model: one snapshot of everything the widget
//! knows, replaced wholesale on every command application.
//!
//! Nothing outside the reducer mutates a model. The subscription
//! registry lives inside the model but is only touched through its own
//! operations.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::KaartConfig;
use crate::element::{
    Coordinate, Extent, InfoMessage, InteractionRequest, Layer, LayerGroup, SelectionMode, Size,
};
use crate::renderer::{ControlHandle, InteractionHandle, LayerHandle, OverlayHandle};
use crate::search::{SearchResultSink, Searcher};
use crate::subscription::SubscriptionRegistry;

/// Camera and viewport parameters. Center, zoom, extent and size are
/// optional until first computed or commanded.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub center: Option<Coordinate>,
    pub zoom: Option<f64>,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub extent: Option<Extent>,
    pub size: Option<Size>,
}

/// One layer in the stack: descriptor, group, visibility and the
/// renderer's handle. Position in the stack is the index in
/// [`KaartModel::layers`]; index 0 is drawn topmost.
#[derive(Debug, Clone)]
pub struct LayerEntry {
    pub layer: Layer,
    pub group: LayerGroup,
    pub visible: bool,
    pub handle: LayerHandle,
}

/// The single authoritative state snapshot.
pub struct KaartModel {
    pub config: KaartConfig,
    pub name: String,
    pub view: ViewState,

    /// Ordered layer stack; order determines draw order.
    pub layers: Vec<LayerEntry>,
    /// Title to render-handle index. Invariant: keys are exactly the
    /// titles present in `layers`.
    pub title_index: HashMap<String, LayerHandle>,

    /// Active pointer interactions, matched for removal by request
    /// equality.
    pub interactions: Vec<(InteractionRequest, InteractionHandle)>,
    /// The standard pan/zoom/rotate set, when active.
    pub std_interactions: Vec<InteractionHandle>,
    pub scroll_zoom_on_focus: bool,
    pub focused: bool,

    /// Open overlays, keyed by issuer-chosen id.
    pub overlays: HashMap<String, OverlayHandle>,

    pub scale: Option<ControlHandle>,
    pub fullscreen: Option<ControlHandle>,

    pub show_background_selector: bool,
    pub possible_backgrounds: Vec<Layer>,
    pub background_title: Option<String>,

    pub selection_mode: SelectionMode,
    /// Zoom level geolocation-style features should jump to, if set.
    pub my_location_zoom: Option<f64>,

    pub measuring: bool,
    pub drawing: bool,

    pub searchers: Vec<Box<dyn Searcher>>,
    pub search_sink: SearchResultSink,

    pub ui_elements: BTreeSet<String>,
    pub ui_element_options: BTreeMap<String, serde_json::Value>,
    pub info_messages: BTreeMap<String, InfoMessage>,

    pub subscriptions: SubscriptionRegistry,
}

impl KaartModel {
    /// Build the initial model from configuration.
    ///
    /// `search_sink` is where registered searchers deliver their
    /// results; the widget runtime re-enters them into the pipeline.
    pub fn new(config: KaartConfig, name: impl Into<String>, search_sink: SearchResultSink) -> Self {
        let defaults = &config.defaults;
        let view = ViewState {
            center: Some(defaults.center),
            zoom: Some(defaults.zoom),
            min_zoom: defaults.min_zoom,
            max_zoom: defaults.max_zoom,
            extent: Some(defaults.extent),
            size: Some(defaults.size),
        };
        Self {
            view,
            config,
            name: name.into(),
            layers: Vec::new(),
            title_index: HashMap::new(),
            interactions: Vec::new(),
            std_interactions: Vec::new(),
            scroll_zoom_on_focus: false,
            focused: false,
            overlays: HashMap::new(),
            scale: None,
            fullscreen: None,
            show_background_selector: false,
            possible_backgrounds: Vec::new(),
            background_title: None,
            selection_mode: SelectionMode::None,
            my_location_zoom: None,
            measuring: false,
            drawing: false,
            searchers: Vec::new(),
            search_sink,
            ui_elements: BTreeSet::new(),
            ui_element_options: BTreeMap::new(),
            info_messages: BTreeMap::new(),
            subscriptions: SubscriptionRegistry::new(),
        }
    }

    /// Position of a layer in the stack, by title.
    pub fn layer_position(&self, title: &str) -> Option<usize> {
        self.layers.iter().position(|entry| entry.layer.title == title)
    }

    pub fn has_layer(&self, title: &str) -> bool {
        self.title_index.contains_key(title)
    }

    /// A cheap, cloneable view of the model for host-side queries.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            name: self.name.clone(),
            view: self.view.clone(),
            layer_titles: self
                .layers
                .iter()
                .map(|entry| entry.layer.title.clone())
                .collect(),
            background_title: self.background_title.clone(),
            show_background_selector: self.show_background_selector,
            selection_mode: self.selection_mode,
            measuring: self.measuring,
            drawing: self.drawing,
            ui_elements: self.ui_elements.iter().cloned().collect(),
            subscription_count: self.subscriptions.len(),
        }
    }
}

impl std::fmt::Debug for KaartModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaartModel")
            .field("name", &self.name)
            .field("view", &self.view)
            .field("layers", &self.layers.len())
            .field("background_title", &self.background_title)
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

/// Read-only summary of the model, safe to hand across the actor
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    pub name: String,
    pub view: ViewState,
    pub layer_titles: Vec<String>,
    pub background_title: Option<String>,
    pub show_background_selector: bool,
    pub selection_mode: SelectionMode,
    pub measuring: bool,
    pub drawing: bool,
    pub ui_elements: Vec<String>,
    pub subscription_count: usize,
}
