//! Interactive map widget core.
//!
//! The crate implements the command-driven heart of a map widget:
//! consumers dispatch [`Command`]s, a pure reducer folds each command
//! into the authoritative [`KaartModel`], and outcomes travel back
//! through caller-supplied wrapper functions as values of the caller's
//! own message type. Rendering is delegated to a [`MapRenderer`]
//! implementation; the core never draws.
//!
//! # Architecture
//!
//! - [`Command`] is the closed instruction protocol, tagged with the
//!   Dutch wire vocabulary (`VoegLaagToe`, `VeranderZoom`, ...).
//! - [`reduce`] applies one command to one model, deterministically.
//! - [`SubscriptionRegistry`] fans internal notifications out to
//!   registered listeners, without replay.
//! - [`KaartBuilder`] spawns the widget actor that serializes command
//!   application and replays recent outbound messages to late
//!   subscribers.
//!
//! # Example
//!
//! ```no_run
//! use kaart_core::{
//!     BareWrapper, Command, KaartBuilder, KaartMsg, Layer, LayerGroup, LayerKind, MapRenderer,
//!     Validation, WmsSettings,
//! };
//!
//! #[derive(Debug, Clone)]
//! enum AppMsg {
//!     LayerAdded(Validation<()>),
//! }
//! impl KaartMsg for AppMsg {}
//!
//! # async fn demo(renderer: Box<dyn MapRenderer>) {
//! let (kaart, _changes) = KaartBuilder::new().name("dienstkaart").spawn::<AppMsg>(renderer);
//!
//! kaart
//!     .dispatch(Command::AddLayer {
//!         position: 0,
//!         layer: Layer {
//!             title: "Dienstkaart".into(),
//!             kind: LayerKind::TiledWms(WmsSettings {
//!                 name: "dienstkaart".into(),
//!                 urls: vec!["https://example.test/wms".into()],
//!                 version: None,
//!                 format: Some("image/png".into()),
//!                 tile_size: Some(256),
//!             }),
//!         },
//!         visible: true,
//!         group: LayerGroup::Background,
//!         wrapper: BareWrapper::new(AppMsg::LayerAdded),
//!     })
//!     .unwrap();
//! # }
//! ```

pub mod changes;
pub mod command;
pub mod config;
pub mod element;
pub mod message;
pub mod model;
pub mod reducer;
pub mod renderer;
pub mod replay;
pub mod runtime;
pub mod search;
pub mod style;
pub mod subscription;
pub mod validation;
pub mod wrapper;

pub use changes::{ModelChange, ModelChanger};
pub use command::{Command, MessageGenerator, SubscriptionRequest};
pub use config::{KaartConfig, OrthoConfig, ServiceConfig, ViewDefaults};
pub use element::{
    Coordinate, Extent, Feature, Geometry, InfoMessage, InteractionRequest, Layer, LayerGroup,
    LayerKind, Overlay, SelectionMode, Size, VectorSettings, WmsSettings,
};
pub use message::{InternalMsg, InternalSubMsg, KaartMsg, internal, log_only_wrapper, subscribed_wrapper};
pub use model::{KaartModel, LayerEntry, ModelSnapshot, ViewState};
pub use reducer::reduce;
pub use renderer::{ControlHandle, InteractionHandle, LayerHandle, MapRenderer, OverlayHandle};
pub use replay::{ReplayBuffer, ReplayConfig};
pub use runtime::{DispatchError, KaartBuilder, KaartHandle};
pub use search::{SearchInput, SearchResult, SearchResultSink, SearchResults, Searcher};
pub use style::{
    CircleSpec, FillSpec, StrokeSpec, StyleSelector, StyleSpec, definition_to_style,
};
pub use subscription::{Listener, SubscriptionKind, SubscriptionRegistry, SubscriptionResult};
pub use validation::{Failure, Validation, fail};
pub use wrapper::{BareWrapper, ValueWrapper};
