//! Outbound message protocol.
//!
//! The core is generic over the host's message type `Msg: KaartMsg`;
//! components inside the library use [`InternalMsg`], whose payload is
//! the closed [`InternalSubMsg`] union fanned out to the subscription
//! registry.

use crate::element::{Geometry, Layer};
use crate::search::{SearchResult, SearchResults};
use crate::subscription::{SubscriptionKind, SubscriptionResult};
use crate::validation::Validation;
use crate::wrapper::{BareWrapper, ValueWrapper};

/// Marker trait for message types produced by wrappers.
///
/// Messages are ephemeral values: cloned into the replay buffer and
/// moved across the widget's channels, nothing more.
pub trait KaartMsg: Clone + Send + 'static {}

/// The library's own message envelope for intra-widget communication.
///
/// A payload of `None` means "outcome noted, nothing to deliver" -- the
/// shape produced by [`log_only_wrapper`].
#[derive(Debug, Clone)]
pub struct InternalMsg {
    pub payload: Option<InternalSubMsg>,
}

impl KaartMsg for InternalMsg {}

/// Closed union of intra-widget notifications.
#[derive(Debug, Clone)]
pub enum InternalSubMsg {
    /// The candidate background layers were (re)published.
    BackgroundLayersSet { layers: Vec<Layer> },
    /// A background layer was chosen.
    BackgroundTitleSet { title: String },
    /// The measure tool was toggled.
    MeasuringToggled { active: bool },
    /// The drawing tool was toggled.
    DrawingToggled { active: bool },
    /// A sketch geometry changed while measuring or drawing.
    GeometryChanged { geometry: Geometry },
    /// A searcher delivered its results.
    SearchResultsReceived { results: SearchResults },
    /// The user clicked a search result.
    SearchResultClicked { result: SearchResult },
    /// A subscription request was processed.
    Subscribed {
        result: Validation<SubscriptionResult>,
    },
}

impl InternalSubMsg {
    /// The registry kind this sub-message is delivered under.
    pub fn kind(&self) -> SubscriptionKind {
        match self {
            InternalSubMsg::BackgroundLayersSet { .. } => SubscriptionKind::BackgroundLayers,
            InternalSubMsg::BackgroundTitleSet { .. } => SubscriptionKind::BackgroundTitle,
            InternalSubMsg::MeasuringToggled { .. } => SubscriptionKind::Measuring,
            InternalSubMsg::DrawingToggled { .. } => SubscriptionKind::Drawing,
            InternalSubMsg::GeometryChanged { .. } => SubscriptionKind::Geometry,
            InternalSubMsg::SearchResultsReceived { .. } => SubscriptionKind::SearchResults,
            InternalSubMsg::SearchResultClicked { .. } => SubscriptionKind::SearchResultClicked,
            InternalSubMsg::Subscribed { .. } => SubscriptionKind::Subscribed,
        }
    }
}

/// Wrap a sub-message in the internal envelope.
pub fn internal(sub_msg: InternalSubMsg) -> InternalMsg {
    InternalMsg {
        payload: Some(sub_msg),
    }
}

/// Wrapper for fire-and-forget internal callers: failures are recorded
/// centrally, successes produce no payload.
pub fn log_only_wrapper() -> BareWrapper<InternalMsg> {
    BareWrapper::new(|outcome| {
        if let Err(failure) = outcome {
            tracing::error!(error = %failure, "command failed");
        }
        InternalMsg { payload: None }
    })
}

/// Wrapper that surfaces the subscription acknowledgement as an
/// internal sub-message, success or failure alike.
pub fn subscribed_wrapper() -> ValueWrapper<SubscriptionResult, InternalMsg> {
    ValueWrapper::new(|result| internal(InternalSubMsg::Subscribed { result }))
}
