//! The closed command protocol: the binding contract between the core
//! and any consumer.
//!
//! Each variant is immutable data constructed once by the issuer.
//! Wrapper-bearing commands get their outcome back through the wrapper;
//! the remaining variants are fire-and-forget and never produce an
//! outbound message. [`Command::tag`] exposes the wire vocabulary used
//! for logging and span naming -- the enum itself is not serializable
//! because wrappers are function values.

use std::collections::BTreeSet;

use crate::element::{
    Coordinate, Extent, Feature, InfoMessage, InteractionRequest, Layer, LayerGroup, Overlay,
    SelectionMode, Size,
};
use crate::message::KaartMsg;
use crate::search::{SearchInput, SearchResult, Searcher};
use crate::style::StyleSelector;
use crate::subscription::{Listener, SubscriptionKind, SubscriptionResult};
use crate::wrapper::{BareWrapper, ValueWrapper};

/// Produces the message to send when an info message is closed by the
/// user; `None` means "nothing to say".
pub type MessageGenerator<Msg> = Box<dyn Fn() -> Option<Msg> + Send>;

/// What a subscriber wants to observe, and under which name.
pub struct SubscriptionRequest {
    pub kind: SubscriptionKind,
    pub subscriber_name: String,
    pub listener: Listener,
}

impl SubscriptionRequest {
    pub fn new(
        kind: SubscriptionKind,
        subscriber_name: impl Into<String>,
        listener: Listener,
    ) -> Self {
        Self {
            kind,
            subscriber_name: subscriber_name.into(),
            listener,
        }
    }
}

impl std::fmt::Debug for SubscriptionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRequest")
            .field("kind", &self.kind)
            .field("subscriber_name", &self.subscriber_name)
            .finish()
    }
}

/// An instruction to change widget state or invoke an external
/// capability, generic over the issuer's message type.
pub enum Command<Msg: KaartMsg> {
    // -- subscriptions ---------------------------------------------------
    Subscribe {
        request: SubscriptionRequest,
        wrapper: ValueWrapper<SubscriptionResult, Msg>,
    },
    Unsubscribe {
        result: SubscriptionResult,
    },

    // -- layer management --------------------------------------------------
    AddLayer {
        position: usize,
        layer: Layer,
        visible: bool,
        group: LayerGroup,
        wrapper: BareWrapper<Msg>,
    },
    RemoveLayer {
        title: String,
        wrapper: BareWrapper<Msg>,
    },
    MoveLayer {
        title: String,
        to_position: usize,
        wrapper: BareWrapper<Msg>,
    },
    ReplaceFeatures {
        title: String,
        features: Vec<Feature>,
        wrapper: BareWrapper<Msg>,
    },
    ShowLayer {
        title: String,
        wrapper: BareWrapper<Msg>,
    },
    HideLayer {
        title: String,
        wrapper: BareWrapper<Msg>,
    },
    SetLayerStyle {
        title: String,
        style: StyleSelector,
        selection_style: Option<StyleSelector>,
        wrapper: BareWrapper<Msg>,
    },

    // -- view control -------------------------------------------------------
    ChangeCenter {
        center: Coordinate,
    },
    ChangeZoom {
        zoom: f64,
        wrapper: BareWrapper<Msg>,
    },
    ChangeExtent {
        extent: Extent,
    },
    ChangeViewport {
        size: Size,
    },
    FocusOnMap,
    LoseFocusOnMap,

    // -- interactions and overlays --------------------------------------------
    AddInteraction {
        interaction: InteractionRequest,
    },
    RemoveInteraction {
        interaction: InteractionRequest,
    },
    AddStandardInteractions {
        scroll_zoom_on_focus: bool,
        wrapper: BareWrapper<Msg>,
    },
    RemoveStandardInteractions {
        wrapper: BareWrapper<Msg>,
    },
    AddOverlay {
        overlay: Overlay,
    },
    RemoveOverlays {
        ids: Vec<String>,
    },
    SetSelectionMode {
        mode: SelectionMode,
    },
    DeselectFeature {
        id: String,
    },

    // -- chrome -------------------------------------------------------------
    RequestScale {
        wrapper: BareWrapper<Msg>,
    },
    AddScaleControl {
        wrapper: BareWrapper<Msg>,
    },
    RemoveScaleControl {
        wrapper: BareWrapper<Msg>,
    },
    AddFullscreenControl {
        wrapper: BareWrapper<Msg>,
    },
    RemoveFullscreenControl {
        wrapper: BareWrapper<Msg>,
    },
    ShowBackgroundChooser {
        wrapper: BareWrapper<Msg>,
    },
    HideBackgroundChooser {
        wrapper: BareWrapper<Msg>,
    },
    ChooseBackground {
        title: String,
        wrapper: BareWrapper<Msg>,
    },

    // -- search ---------------------------------------------------------------
    AddSearcher {
        searcher: Box<dyn Searcher>,
        wrapper: BareWrapper<Msg>,
    },
    RemoveSearcher {
        name: String,
        wrapper: BareWrapper<Msg>,
    },
    Search {
        input: SearchInput,
        searchers: BTreeSet<String>,
        wrapper: BareWrapper<Msg>,
    },
    SearchResultClicked {
        result: SearchResult,
    },

    // -- messaging / UI glue -----------------------------------------------
    ReportComponentError {
        errors: Vec<String>,
    },
    SetMyLocationZoom {
        target: Option<f64>,
    },
    AddUiElement {
        name: String,
    },
    RemoveUiElement {
        name: String,
    },
    SetUiElementOptions {
        name: String,
        options: serde_json::Value,
    },
    ShowInfoMessage {
        message: InfoMessage,
    },
    HideInfoMessage {
        id: String,
    },
    CloseInfoMessage {
        id: String,
        msg_gen: MessageGenerator<Msg>,
    },

    // -- tools ----------------------------------------------------------------
    ToggleMeasuring {
        active: bool,
    },
    ToggleDrawing {
        active: bool,
    },
    PublishGeometry {
        geometry: crate::element::Geometry,
    },

    // -- maintenance -------------------------------------------------------
    AbortTileLoading,
}

impl<Msg: KaartMsg> Command<Msg> {
    /// The wire tag of this command, the string-discriminated
    /// vocabulary shared with the original protocol.
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Subscribe { .. } => "Subscription",
            Command::Unsubscribe { .. } => "Unsubscription",
            Command::AddLayer { .. } => "VoegLaagToe",
            Command::RemoveLayer { .. } => "VerwijderLaag",
            Command::MoveLayer { .. } => "VerplaatsLaag",
            Command::ReplaceFeatures { .. } => "VervangFeatures",
            Command::ShowLayer { .. } => "MaakLaagZichtbaar",
            Command::HideLayer { .. } => "MaakLaagOnzichtbaar",
            Command::SetLayerStyle { .. } => "ZetStijlVoorLaag",
            Command::ChangeCenter { .. } => "VeranderMiddelpunt",
            Command::ChangeZoom { .. } => "VeranderZoom",
            Command::ChangeExtent { .. } => "VeranderExtent",
            Command::ChangeViewport { .. } => "VeranderViewport",
            Command::FocusOnMap => "FocusOpKaart",
            Command::LoseFocusOnMap => "VerliesFocusOpKaart",
            Command::AddInteraction { .. } => "VoegInteractieToe",
            Command::RemoveInteraction { .. } => "VerwijderInteractie",
            Command::AddStandardInteractions { .. } => "VoegStandaardInteractiesToe",
            Command::RemoveStandardInteractions { .. } => "VerwijderStandaardInteracties",
            Command::AddOverlay { .. } => "VoegOverlayToe",
            Command::RemoveOverlays { .. } => "VerwijderOverlays",
            Command::SetSelectionMode { .. } => "ActiveerSelectieModus",
            Command::DeselectFeature { .. } => "DeselecteerFeature",
            Command::RequestScale { .. } => "VraagSchaalAan",
            Command::AddScaleControl { .. } => "VoegSchaalToe",
            Command::RemoveScaleControl { .. } => "VerwijderSchaal",
            Command::AddFullscreenControl { .. } => "VoegVolledigSchermToe",
            Command::RemoveFullscreenControl { .. } => "VerwijderVolledigScherm",
            Command::ShowBackgroundChooser { .. } => "ToonAchtergrondKeuze",
            Command::HideBackgroundChooser { .. } => "VerbergAchtergrondKeuze",
            Command::ChooseBackground { .. } => "KiesAchtergrond",
            Command::AddSearcher { .. } => "VoegZoekerToe",
            Command::RemoveSearcher { .. } => "VerwijderZoeker",
            Command::Search { .. } => "Zoek",
            Command::SearchResultClicked { .. } => "ZoekGeklikt",
            Command::ReportComponentError { .. } => "MeldComponentFout",
            Command::SetMyLocationZoom { .. } => "ZetMijnLocatieZoomStatus",
            Command::AddUiElement { .. } => "VoegUiElementToe",
            Command::RemoveUiElement { .. } => "VerwijderUiElement",
            Command::SetUiElementOptions { .. } => "ZetUiElementOpties",
            Command::ShowInfoMessage { .. } => "ToonInfoBoodschap",
            Command::HideInfoMessage { .. } => "VerbergInfoBoodschap",
            Command::CloseInfoMessage { .. } => "SluitInfoBoodschap",
            Command::ToggleMeasuring { .. } => "MetenLengteOppervlakte",
            Command::ToggleDrawing { .. } => "Tekenen",
            Command::PublishGeometry { .. } => "PublishGeometry",
            Command::AbortTileLoading => "AbortTileLoading",
        }
    }
}

impl<Msg: KaartMsg> std::fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("tag", &self.tag()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LayerKind;
    use crate::message::{InternalMsg, log_only_wrapper};

    #[test]
    fn tags_match_the_wire_vocabulary() {
        let cmd: Command<InternalMsg> = Command::AddLayer {
            position: 0,
            layer: Layer {
                title: "Ortho".into(),
                kind: LayerKind::Blanco,
            },
            visible: true,
            group: LayerGroup::Background,
            wrapper: log_only_wrapper(),
        };
        assert_eq!(cmd.tag(), "VoegLaagToe");

        let cmd: Command<InternalMsg> = Command::ChangeZoom {
            zoom: 4.0,
            wrapper: log_only_wrapper(),
        };
        assert_eq!(cmd.tag(), "VeranderZoom");

        let cmd: Command<InternalMsg> = Command::AbortTileLoading;
        assert_eq!(cmd.tag(), "AbortTileLoading");
    }

    #[test]
    fn debug_shows_tag_only() {
        let cmd: Command<InternalMsg> = Command::FocusOnMap;
        assert_eq!(format!("{cmd:?}"), r#"Command { tag: "FocusOpKaart" }"#);
    }
}
