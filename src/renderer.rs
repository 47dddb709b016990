//! The rendering collaborator.
//!
//! The core never draws; it describes. [`MapRenderer`] is the seam to
//! whatever engine actually puts pixels on screen. Handles returned by
//! the renderer are opaque to the core and stored in the model so later
//! commands can refer back to what was built.

use crate::element::{
    Coordinate, Extent, Feature, InteractionRequest, Layer, Overlay, SelectionMode, Size,
};
use crate::style::StyleSelector;

/// Opaque handle to a drawn layer, owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Opaque handle to an active interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionHandle(pub u64);

/// Opaque handle to a visual overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Opaque handle to a chrome control (scale bar, fullscreen button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandle(pub u64);

/// External rendering engine driven by the reducer's command handlers.
///
/// All calls happen on the widget actor, one command at a time, so
/// implementations need no internal locking. Methods are infallible by
/// contract: a renderer that cannot honor a request should log and
/// degrade, not panic -- validation happened before the call.
pub trait MapRenderer: Send {
    fn add_layer(&mut self, layer: &Layer, position: usize, visible: bool) -> LayerHandle;
    fn remove_layer(&mut self, handle: LayerHandle);
    fn move_layer(&mut self, handle: LayerHandle, to_position: usize);
    fn set_layer_visible(&mut self, handle: LayerHandle, visible: bool);
    fn replace_features(&mut self, handle: LayerHandle, features: &[Feature]);
    fn set_layer_style(
        &mut self,
        handle: LayerHandle,
        style: &StyleSelector,
        selection_style: Option<&StyleSelector>,
    );

    fn set_center(&mut self, center: Coordinate);
    fn set_zoom(&mut self, zoom: f64);
    fn fit_extent(&mut self, extent: Extent);
    fn set_viewport(&mut self, size: Size);
    fn set_focus(&mut self, focused: bool);

    fn add_interaction(&mut self, interaction: &InteractionRequest) -> InteractionHandle;
    fn remove_interaction(&mut self, handle: InteractionHandle);
    /// Activate the standard pan/zoom/rotate set.
    fn add_standard_interactions(&mut self, scroll_zoom_on_focus: bool) -> Vec<InteractionHandle>;

    fn add_overlay(&mut self, overlay: &Overlay) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);

    fn add_scale_control(&mut self) -> ControlHandle;
    fn add_fullscreen_control(&mut self) -> ControlHandle;
    fn remove_control(&mut self, handle: ControlHandle);

    fn set_selection_mode(&mut self, mode: SelectionMode);
    fn deselect_feature(&mut self, feature_id: &str);

    /// Abandon in-flight tile requests. Fire-and-forget.
    fn abort_tile_loading(&mut self);

    /// Detach the rendering surface at widget teardown.
    fn release(&mut self);
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Every renderer call, recorded for assertions.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum RendererCall {
        AddLayer {
            title: String,
            position: usize,
            visible: bool,
        },
        RemoveLayer(LayerHandle),
        MoveLayer(LayerHandle, usize),
        SetLayerVisible(LayerHandle, bool),
        ReplaceFeatures(LayerHandle, usize),
        SetLayerStyle(LayerHandle),
        SetCenter(Coordinate),
        SetZoom(f64),
        FitExtent(Extent),
        SetViewport(Size),
        SetFocus(bool),
        AddInteraction(InteractionRequest),
        RemoveInteraction(InteractionHandle),
        AddStandardInteractions(bool),
        AddOverlay(String),
        RemoveOverlay(OverlayHandle),
        AddScaleControl,
        AddFullscreenControl,
        RemoveControl(ControlHandle),
        SetSelectionMode(SelectionMode),
        DeselectFeature(String),
        AbortTileLoading,
        Release,
    }

    /// A renderer that assigns sequential handles and records calls.
    ///
    /// The call log is behind an `Arc` so tests keep a view after the
    /// renderer moves into the widget actor.
    pub(crate) struct RecordingRenderer {
        next_handle: u64,
        pub calls: Arc<Mutex<Vec<RendererCall>>>,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self {
                next_handle: 1,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn next(&mut self) -> u64 {
            let handle = self.next_handle;
            self.next_handle += 1;
            handle
        }

        fn log(&self, call: RendererCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl MapRenderer for RecordingRenderer {
        fn add_layer(&mut self, layer: &Layer, position: usize, visible: bool) -> LayerHandle {
            self.log(RendererCall::AddLayer {
                title: layer.title.clone(),
                position,
                visible,
            });
            LayerHandle(self.next())
        }

        fn remove_layer(&mut self, handle: LayerHandle) {
            self.log(RendererCall::RemoveLayer(handle));
        }

        fn move_layer(&mut self, handle: LayerHandle, to_position: usize) {
            self.log(RendererCall::MoveLayer(handle, to_position));
        }

        fn set_layer_visible(&mut self, handle: LayerHandle, visible: bool) {
            self.log(RendererCall::SetLayerVisible(handle, visible));
        }

        fn replace_features(&mut self, handle: LayerHandle, features: &[Feature]) {
            self.log(RendererCall::ReplaceFeatures(handle, features.len()));
        }

        fn set_layer_style(
            &mut self,
            handle: LayerHandle,
            _style: &StyleSelector,
            _selection_style: Option<&StyleSelector>,
        ) {
            self.log(RendererCall::SetLayerStyle(handle));
        }

        fn set_center(&mut self, center: Coordinate) {
            self.log(RendererCall::SetCenter(center));
        }

        fn set_zoom(&mut self, zoom: f64) {
            self.log(RendererCall::SetZoom(zoom));
        }

        fn fit_extent(&mut self, extent: Extent) {
            self.log(RendererCall::FitExtent(extent));
        }

        fn set_viewport(&mut self, size: Size) {
            self.log(RendererCall::SetViewport(size));
        }

        fn set_focus(&mut self, focused: bool) {
            self.log(RendererCall::SetFocus(focused));
        }

        fn add_interaction(&mut self, interaction: &InteractionRequest) -> InteractionHandle {
            self.log(RendererCall::AddInteraction(interaction.clone()));
            InteractionHandle(self.next())
        }

        fn remove_interaction(&mut self, handle: InteractionHandle) {
            self.log(RendererCall::RemoveInteraction(handle));
        }

        fn add_standard_interactions(
            &mut self,
            scroll_zoom_on_focus: bool,
        ) -> Vec<InteractionHandle> {
            self.log(RendererCall::AddStandardInteractions(scroll_zoom_on_focus));
            // Pan, zoom and rotate.
            (0..3).map(|_| InteractionHandle(self.next())).collect()
        }

        fn add_overlay(&mut self, overlay: &Overlay) -> OverlayHandle {
            self.log(RendererCall::AddOverlay(overlay.id.clone()));
            OverlayHandle(self.next())
        }

        fn remove_overlay(&mut self, handle: OverlayHandle) {
            self.log(RendererCall::RemoveOverlay(handle));
        }

        fn add_scale_control(&mut self) -> ControlHandle {
            self.log(RendererCall::AddScaleControl);
            ControlHandle(self.next())
        }

        fn add_fullscreen_control(&mut self) -> ControlHandle {
            self.log(RendererCall::AddFullscreenControl);
            ControlHandle(self.next())
        }

        fn remove_control(&mut self, handle: ControlHandle) {
            self.log(RendererCall::RemoveControl(handle));
        }

        fn set_selection_mode(&mut self, mode: SelectionMode) {
            self.log(RendererCall::SetSelectionMode(mode));
        }

        fn deselect_feature(&mut self, feature_id: &str) {
            self.log(RendererCall::DeselectFeature(feature_id.to_string()));
        }

        fn abort_tile_loading(&mut self) {
            self.log(RendererCall::AbortTileLoading);
        }

        fn release(&mut self) {
            self.log(RendererCall::Release);
        }
    }
}
