//! Secondary outbound channel for cross-cutting model-change
//! notifications.
//!
//! Distinct from the primary command-result message so the reducer's
//! contract (command in, model + message out) stays testable without
//! the notification fan-out. Egress only: nothing read from this
//! channel feeds back into the command stream.

use tokio::sync::mpsc;

use crate::element::{Coordinate, Extent, SelectionMode, Size};

/// A cross-cutting notification about the model, consumed by UI
/// fragments outside the core.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChange {
    ZoomSettingsChanged {
        zoom: f64,
        min_zoom: f64,
        max_zoom: f64,
    },
    CenterChanged {
        center: Coordinate,
    },
    ExtentChanged {
        extent: Extent,
    },
    ViewportChanged {
        size: Size,
    },
    FocusChanged {
        focused: bool,
    },
    SelectionModeChanged {
        mode: SelectionMode,
    },
    /// An optional UI element was switched on or off.
    UiElementToggled {
        name: String,
        enabled: bool,
    },
}

/// Write-only emitter handed to the reducer.
///
/// Emitting never blocks and never fails visibly: if the consumer is
/// gone the notification is dropped.
#[derive(Debug, Clone)]
pub struct ModelChanger {
    tx: mpsc::UnboundedSender<ModelChange>,
}

impl ModelChanger {
    /// Create an emitter and the receiving end for the consumer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ModelChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// An emitter with no consumer, for one-shot reductions in tests.
    pub fn disconnected() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    /// Publish one change notification.
    pub fn emit(&self, change: ModelChange) {
        let _ = self.tx.send(change);
    }
}
