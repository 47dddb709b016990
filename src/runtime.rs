//! The widget runtime: one actor task owning the model and the
//! renderer, fed by a command channel.
//!
//! Commands are applied strictly in arrival order; each application
//! replaces the model wholesale and publishes the wrapper's message, if
//! any, to the replay buffer. Search results delivered by registered
//! searchers re-enter the pipeline here and fan out through the
//! subscription registry.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::Instrument;

use crate::changes::{ModelChange, ModelChanger};
use crate::command::Command;
use crate::config::KaartConfig;
use crate::message::{InternalSubMsg, KaartMsg};
use crate::model::{KaartModel, ModelSnapshot};
use crate::reducer::reduce;
use crate::renderer::MapRenderer;
use crate::replay::{ReplayBuffer, ReplayConfig};
use crate::search::{SearchResultSink, SearchResults};

/// Error returned when the widget actor has stopped.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("kaart widget is no longer running")]
    WidgetGone,
}

enum WidgetMessage<Msg: KaartMsg> {
    Dispatch { cmd: Command<Msg> },
    Snapshot { reply: oneshot::Sender<ModelSnapshot> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Handle to a running widget.
///
/// Cheap to clone; every clone feeds the same actor. Dropping the last
/// handle stops the actor and releases the renderer.
pub struct KaartHandle<Msg: KaartMsg> {
    tx: mpsc::UnboundedSender<WidgetMessage<Msg>>,
    messages: Arc<ReplayBuffer<Msg>>,
}

impl<Msg: KaartMsg> Clone for KaartHandle<Msg> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            messages: self.messages.clone(),
        }
    }
}

impl<Msg: KaartMsg> std::fmt::Debug for KaartHandle<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaartHandle")
            .field("messages", &self.messages)
            .finish()
    }
}

impl<Msg: KaartMsg> KaartHandle<Msg> {
    /// Enqueue one command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WidgetGone`] when the actor has stopped.
    pub fn dispatch(&self, cmd: Command<Msg>) -> Result<(), DispatchError> {
        self.tx
            .send(WidgetMessage::Dispatch { cmd })
            .map_err(|_| DispatchError::WidgetGone)
    }

    /// Ask the actor for a read-only snapshot of the current model.
    ///
    /// The snapshot reflects every command dispatched on this handle
    /// before the call.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WidgetGone`] when the actor has stopped.
    pub async fn snapshot(&self) -> Result<ModelSnapshot, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WidgetMessage::Snapshot { reply })
            .map_err(|_| DispatchError::WidgetGone)?;
        rx.await.map_err(|_| DispatchError::WidgetGone)
    }

    /// Open a stream over the widget's outbound messages, starting with
    /// the replay buffer's retained window.
    pub fn messages(&self) -> UnboundedReceiverStream<Msg> {
        UnboundedReceiverStream::new(self.messages.subscribe())
    }

    /// Stop the actor, releasing the renderer. Resolves once teardown
    /// is complete; commands dispatched afterwards fail.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WidgetGone`] when the actor had already
    /// stopped.
    pub async fn shutdown(&self) -> Result<(), DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WidgetMessage::Shutdown { reply })
            .map_err(|_| DispatchError::WidgetGone)?;
        rx.await.map_err(|_| DispatchError::WidgetGone)
    }
}

/// Builder for a widget runtime.
#[derive(Debug, Clone)]
pub struct KaartBuilder {
    config: KaartConfig,
    name: String,
    replay: ReplayConfig,
}

impl Default for KaartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KaartBuilder {
    pub fn new() -> Self {
        Self {
            config: KaartConfig::default(),
            name: "kaart".to_string(),
            replay: ReplayConfig::default(),
        }
    }

    /// Replace the Flanders default configuration.
    pub fn config(mut self, config: KaartConfig) -> Self {
        self.config = config;
        self
    }

    /// Widget instance name, used in spans and diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Retention bounds of the outbound message replay buffer.
    pub fn replay(mut self, replay: ReplayConfig) -> Self {
        self.replay = replay;
        self
    }

    /// Spawn the widget actor on the current tokio runtime.
    ///
    /// Returns the command handle and the receiving end of the
    /// model-change notification channel.
    pub fn spawn<Msg: KaartMsg>(
        self,
        renderer: Box<dyn MapRenderer>,
    ) -> (KaartHandle<Msg>, mpsc::UnboundedReceiver<ModelChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (changer, changes_rx) = ModelChanger::channel();
        let (search_sink, search_rx) = SearchResultSink::channel();
        let messages = Arc::new(ReplayBuffer::new(self.replay));

        let model = KaartModel::new(self.config, self.name.clone(), search_sink);
        let actor_messages = messages.clone();
        let span = tracing::info_span!("kaart", name = %self.name);
        tokio::spawn(
            run(model, renderer, rx, search_rx, changer, actor_messages).instrument(span),
        );

        (KaartHandle { tx, messages }, changes_rx)
    }
}

async fn run<Msg: KaartMsg>(
    mut model: KaartModel,
    mut renderer: Box<dyn MapRenderer>,
    mut rx: mpsc::UnboundedReceiver<WidgetMessage<Msg>>,
    mut search_rx: mpsc::UnboundedReceiver<SearchResults>,
    changer: ModelChanger,
    messages: Arc<ReplayBuffer<Msg>>,
) {
    tracing::info!("widget started");

    loop {
        tokio::select! {
            widget_msg = rx.recv() => match widget_msg {
                Some(WidgetMessage::Dispatch { cmd }) => {
                    let (next, msg) = reduce(model, cmd, &changer, renderer.as_mut());
                    model = next;
                    if let Some(msg) = msg {
                        messages.publish(msg);
                    }
                }
                Some(WidgetMessage::Snapshot { reply }) => {
                    let _ = reply.send(model.snapshot());
                }
                Some(WidgetMessage::Shutdown { reply }) => {
                    renderer.release();
                    tracing::info!("widget stopped");
                    let _ = reply.send(());
                    return;
                }
                None => {
                    renderer.release();
                    tracing::info!("all handles dropped, widget stopped");
                    return;
                }
            },
            // The model owns a sink clone, so this branch never closes
            // while the loop runs.
            Some(results) = search_rx.recv() => {
                tracing::debug!(searcher = %results.searcher, hits = results.results.len(), "search results received");
                model
                    .subscriptions
                    .publish(&InternalSubMsg::SearchResultsReceived { results });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio_stream::StreamExt;

    use super::*;
    use crate::command::SubscriptionRequest;
    use crate::element::{Layer, LayerGroup, LayerKind, VectorSettings};
    use crate::message::{InternalMsg, internal, log_only_wrapper, subscribed_wrapper};
    use crate::renderer::test_fixtures::{RecordingRenderer, RendererCall};
    use crate::search::SearchInput;
    use crate::search::test_fixtures::EchoSearcher;
    use crate::subscription::SubscriptionKind;
    use crate::validation::Validation;
    use crate::wrapper::BareWrapper;

    fn vector_layer(title: &str) -> Layer {
        Layer {
            title: title.into(),
            kind: LayerKind::Vector(VectorSettings {
                selectable: false,
                min_zoom: 2.0,
                max_zoom: 15.0,
                style: None,
            }),
        }
    }

    fn add_layer_cmd(title: &str) -> Command<InternalMsg> {
        Command::AddLayer {
            position: 0,
            layer: vector_layer(title),
            visible: true,
            group: LayerGroup::Foreground,
            wrapper: log_only_wrapper(),
        }
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn commands_apply_in_dispatch_order() {
        let renderer = RecordingRenderer::new();
        let (handle, _changes) = KaartBuilder::new()
            .name("volgorde")
            .spawn::<InternalMsg>(Box::new(renderer));

        handle.dispatch(add_layer_cmd("A")).unwrap();
        handle.dispatch(add_layer_cmd("B")).unwrap();
        handle
            .dispatch(Command::MoveLayer {
                title: "A".into(),
                to_position: 1,
                wrapper: log_only_wrapper(),
            })
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.name, "volgorde");
        assert_eq!(snapshot.layer_titles, ["B", "A"]);
    }

    #[tokio::test]
    async fn wrapper_messages_flow_to_the_message_stream() {
        let renderer = RecordingRenderer::new();
        let (handle, _changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));

        let mut stream = handle.messages();
        handle
            .dispatch(Command::Subscribe {
                request: SubscriptionRequest::new(
                    SubscriptionKind::Measuring,
                    "meten",
                    Box::new(|_| {}),
                ),
                wrapper: subscribed_wrapper(),
            })
            .unwrap();

        let msg = stream.next().await.unwrap();
        match msg.payload {
            Some(InternalSubMsg::Subscribed { result }) => {
                assert_eq!(result.unwrap().subscriber_name, "meten");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn late_stream_subscriber_sees_recent_messages() {
        let renderer = RecordingRenderer::new();
        let (handle, _changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));

        handle
            .dispatch(Command::Subscribe {
                request: SubscriptionRequest::new(
                    SubscriptionKind::Drawing,
                    "tekenen",
                    Box::new(|_| {}),
                ),
                wrapper: subscribed_wrapper(),
            })
            .unwrap();
        // Fence: the ack is in the replay buffer once the snapshot returns.
        handle.snapshot().await.unwrap();

        let mut stream = handle.messages();
        let msg = stream.next().await.unwrap();
        assert!(matches!(
            msg.payload,
            Some(InternalSubMsg::Subscribed { .. })
        ));
    }

    #[tokio::test]
    async fn model_changes_reach_the_notification_channel() {
        let renderer = RecordingRenderer::new();
        let (handle, mut changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));

        handle
            .dispatch(Command::ChangeZoom {
                zoom: 4.0,
                wrapper: log_only_wrapper(),
            })
            .unwrap();

        let change = changes.recv().await.unwrap();
        assert_eq!(
            change,
            ModelChange::ZoomSettingsChanged {
                zoom: 4.0,
                min_zoom: 2.0,
                max_zoom: 15.0,
            }
        );
    }

    #[tokio::test]
    async fn search_results_re_enter_through_the_registry() {
        let renderer = RecordingRenderer::new();
        let (handle, _changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in = seen.clone();
        handle
            .dispatch(Command::Subscribe {
                request: SubscriptionRequest::new(
                    SubscriptionKind::SearchResults,
                    "zoekbalk",
                    Box::new(move |sub_msg| {
                        if let InternalSubMsg::SearchResultsReceived { results } = sub_msg {
                            seen_in.lock().unwrap().push(results.searcher.clone());
                        }
                    }),
                ),
                wrapper: subscribed_wrapper(),
            })
            .unwrap();
        handle
            .dispatch(Command::AddSearcher {
                searcher: Box::new(EchoSearcher {
                    name: "crab".into(),
                }),
                wrapper: log_only_wrapper(),
            })
            .unwrap();
        handle
            .dispatch(Command::Search {
                input: SearchInput {
                    text: "Zwijnaarde".into(),
                },
                searchers: BTreeSet::from(["crab".to_string()]),
                wrapper: log_only_wrapper(),
            })
            .unwrap();

        eventually(|| seen.lock().unwrap().as_slice() == ["crab"]).await;
    }

    #[tokio::test]
    async fn shutdown_releases_renderer_and_stops_accepting() {
        let renderer = RecordingRenderer::new();
        let calls = renderer.calls.clone();
        let (handle, _changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));

        handle.shutdown().await.unwrap();
        assert!(calls.lock().unwrap().contains(&RendererCall::Release));

        let err = handle.dispatch(add_layer_cmd("te laat")).unwrap_err();
        assert_eq!(err, DispatchError::WidgetGone);
        assert_eq!(handle.shutdown().await, Err(DispatchError::WidgetGone));
    }

    #[tokio::test]
    async fn dropping_every_handle_stops_the_actor() {
        let renderer = RecordingRenderer::new();
        let calls = renderer.calls.clone();
        let (handle, _changes) = KaartBuilder::new().spawn::<InternalMsg>(Box::new(renderer));
        let clone = handle.clone();
        drop(handle);
        drop(clone);

        eventually(|| calls.lock().unwrap().contains(&RendererCall::Release)).await;
    }

    #[tokio::test]
    async fn host_defined_message_types_work_end_to_end() {
        #[derive(Debug, Clone, PartialEq)]
        enum HostMsg {
            LayerAdded(bool),
        }
        impl KaartMsg for HostMsg {}

        let renderer = RecordingRenderer::new();
        let (handle, _changes) = KaartBuilder::new().spawn::<HostMsg>(Box::new(renderer));

        let mut stream = handle.messages();
        handle
            .dispatch(Command::AddLayer {
                position: 0,
                layer: vector_layer("Wegen"),
                visible: true,
                group: LayerGroup::Foreground,
                wrapper: BareWrapper::new(|outcome: Validation<()>| {
                    HostMsg::LayerAdded(outcome.is_ok())
                }),
            })
            .unwrap();

        assert_eq!(stream.next().await, Some(HostMsg::LayerAdded(true)));
    }

    #[test]
    fn internal_helper_wraps_payload() {
        let msg = internal(InternalSubMsg::MeasuringToggled { active: true });
        assert!(msg.payload.is_some());
    }
}
