//! Subscription registry: lets independent consumers observe internal
//! sub-messages without coupling to each other.
//!
//! Listeners are first-class function values stored under a
//! registry-generated id. Removal is keyed by that id, never by
//! listener identity, so a consumer that loses track of its original
//! request cannot corrupt someone else's subscription.

use crate::message::InternalSubMsg;

/// The category of internal sub-message a listener wants to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// The candidate background layer list was (re)published.
    BackgroundLayers,
    /// A background layer was chosen.
    BackgroundTitle,
    /// The measure tool was switched on or off.
    Measuring,
    /// The free-hand drawing tool was switched on or off.
    Drawing,
    /// A sketch geometry changed.
    Geometry,
    /// A searcher delivered results.
    SearchResults,
    /// The user clicked a search result.
    SearchResultClicked,
    /// A subscription was acknowledged.
    Subscribed,
}

/// Proof of a successful subscription: the disposal handle plus a
/// human-readable subscriber name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionResult {
    pub(crate) id: u64,
    pub subscriber_name: String,
}

impl SubscriptionResult {
    /// The registry-generated identity of this subscription.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A registered observer of internal sub-messages.
pub type Listener = Box<dyn Fn(&InternalSubMsg) + Send>;

struct Entry {
    id: u64,
    kind: SubscriptionKind,
    name: String,
    listener: Listener,
}

/// The live listener registry, owned by the model.
///
/// Mutated only through [`subscribe`](SubscriptionRegistry::subscribe) /
/// [`unsubscribe`](SubscriptionRegistry::unsubscribe); fan-out happens
/// through [`publish`](SubscriptionRegistry::publish). Multiple
/// listeners of the same kind may coexist. There is no replay: a
/// listener only sees sub-messages published after it registered.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of sub-message.
    ///
    /// Always succeeds structurally; duplicate subscriptions of the same
    /// kind are allowed.
    pub fn subscribe(
        &mut self,
        kind: SubscriptionKind,
        subscriber_name: impl Into<String>,
        listener: Listener,
    ) -> SubscriptionResult {
        let id = self.next_id;
        self.next_id += 1;
        let name = subscriber_name.into();
        self.entries.push(Entry {
            id,
            kind,
            name: name.clone(),
            listener,
        });
        tracing::debug!(id, ?kind, subscriber = %name, "subscription registered");
        SubscriptionResult {
            id,
            subscriber_name: name,
        }
    }

    /// Remove a subscription. Unknown or already-removed handles are a
    /// safe no-op, so unsubscribing twice is harmless.
    pub fn unsubscribe(&mut self, result: &SubscriptionResult) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != result.id);
        if self.entries.len() < before {
            tracing::debug!(id = result.id, subscriber = %result.subscriber_name, "subscription removed");
        }
    }

    /// Deliver a sub-message to every listener of the matching kind, in
    /// registration order, before returning.
    pub fn publish(&self, sub_msg: &InternalSubMsg) {
        let kind = sub_msg.kind();
        for entry in self.entries.iter().filter(|e| e.kind == kind) {
            tracing::trace!(?kind, subscriber = %entry.name, "delivering sub-message");
            (entry.listener)(sub_msg);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
