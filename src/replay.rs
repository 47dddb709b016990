//! Bounded replay buffer for outbound messages.
//!
//! Consumers attach to the widget's message stream at their own pace; a
//! late subscriber still sees the recent past, bounded both by count and
//! by age. Modeled after a replay subject with a 1000-message window and
//! a 500 ms horizon.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

/// Retention bounds for [`ReplayBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Maximum number of messages retained for replay.
    pub capacity: usize,
    /// Maximum age of a retained message.
    pub max_age: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_age: Duration::from_millis(500),
        }
    }
}

struct Inner<Msg> {
    config: ReplayConfig,
    buffer: VecDeque<(Instant, Msg)>,
    taps: Vec<mpsc::UnboundedSender<Msg>>,
}

impl<Msg> Inner<Msg> {
    fn prune(&mut self, now: Instant) {
        while let Some((stamp, _)) = self.buffer.front() {
            if now.duration_since(*stamp) > self.config.max_age {
                self.buffer.pop_front();
            } else {
                break;
            }
        }
        while self.buffer.len() > self.config.capacity {
            self.buffer.pop_front();
        }
    }
}

/// Fan-out point for the widget's outbound messages.
///
/// `publish` delivers to every live tap and records the message for
/// later subscribers; `subscribe` opens a fresh tap that first receives
/// the retained window, oldest first, then everything published after.
pub struct ReplayBuffer<Msg> {
    inner: Mutex<Inner<Msg>>,
}

impl<Msg: Clone> ReplayBuffer<Msg> {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                config,
                buffer: VecDeque::new(),
                taps: Vec::new(),
            }),
        }
    }

    /// Record one message and fan it out to all live taps.
    pub fn publish(&self, msg: Msg) {
        self.publish_at(msg, Instant::now());
    }

    fn publish_at(&self, msg: Msg, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.prune(now);
        inner.taps.retain(|tap| tap.send(msg.clone()).is_ok());
        inner.buffer.push_back((now, msg));
        if inner.buffer.len() > inner.config.capacity {
            inner.buffer.pop_front();
        }
    }

    /// Open a new tap, seeded with the still-retained window.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Msg> {
        self.subscribe_at(Instant::now())
    }

    fn subscribe_at(&self, now: Instant) -> mpsc::UnboundedReceiver<Msg> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.prune(now);
        for (_, msg) in &inner.buffer {
            let _ = tx.send(msg.clone());
        }
        inner.taps.push(tx);
        rx
    }
}

impl<Msg> std::fmt::Debug for ReplayBuffer<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("ReplayBuffer")
            .field("retained", &inner.buffer.len())
            .field("taps", &inner.taps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn live_tap_receives_everything_published_after_it() {
        let buffer = ReplayBuffer::new(ReplayConfig::default());
        let mut rx = buffer.subscribe();
        buffer.publish(1);
        buffer.publish(2);
        assert_eq!(drain(&mut rx), vec![1, 2]);
    }

    #[test]
    fn late_subscriber_sees_retained_window_oldest_first() {
        let buffer = ReplayBuffer::new(ReplayConfig::default());
        buffer.publish(1);
        buffer.publish(2);
        buffer.publish(3);
        let mut rx = buffer.subscribe();
        assert_eq!(drain(&mut rx), vec![1, 2, 3]);
    }

    #[test]
    fn count_bound_keeps_the_newest() {
        let buffer = ReplayBuffer::new(ReplayConfig {
            capacity: 2,
            max_age: Duration::from_secs(3600),
        });
        buffer.publish(1);
        buffer.publish(2);
        buffer.publish(3);
        let mut rx = buffer.subscribe();
        assert_eq!(drain(&mut rx), vec![2, 3]);
    }

    #[test]
    fn age_bound_drops_expired_messages() {
        let buffer = ReplayBuffer::new(ReplayConfig {
            capacity: 10,
            max_age: Duration::from_millis(500),
        });
        let start = Instant::now();
        buffer.publish_at(1, start);
        buffer.publish_at(2, start + Duration::from_millis(400));

        // 1 is past the horizon by now, 2 is still inside it.
        let mut rx = buffer.subscribe_at(start + Duration::from_millis(700));
        assert_eq!(drain(&mut rx), vec![2]);
    }

    #[test]
    fn dropped_tap_is_forgotten() {
        let buffer = ReplayBuffer::new(ReplayConfig::default());
        let rx = buffer.subscribe();
        drop(rx);
        buffer.publish(1);

        let mut fresh = buffer.subscribe();
        assert_eq!(drain(&mut fresh), vec![1]);
    }
}
