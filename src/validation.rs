//! Validation result type used by every fallible command.
//!
//! A [`Failure`] is a non-empty list of human-readable problem
//! descriptions. It never carries panics or backtraces: command
//! validation problems are ordinary values handed to the issuing
//! wrapper, and the model stays unchanged.

/// Outcome of applying one fallible command effect.
///
/// `Ok` carries the produced value (often `()`), `Err` carries a
/// [`Failure`] with at least one message.
pub type Validation<T> = Result<T, Failure>;

/// A non-empty list of human-readable error messages.
///
/// Construction goes through [`Failure::of`] or
/// [`Failure::from_messages`], which guarantee at least one message is
/// present.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct Failure {
    messages: Vec<String>,
}

impl Failure {
    /// Create a failure with a single message.
    pub fn of(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Create a failure from a list of messages.
    ///
    /// An empty input would violate the non-empty invariant, so it is
    /// replaced by a generic message rather than rejected -- callers
    /// reporting "no detail available" still get a well-formed value.
    pub fn from_messages(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Self::of("onbekende fout")
        } else {
            Self { messages }
        }
    }

    /// The messages, in the order they were collected. Never empty.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Append another message to this failure.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

/// Shorthand for a single-message failed [`Validation`].
pub fn fail<T>(message: impl Into<String>) -> Validation<T> {
    Err(Failure::of(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_creates_single_message() {
        let failure = Failure::of("laag bestaat niet");
        assert_eq!(failure.messages(), ["laag bestaat niet"]);
    }

    #[test]
    fn from_messages_preserves_order() {
        let failure = Failure::from_messages(vec!["eerste".into(), "tweede".into()]);
        assert_eq!(failure.messages(), ["eerste", "tweede"]);
    }

    #[test]
    fn from_messages_empty_is_still_non_empty() {
        let failure = Failure::from_messages(vec![]);
        assert!(!failure.messages().is_empty());
    }

    #[test]
    fn display_joins_messages() {
        let failure = Failure::from_messages(vec!["a".into(), "b".into()]);
        assert_eq!(failure.to_string(), "a; b");
    }

    #[test]
    fn push_appends() {
        let mut failure = Failure::of("a");
        failure.push("b");
        assert_eq!(failure.messages().len(), 2);
    }

    #[test]
    fn fail_shorthand() {
        let result: Validation<u32> = fail("nee");
        assert_eq!(result, Err(Failure::of("nee")));
    }

    // Failures cross the widget actor's channel boundaries.
    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<Failure>();
        }
    };
}
