//! Current-language state and change notification.
//!
//! One observable value carries the active language. Two producers feed it:
//!
//! - [`LanguageSignal::switch_to`], the explicit language-switch command,
//!   which always notifies (even when re-selecting the active language);
//! - [`LanguageIndicator::set`], the outward language attribute, which any
//!   component may write directly and which notifies only on an actual change.
//!
//! Subscribers see a single stream of [`LanguageChange`]s regardless of which
//! producer fired. A subscriber that falls behind observes only the latest
//! change, so reactions should always read the *current* language.

use crate::i18n::{Language, TextDirection};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Which producer caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Initial state at construction
    Initial,
    /// The explicit switch command
    Switch,
    /// A direct write to the outward indicator
    Indicator,
}

/// Payload observed by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageChange {
    pub language: Language,
    /// Incremented once per notification
    pub version: u64,
    pub source: ChangeSource,
}

/// Process-wide language state shared by clones.
#[derive(Debug, Clone)]
pub struct LanguageSignal {
    state: Arc<watch::Sender<LanguageChange>>,
}

impl LanguageSignal {
    pub fn new(initial: Language) -> Self {
        let (sender, _) = watch::channel(LanguageChange {
            language: initial,
            version: 0,
            source: ChangeSource::Initial,
        });
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Language {
        self.state.borrow().language
    }

    /// Number of notifications sent so far.
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Replace the active language and notify every subscriber once.
    ///
    /// Subscribers are marked changed before this returns; their reactions run
    /// afterwards on their own tasks.
    pub fn switch_to(&self, language: Language) {
        self.state.send_modify(|state| {
            debug!("Language switch: {} -> {}", state.language, language);
            state.language = language;
            state.version += 1;
            state.source = ChangeSource::Switch;
        });
    }

    /// Handle to the outward language attribute.
    pub fn indicator(&self) -> LanguageIndicator {
        LanguageIndicator {
            state: self.state.clone(),
        }
    }

    pub fn subscribe(&self) -> LanguageSubscription {
        LanguageSubscription {
            receiver: self.state.subscribe(),
        }
    }

    /// Live subscriptions. Bounded by the number of live bindings.
    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }
}

impl Default for LanguageSignal {
    fn default() -> Self {
        Self::new(Language::canonical())
    }
}

/// The outward, observable language attribute (`lang` and `dir`).
#[derive(Debug, Clone)]
pub struct LanguageIndicator {
    state: Arc<watch::Sender<LanguageChange>>,
}

impl LanguageIndicator {
    pub fn lang(&self) -> Language {
        self.state.borrow().language
    }

    pub fn dir(&self) -> TextDirection {
        self.lang().direction()
    }

    /// Write the attribute directly. Notifies only if the language changes.
    pub fn set(&self, language: Language) {
        self.state.send_if_modified(|state| {
            if state.language == language {
                return false;
            }
            debug!("Language indicator: {} -> {}", state.language, language);
            state.language = language;
            state.version += 1;
            state.source = ChangeSource::Indicator;
            true
        });
    }
}

/// A live subscription. Dropping it, or calling [`unsubscribe`](Self::unsubscribe),
/// ends it.
#[derive(Debug)]
pub struct LanguageSubscription {
    receiver: watch::Receiver<LanguageChange>,
}

impl LanguageSubscription {
    /// Latest state, marking it as seen.
    pub fn latest(&mut self) -> LanguageChange {
        *self.receiver.borrow_and_update()
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the signal has been dropped.
    pub async fn changed(&mut self) -> Option<LanguageChange> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let signal = LanguageSignal::default();

        assert_eq!(signal.current(), Language::ENGLISH);
        assert_eq!(signal.version(), 0);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_switch_to_replaces_language() {
        let signal = LanguageSignal::new(Language::ENGLISH);

        signal.switch_to(Language::ARABIC);

        assert_eq!(signal.current(), Language::ARABIC);
        assert_eq!(signal.indicator().lang(), Language::ARABIC);
        assert_eq!(signal.indicator().dir(), TextDirection::Rtl);
        assert_eq!(signal.version(), 1);
    }

    #[test]
    fn test_switch_notifies_synchronously() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let mut subscription = signal.subscribe();

        signal.switch_to(Language::ARABIC);

        assert!(subscription.receiver.has_changed().unwrap());
        let change = subscription.latest();
        assert_eq!(change.language, Language::ARABIC);
        assert_eq!(change.source, ChangeSource::Switch);
    }

    #[test]
    fn test_switch_to_same_language_still_notifies() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let subscription = signal.subscribe();

        signal.switch_to(Language::ENGLISH);

        assert!(subscription.receiver.has_changed().unwrap());
        assert_eq!(signal.version(), 1);
    }

    #[test]
    fn test_indicator_notifies_only_on_change() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let mut subscription = signal.subscribe();
        let indicator = signal.indicator();

        indicator.set(Language::ENGLISH);
        assert!(!subscription.receiver.has_changed().unwrap());

        indicator.set(Language::ARABIC);
        let change = subscription.latest();
        assert_eq!(change.language, Language::ARABIC);
        assert_eq!(change.source, ChangeSource::Indicator);
        assert_eq!(signal.current(), Language::ARABIC);
    }

    #[tokio::test]
    async fn test_changed_yields_latest_after_several_switches() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let mut subscription = signal.subscribe();

        signal.switch_to(Language::ARABIC);
        signal.switch_to(Language::ENGLISH);

        let change = subscription.changed().await.expect("Signal is alive");
        assert_eq!(change.language, Language::ENGLISH);
        assert_eq!(change.version, 2);
    }

    #[tokio::test]
    async fn test_changed_returns_none_when_signal_dropped() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let mut subscription = signal.subscribe();
        drop(signal);

        assert!(subscription.changed().await.is_none());
    }

    #[test]
    fn test_unsubscribe_releases_subscription() {
        let signal = LanguageSignal::new(Language::ENGLISH);
        let first = signal.subscribe();
        let second = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(signal.subscriber_count(), 1);
        drop(second);
        assert_eq!(signal.subscriber_count(), 0);
    }
}
