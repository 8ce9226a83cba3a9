//! Live text bindings.
//!
//! A [`TextBinding`] ties one literal piece of source text to the language
//! signal: it resolves as soon as it is created and again after every
//! language change, always against the language current at that moment.
//! [`SmartText`] wraps a binding with a tag and attributes for rendering.
//!
//! Each resolution runs on its own task. When a binding is disposed its
//! subscription goes away immediately, but resolutions already in flight are
//! left to finish so their results still reach the cache. They no longer
//! publish to the binding's output once it is disposed.

use crate::i18n::{Language, TextDirection};
use crate::resolver::TranslationResolver;
use crate::signal::{LanguageSignal, LanguageSubscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// The string variant: a live translation of one literal.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct TextBinding {
    source: Arc<str>,
    output: watch::Receiver<String>,
    live: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TextBinding {
    pub fn new(
        text: impl Into<String>,
        resolver: Arc<TranslationResolver>,
        signal: &LanguageSignal,
    ) -> Self {
        let text = text.into();
        let source: Arc<str> = Arc::from(text.as_str());
        let (sender, output) = watch::channel(text);
        let subscription = signal.subscribe();
        let live = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(follow_language(
            source.clone(),
            resolver,
            subscription,
            Output {
                sender: Arc::new(sender),
                live: live.clone(),
            },
        ));

        Self {
            source,
            output,
            live,
            task,
        }
    }

    /// The literal this binding was created with.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The currently displayed text.
    pub fn text(&self) -> String {
        self.output.borrow().clone()
    }

    /// Wait until the displayed text is updated.
    ///
    /// Returns `false` once no further updates can arrive.
    pub async fn changed(&mut self) -> bool {
        self.output.changed().await.is_ok()
    }

    /// A receiver for a renderer that wants to observe updates itself.
    pub fn watch(&self) -> watch::Receiver<String> {
        self.output.clone()
    }

    /// Stop following language changes and wait for the subscription to be
    /// released.
    pub async fn dispose(mut self) {
        self.live.store(false, Ordering::SeqCst);
        self.task.abort();
        // The handle resolves once the task has been dropped.
        let _ = (&mut self.task).await;
    }
}

impl Drop for TextBinding {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Publishing side of a binding, shared with its in-flight resolutions.
#[derive(Clone)]
struct Output {
    sender: Arc<watch::Sender<String>>,
    live: Arc<AtomicBool>,
}

impl Output {
    /// Returns whether the displayed text changed.
    fn publish(&self, resolved: String) -> bool {
        self.sender.send_if_modified(|current| {
            if !self.live.load(Ordering::SeqCst) || *current == resolved {
                return false;
            }
            *current = resolved;
            true
        })
    }
}

async fn follow_language(
    source: Arc<str>,
    resolver: Arc<TranslationResolver>,
    mut subscription: LanguageSubscription,
    output: Output,
) {
    let mut language = subscription.latest().language;

    loop {
        spawn_resolution(source.clone(), language, resolver.clone(), output.clone());

        match subscription.changed().await {
            Some(change) => {
                debug!(
                    "Binding re-resolving after language change to {} (v{})",
                    change.language, change.version
                );
                language = change.language;
            }
            None => break,
        }
    }
}

fn spawn_resolution(
    source: Arc<str>,
    language: Language,
    resolver: Arc<TranslationResolver>,
    output: Output,
) {
    tokio::spawn(async move {
        let resolved = resolver.resolve(&source, language).await;
        if !output.publish(resolved) && !output.live.load(Ordering::SeqCst) {
            debug!("Dropping resolution of {:?} for a disposed binding", &*source);
        }
    });
}

/// Element as handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub lang: Language,
    pub dir: TextDirection,
}

/// The element variant: a binding plus the tag and attributes it renders with.
#[derive(Debug)]
pub struct SmartText {
    tag: String,
    attributes: Vec<(String, String)>,
    binding: TextBinding,
    signal: LanguageSignal,
}

impl SmartText {
    pub fn new(
        text: impl Into<String>,
        resolver: Arc<TranslationResolver>,
        signal: &LanguageSignal,
    ) -> Self {
        Self {
            tag: "span".to_string(),
            attributes: Vec::new(),
            binding: TextBinding::new(text, resolver, signal),
            signal: signal.clone(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn binding(&self) -> &TextBinding {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut TextBinding {
        &mut self.binding
    }

    pub fn render(&self) -> RenderedText {
        let lang = self.signal.current();
        RenderedText {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            text: self.binding.text(),
            lang,
            dir: lang.direction(),
        }
    }

    pub async fn dispose(self) {
        self.binding.dispose().await;
    }
}
