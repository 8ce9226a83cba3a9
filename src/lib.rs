//! On-demand translation of literal UI text.
//!
//! Text is resolved lazily into the active language through a durable cache
//! and an ordered chain of external translation providers. Live bindings
//! follow language switches so already-rendered text updates in place.

pub mod binding;
pub mod cache;
pub mod config;
pub mod context;
pub mod i18n;
pub mod providers;
pub mod reachability;
pub mod resolver;
pub mod retry;
pub mod signal;

pub use binding::{RenderedText, SmartText, TextBinding};
pub use cache::{CacheStore, FileStore, MemoryStore, NormalizedKey, PersistentCache};
pub use context::TranslationContext;
pub use i18n::Language;
pub use providers::{ProviderChain, TranslationProvider};
pub use reachability::ReachabilityMonitor;
pub use resolver::TranslationResolver;
pub use signal::{LanguageIndicator, LanguageSignal};
