//! Internationalization (i18n) module: supported languages and translation metrics.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe `Language` validated against the registry
//! - `metrics`: Counters for the translation pipeline
//!
//! # Example
//!
//! ```rust,ignore
//! use smart_translate::i18n::Language;
//!
//! let source = Language::canonical();
//! let arabic = Language::from_code("ar")?;
//! assert!(arabic.direction() == TextDirection::Rtl);
//! ```

mod language;
mod metrics;
mod registry;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry, TextDirection};
