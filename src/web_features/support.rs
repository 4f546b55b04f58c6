//! Support classification and documentation links for resolved features.

use super::dataset::{BaselineStatus, FeatureRecord};

/// Base of the fallback documentation link built from a `caniuse` identifier.
pub const CANIUSE_BASE_URL: &str = "https://caniuse.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportLevel {
    Supported,
    Limited,
    Unsupported,
}

impl SupportLevel {
    /// User-facing status line.
    pub fn label(&self) -> &'static str {
        match self {
            SupportLevel::Supported => "✅ Part of Baseline",
            SupportLevel::Limited => "⚠️ Limited support",
            SupportLevel::Unsupported => "❌ Not in Baseline",
        }
    }

    /// Anything short of `high` Baseline gets a warning marker.
    pub fn needs_warning(&self) -> bool {
        *self != SupportLevel::Supported
    }
}

pub fn classify(record: &FeatureRecord) -> SupportLevel {
    match record.baseline {
        BaselineStatus::High => SupportLevel::Supported,
        BaselineStatus::Low => SupportLevel::Limited,
        BaselineStatus::Unknown => SupportLevel::Unsupported,
    }
}

/// Resolves the documentation link of a record, or `None` when the dataset
/// carries no documentation for it.
///
/// Precedence: `mdn.url`, `mdn.spec`, a caniuse page built from the `caniuse`
/// identifier, then `mdn_url`.
pub fn doc_link(record: &FeatureRecord) -> Option<String> {
    let docs = &record.docs;
    docs.mdn_url
        .clone()
        .or_else(|| docs.mdn_spec.clone())
        .or_else(|| docs.caniuse.as_ref().map(|id| format!("{}{}", CANIUSE_BASE_URL, id)))
        .or_else(|| docs.external_url.clone())
}
