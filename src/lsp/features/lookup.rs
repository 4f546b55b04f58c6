//! On-demand feature lookup (`baseline.checkFeature`).

use serde::Serialize;

use crate::web_features::{classify, doc_link, FeatureResolver, MatchStrategy};

pub const CHECK_FEATURE_COMMAND: &str = "baseline.checkFeature";
pub const HELLO_WORLD_COMMAND: &str = "baseline.helloWorld";
pub const OPEN_DOCS_ACTION: &str = "Open Docs";
pub const HELLO_WORLD_MESSAGE: &str = "Hello World from Baseline Buddy!";
pub const DATASET_UNAVAILABLE_MESSAGE: &str =
    "web-features dataset not available. Start the server with --dataset <path to web-features data.json>.";

/// Result of a lookup, serialized as the command's return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LookupOutcome {
    #[serde(rename_all = "camelCase")]
    Found {
        id: String,
        name: String,
        status: String,
        label: String,
        /// `"{name} — {label}"`, the line shown to the user.
        message: String,
        doc_link: Option<String>,
        matched_by: String,
    },
    NotFound {
        token: String,
        message: String,
    },
    Unavailable {
        message: String,
    },
}

fn strategy_name(strategy: MatchStrategy) -> &'static str {
    match strategy {
        MatchStrategy::ExactKey => "exactKey",
        MatchStrategy::CaseFoldedKey => "caseFoldedKey",
        MatchStrategy::KebabKey => "kebabKey",
        MatchStrategy::FieldEquality => "fieldEquality",
        MatchStrategy::Substring => "substring",
    }
}

/// Looks up `token`. Returns `None` for blank input, meaning no lookup was
/// performed.
pub fn lookup(resolver: &FeatureResolver, token: &str) -> Option<LookupOutcome> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if !resolver.is_available() {
        return Some(LookupOutcome::Unavailable {
            message: DATASET_UNAVAILABLE_MESSAGE.to_string(),
        });
    }

    let outcome = match resolver.resolve(token) {
        Some(resolution) => {
            let record = resolution.record;
            let label = classify(record).label();
            // A nameless record shows its id; the raw token is the last resort.
            let name = match record.name.as_deref() {
                Some(name) => name.to_string(),
                None if !record.id.is_empty() => record.id.clone(),
                None => token.to_string(),
            };
            LookupOutcome::Found {
                id: record.id.clone(),
                message: format!("{} — {}", name, label),
                name,
                status: record.baseline.as_str().to_string(),
                label: label.to_string(),
                doc_link: doc_link(record),
                matched_by: strategy_name(resolution.strategy).to_string(),
            }
        }
        None => LookupOutcome::NotFound {
            token: token.to_string(),
            message: format!("Feature \"{}\" not found in web-features.", token),
        },
    };
    Some(outcome)
}
