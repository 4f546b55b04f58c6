#![allow(dead_code)]

pub mod lsp_client;

use serde_json::{json, Value};

use baseline_language_server::lsp::config::ServerConfig;

pub const FETCH_DOCS: &str = "https://developer.mozilla.org/docs/Web/API/Fetch_API";

/// Small web-features dataset in the published nested shape.
pub fn dataset() -> Value {
    json!({
        "features": {
            "abort-controller": {
                "name": "AbortController",
                "status": { "baseline": "high" },
                "caniuse": "abortcontroller"
            },
            "fetch": {
                "name": "Fetch",
                "status": { "baseline": "low" },
                "mdn": { "url": FETCH_DOCS }
            },
            "view-transitions": { "name": "View Transitions" }
        }
    })
}

/// Default languages, without the substring strategy so single letters in
/// test sources never resolve.
pub fn exact_config() -> ServerConfig {
    ServerConfig {
        substring_fallback: false,
        ..ServerConfig::default()
    }
}
