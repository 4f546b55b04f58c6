//! Feature dataset adapter
//!
//! Wraps the externally supplied `web-features` mapping into a [`FeatureMap`]:
//! an insertion-ordered list of [`FeatureRecord`]s plus a key index.
//!
//! The raw dataset is either a flat `{ "<id>": { ... } }` mapping or the
//! published `data.json` shape `{ "features": { ... }, "groups": ..., ... }`.
//! Loading never fails: anything that is not a mapping becomes an empty map.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while reading a dataset file from disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Compatibility tier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BaselineStatus {
    High,
    Low,
    /// Absent, `false`, or anything unrecognized.
    #[default]
    Unknown,
}

impl BaselineStatus {
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("high") => BaselineStatus::High,
            Some("low") => BaselineStatus::Low,
            _ => BaselineStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineStatus::High => "high",
            BaselineStatus::Low => "low",
            BaselineStatus::Unknown => "unknown",
        }
    }
}

/// Documentation fields carried by a record. The link shown to users is
/// derived from these by [`crate::web_features::support::doc_link`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocSources {
    /// `mdn.url`, or `mdn` itself when given as a bare string.
    pub mdn_url: Option<String>,
    /// `mdn.spec`
    pub mdn_spec: Option<String>,
    /// `caniuse` identifier (first entry when the dataset lists several).
    pub caniuse: Option<String>,
    /// `mdn_url`
    pub external_url: Option<String>,
}

/// A single feature entry. Immutable once the map is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub id: String,
    pub name: Option<String>,
    pub baseline: BaselineStatus,
    pub docs: DocSources,
}

impl FeatureRecord {
    /// Display name, falling back to the id when the dataset has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatus {
    baseline: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMdn {
    Url(String),
    Entry {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        spec: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCaniuse {
    One(String),
    Many(Vec<String>),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Deserializes one field of a feature object. A malformed field is dropped
/// on its own so the rest of the record survives.
fn field<T: DeserializeOwned>(id: &str, value: &Value, key: &str) -> Option<T> {
    let raw = value.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("Feature '{}' has a malformed '{}' field ({}), ignoring it", id, key, e);
            None
        }
    }
}

impl FeatureRecord {
    fn from_raw(id: &str, value: &Value) -> Self {
        let name: Option<String> = field(id, value, "name");
        let status: Option<RawStatus> = field(id, value, "status");
        let mdn: Option<RawMdn> = field(id, value, "mdn");
        let caniuse: Option<RawCaniuse> = field(id, value, "caniuse");
        let external_url: Option<String> = field(id, value, "mdn_url");

        let (mdn_url, mdn_spec) = match mdn {
            Some(RawMdn::Url(url)) => (Some(url), None),
            Some(RawMdn::Entry { url, spec }) => (url, spec),
            None => (None, None),
        };
        let caniuse = match caniuse {
            Some(RawCaniuse::One(id)) => Some(id),
            Some(RawCaniuse::Many(ids)) => ids.into_iter().next(),
            None => None,
        };

        FeatureRecord {
            id: id.to_string(),
            name: non_empty(name),
            baseline: BaselineStatus::from_value(status.as_ref().and_then(|s| s.baseline.as_ref())),
            docs: DocSources {
                mdn_url: non_empty(mdn_url),
                mdn_spec: non_empty(mdn_spec),
                caniuse: non_empty(caniuse),
                external_url: non_empty(external_url),
            },
        }
    }
}

/// Read-only mapping from dataset key to [`FeatureRecord`].
///
/// Iteration follows the order of the dataset file, which is what the
/// scanning match strategies rely on for their "first match" tie-break.
#[derive(Debug, Default)]
pub struct FeatureMap {
    records: Vec<FeatureRecord>,
    index: FxHashMap<String, usize>,
}

impl FeatureMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the map from a raw dataset value. `None` or a non-object value
    /// produces an empty map.
    pub fn load(raw: Option<&Value>) -> Self {
        let Some(Value::Object(top)) = raw else {
            debug!("Dataset is absent or not a mapping, using empty feature map");
            return Self::empty();
        };

        let features = match top.get("features") {
            Some(Value::Object(nested)) => nested,
            _ => top,
        };

        let mut map = FeatureMap {
            records: Vec::with_capacity(features.len()),
            index: FxHashMap::default(),
        };
        for (id, value) in features {
            if !value.is_object() {
                debug!("Skipping dataset entry '{}': not a feature object", id);
                continue;
            }
            map.insert(FeatureRecord::from_raw(id, value));
        }
        map
    }

    fn insert(&mut self, record: FeatureRecord) {
        if let Some(&slot) = self.index.get(&record.id) {
            self.records[slot] = record;
        } else {
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
        }
    }

    /// Case-sensitive key lookup.
    pub fn get(&self, key: &str) -> Option<&FeatureRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Records in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads and parses a dataset file.
pub fn load_dataset(path: &Path) -> Result<FeatureMap, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.display().to_string(),
        source,
    })?;
    let map = FeatureMap::load(Some(&value));
    info!("Loaded {} features from {}", map.len(), path.display());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_load_flat_mapping() {
        let raw = json!({
            "fetch": { "name": "Fetch", "status": { "baseline": "high" } },
            "abort-controller": { "name": "AbortController", "status": { "baseline": "low" } }
        });
        let map = FeatureMap::load(Some(&raw));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("fetch").unwrap().baseline, BaselineStatus::High);
        assert_eq!(map.get("abort-controller").unwrap().baseline, BaselineStatus::Low);
    }

    #[test]
    fn test_load_unwraps_nested_features() {
        let raw = json!({
            "features": {
                "fetch": { "name": "Fetch" }
            },
            "groups": { "network": { "name": "Network" } }
        });
        let map = FeatureMap::load(Some(&raw));
        assert_eq!(map.len(), 1);
        assert!(map.get("fetch").is_some());
        assert!(map.get("network").is_none(), "groups must not leak into the feature map");
    }

    #[test]
    fn test_load_absent_or_scalar_is_empty() {
        assert!(FeatureMap::load(None).is_empty());
        assert!(FeatureMap::load(Some(&json!("not a map"))).is_empty());
        assert!(FeatureMap::load(Some(&json!([1, 2, 3]))).is_empty());
    }

    #[test]
    fn test_every_record_reachable_by_id() {
        let raw = json!({
            "grid": { "name": "Grid" },
            "Subgrid": { "name": "Grid" },
            "no-name": {}
        });
        let map = FeatureMap::load(Some(&raw));
        for record in map.iter() {
            assert_eq!(map.get(&record.id), Some(record));
        }
    }

    #[test]
    fn test_iteration_follows_dataset_order() {
        let raw = json!({
            "zeta": {},
            "alpha": {},
            "mid": {}
        });
        let map = FeatureMap::load(Some(&raw));
        let ids: Vec<_> = map.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_status_normalization() {
        let raw = json!({
            "a": { "status": { "baseline": false } },
            "b": { "status": {} },
            "c": {},
            "d": { "status": { "baseline": "medium" } }
        });
        let map = FeatureMap::load(Some(&raw));
        for id in ["a", "b", "c", "d"] {
            assert_eq!(map.get(id).unwrap().baseline, BaselineStatus::Unknown, "{}", id);
        }
    }

    #[test]
    fn test_doc_sources_shapes() {
        let raw = json!({
            "obj": { "mdn": { "url": "https://mdn/obj", "spec": "https://spec/obj" } },
            "bare": { "mdn": "https://mdn/bare" },
            "list": { "caniuse": ["first", "second"] },
            "ext": { "mdn_url": "https://mdn/ext", "caniuse": "" }
        });
        let map = FeatureMap::load(Some(&raw));
        let obj = &map.get("obj").unwrap().docs;
        assert_eq!(obj.mdn_url.as_deref(), Some("https://mdn/obj"));
        assert_eq!(obj.mdn_spec.as_deref(), Some("https://spec/obj"));
        assert_eq!(map.get("bare").unwrap().docs.mdn_url.as_deref(), Some("https://mdn/bare"));
        assert_eq!(map.get("list").unwrap().docs.caniuse.as_deref(), Some("first"));
        let ext = &map.get("ext").unwrap().docs;
        assert_eq!(ext.external_url.as_deref(), Some("https://mdn/ext"));
        assert_eq!(ext.caniuse, None, "empty strings are not documentation sources");
    }

    #[test]
    fn test_malformed_fields_keep_id_and_name() {
        let raw = json!({
            "weird": { "name": "Weird", "status": "high", "caniuse": 42 },
            "skipped": "not an object"
        });
        let map = FeatureMap::load(Some(&raw));
        let weird = map.get("weird").unwrap();
        assert_eq!(weird.display_name(), "Weird");
        assert_eq!(weird.baseline, BaselineStatus::Unknown);
        assert!(map.get("skipped").is_none());
    }

    #[test]
    fn test_malformed_field_does_not_drop_valid_siblings() {
        let raw = json!({
            "fetch": {
                "name": "Fetch",
                "status": { "baseline": "high" },
                "caniuse": 42,
                "mdn": { "url": "https://mdn/fetch" }
            },
            "grid": { "name": ["not", "a", "string"], "status": { "baseline": "low" }, "mdn_url": 7 }
        });
        let map = FeatureMap::load(Some(&raw));

        let fetch = map.get("fetch").unwrap();
        assert_eq!(fetch.baseline, BaselineStatus::High);
        assert_eq!(fetch.docs.mdn_url.as_deref(), Some("https://mdn/fetch"));
        assert_eq!(fetch.docs.caniuse, None);
        assert_eq!(crate::web_features::classify(fetch), crate::web_features::SupportLevel::Supported);

        let grid = map.get("grid").unwrap();
        assert_eq!(grid.display_name(), "grid");
        assert_eq!(grid.baseline, BaselineStatus::Low);
        assert_eq!(grid.docs.external_url, None);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let raw = json!({ "anonymous": { "name": "" } });
        let map = FeatureMap::load(Some(&raw));
        assert_eq!(map.get("anonymous").unwrap().display_name(), "anonymous");
    }

    #[test]
    fn test_load_dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"features": {{"fetch": {{"name": "Fetch"}}}}}}"#).unwrap();
        let map = load_dataset(file.path()).unwrap();
        assert_eq!(map.get("fetch").unwrap().display_name(), "Fetch");
    }

    #[test]
    fn test_load_dataset_errors() {
        let missing = load_dataset(Path::new("/nonexistent/web-features/data.json"));
        assert!(matches!(missing, Err(DatasetError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(load_dataset(file.path()), Err(DatasetError::Json { .. })));
    }
}
