//! Feature resolver
//!
//! Maps a free-text token to a [`FeatureRecord`] by running an ordered list of
//! match strategies against the [`FeatureMap`]. The first strategy that yields a
//! record wins. Strategies are ordered from cheap and precise (key lookups) to
//! expensive and loose (linear scans).
//!
//! ```text
//! token
//!   ├─→ ExactKey       map[token]
//!   ├─→ CaseFoldedKey  map[lower(token)]
//!   ├─→ KebabKey       map[kebab(token)]        AbortController → abort-controller
//!   ├─→ FieldEquality  first name/id == token   (case-insensitive)
//!   └─→ Substring      first name/id ⊇ token    (case-insensitive, optional)
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use super::dataset::{FeatureMap, FeatureRecord};

/// Identifies which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    ExactKey,
    CaseFoldedKey,
    KebabKey,
    FieldEquality,
    Substring,
}

/// A single match strategy: `(token, map) -> record`.
pub type StrategyFn = for<'m> fn(&str, &'m FeatureMap) -> Option<&'m FeatureRecord>;

/// The resolution cascade, in precedence order.
pub static CASCADE: [(MatchStrategy, StrategyFn); 5] = [
    (MatchStrategy::ExactKey, exact_key),
    (MatchStrategy::CaseFoldedKey, case_folded_key),
    (MatchStrategy::KebabKey, kebab_key),
    (MatchStrategy::FieldEquality, field_equality),
    (MatchStrategy::Substring, substring),
];

/// Runs `strategies` in order and returns the first hit together with the
/// tag of the strategy that produced it.
pub fn first_success<'a, 'm, S>(
    strategies: impl IntoIterator<Item = &'a (S, StrategyFn)>,
    token: &str,
    map: &'m FeatureMap,
) -> Option<(S, &'m FeatureRecord)>
where
    S: Copy + 'a,
{
    strategies
        .into_iter()
        .find_map(|&(tag, strategy)| strategy(token, map).map(|record| (tag, record)))
}

fn exact_key<'m>(token: &str, map: &'m FeatureMap) -> Option<&'m FeatureRecord> {
    map.get(token)
}

fn case_folded_key<'m>(token: &str, map: &'m FeatureMap) -> Option<&'m FeatureRecord> {
    map.get(&token.to_lowercase())
}

fn kebab_key<'m>(token: &str, map: &'m FeatureMap) -> Option<&'m FeatureRecord> {
    map.get(&kebab_case(token))
}

fn field_equality<'m>(token: &str, map: &'m FeatureMap) -> Option<&'m FeatureRecord> {
    let needle = token.to_lowercase();
    map.iter().find(|record| {
        record.name.as_ref().is_some_and(|name| name.to_lowercase() == needle)
            || record.id.to_lowercase() == needle
    })
}

fn substring<'m>(token: &str, map: &'m FeatureMap) -> Option<&'m FeatureRecord> {
    let needle = token.to_lowercase();
    map.iter().find(|record| {
        record.name.as_ref().is_some_and(|name| name.to_lowercase().contains(&needle))
            || record.id.to_lowercase().contains(&needle)
    })
}

/// Converts camelCase / PascalCase to hyphenated lower case.
///
/// A hyphen goes between an ASCII lower-case letter or digit and a directly
/// following ASCII upper-case letter; runs of capitals are not split.
pub fn kebab_case(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 4);
    let mut prev: Option<char> = None;
    for c in token.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('-');
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'m> {
    pub record: &'m FeatureRecord,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Enables the substring containment scan. Short tokens can match
    /// unrelated features this way (`map` → `bitmap-image-format`).
    pub substring_fallback: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { substring_fallback: true }
    }
}

/// Resolves tokens against an optional dataset. Without a dataset every
/// lookup is "not found".
#[derive(Debug, Clone, Default)]
pub struct FeatureResolver {
    features: Option<Arc<FeatureMap>>,
    options: ResolverOptions,
}

impl FeatureResolver {
    pub fn new(features: Option<Arc<FeatureMap>>, options: ResolverOptions) -> Self {
        Self { features, options }
    }

    /// Whether a dataset was supplied at startup.
    pub fn is_available(&self) -> bool {
        self.features.is_some()
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    pub fn feature_count(&self) -> usize {
        self.features.as_ref().map_or(0, |f| f.len())
    }

    pub fn resolve(&self, token: &str) -> Option<Resolution<'_>> {
        if token.trim().is_empty() {
            return None;
        }
        let map = self.features.as_deref()?;

        let strategies = CASCADE
            .iter()
            .filter(|(tag, _)| *tag != MatchStrategy::Substring || self.options.substring_fallback);

        match first_success(strategies, token, map) {
            Some((strategy, record)) => {
                if strategy == MatchStrategy::Substring {
                    debug!("Substring fallback matched '{}' to feature '{}'", token, record.id);
                } else {
                    trace!("Resolved '{}' to '{}' via {:?}", token, record.id, strategy);
                }
                Some(Resolution { record, strategy })
            }
            None => {
                trace!("No feature matches '{}'", token);
                None
            }
        }
    }
}
