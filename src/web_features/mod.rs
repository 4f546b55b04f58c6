//! Web-platform feature data: dataset adapter, token resolution and
//! Baseline support classification.

pub mod dataset;
pub mod resolver;
pub mod support;

pub use dataset::{load_dataset, BaselineStatus, DatasetError, DocSources, FeatureMap, FeatureRecord};
pub use resolver::{FeatureResolver, MatchStrategy, Resolution, ResolverOptions};
pub use support::{classify, doc_link, SupportLevel};
