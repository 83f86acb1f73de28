//! Canonical ingredient vocabulary built from recipe corpora.
//!
//! Turns thousands of free-text ingredient strings ("minced garlic",
//! "garlic cloves", "fresh garlic, crushed") into a compact set of
//! canonical entries with tracked surface forms, and keeps that vocabulary
//! in step with a curated ontology linked to USDA FoodData Central.
//!
//! Stages:
//! 1. [`lexicon`] splits a string into base tokens and form modifiers.
//! 2. [`clusters`] groups strings with identical base and form sets.
//! 3. [`merge`] folds clusters into the existing ontology, additively.
//! 4. [`expand`] proposes new entries for frequent unmatched clusters.
//!
//! # Example
//!
//! ```
//! use ingredient_ontology::{build_clusters, ClusterConfig, FrequencyTable};
//!
//! let freq = FrequencyTable::from_pairs([("garlic", 80), ("garlic cloves", 20)]);
//! let (clusters, _) = build_clusters(freq.iter(), &ClusterConfig::default());
//!
//! assert_eq!(clusters[0].canonical, "garlic");
//! assert_eq!(clusters[0].aliases[0].name, "garlic cloves");
//! ```

pub mod clusters;
pub mod corpus;
pub mod error;
pub mod expand;
pub mod lexicon;
pub mod matcher;
pub mod merge;
pub mod ontology;
pub mod slug;
pub mod store;
pub mod synonyms;

pub use clusters::{build_clusters, Alias, Cluster, ClusterConfig, ClusterKey, ClusterReport};
pub use corpus::{read_recipe_corpus, CorpusConfig, CorpusStats, FrequencyTable};
pub use error::{OntologyError, Result};
pub use expand::{apply_expansion, expand_ontology, ExpandConfig, ExpandOutcome, ExpandStats};
pub use lexicon::{classify, extract_base_and_form, lemmatize, tokenize, TokenClass};
pub use matcher::CandidateOracle;
pub use merge::{
    merge_clusters, MatchStrategy, MergeOutcome, MergeStats, UnmatchedCluster, UnmatchedReport,
};
pub use ontology::{FdcCandidate, OntologyEntry, OntologySummary, SurfaceIndex};
pub use slug::slugify;
pub use synonyms::SynonymTable;
