//! Merge recipe-derived clusters into an existing ontology.
//!
//! Each cluster is routed to at most one ontology entry by exact string
//! lookups (see [`MATCH_STRATEGIES`]). Matched entries gain the cluster's
//! surface forms, a recipe count and, if they have none yet, confirm tokens.
//! Nothing is ever removed. Clusters that route nowhere are reported as
//! unmatched so they can seed new entries.
//!
//! The merge is idempotent: merging the same clusters into its own output
//! changes nothing.

use serde::{Deserialize, Serialize};

use crate::clusters::Cluster;
use crate::ontology::{sort_by_slug, OntologyEntry, SurfaceIndex};
use crate::slug::slugify;
use crate::synonyms::SynonymTable;

/// Aliases carried into the unmatched report per cluster.
pub const UNMATCHED_ALIAS_LIMIT: usize = 5;

pub const UNMATCHED_DESCRIPTION: &str =
    "Clusters from recipe corpus with no ontology match - candidates for new entries";

// =============================================================================
// Matching
// =============================================================================

/// One way of routing a cluster to an ontology entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Canonical name is a known surface form.
    CanonicalSurfaceForm,
    /// Slug of the canonical name is an existing slug.
    CanonicalSlug,
    /// Some alias is a known surface form (first alias wins).
    AliasSurfaceForm,
}

/// Strategies in priority order. The first one that finds an entry wins.
pub const MATCH_STRATEGIES: [MatchStrategy; 3] = [
    MatchStrategy::CanonicalSurfaceForm,
    MatchStrategy::CanonicalSlug,
    MatchStrategy::AliasSurfaceForm,
];

impl MatchStrategy {
    /// Slug this strategy routes the cluster to, if any.
    pub fn find(self, cluster: &Cluster, index: &SurfaceIndex) -> Option<String> {
        match self {
            MatchStrategy::CanonicalSurfaceForm => {
                index.slug_for_form(&cluster.canonical).map(str::to_string)
            }
            MatchStrategy::CanonicalSlug => {
                let slug = slugify(&cluster.canonical);
                index.contains_slug(&slug).then_some(slug)
            }
            MatchStrategy::AliasSurfaceForm => cluster
                .aliases
                .iter()
                .find_map(|a| index.slug_for_form(&a.name))
                .map(str::to_string),
        }
    }
}

/// Route a cluster through [`MATCH_STRATEGIES`].
pub fn find_match(cluster: &Cluster, index: &SurfaceIndex) -> Option<(MatchStrategy, String)> {
    MATCH_STRATEGIES
        .iter()
        .find_map(|&strategy| strategy.find(cluster, index).map(|slug| (strategy, slug)))
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub clusters_matched: usize,
    pub clusters_unmatched: usize,
    pub surface_forms_added: usize,
    /// Forms skipped because another entry already owns them.
    pub surface_form_conflicts: usize,
    pub confirm_tokens_added: usize,
    pub recipe_counts_updated: usize,
}

impl MergeStats {
    /// Number of modifications made to the ontology.
    pub fn changes(&self) -> usize {
        self.surface_forms_added + self.confirm_tokens_added + self.recipe_counts_updated
    }
}

/// A cluster with no ontology entry, kept for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedCluster {
    pub canonical: String,
    /// Total usage of the cluster.
    pub count: u64,
    pub aliases: Vec<String>,
}

impl From<&Cluster> for UnmatchedCluster {
    fn from(cluster: &Cluster) -> Self {
        Self {
            canonical: cluster.canonical.clone(),
            count: cluster.total_usage,
            aliases: cluster
                .aliases
                .iter()
                .take(UNMATCHED_ALIAS_LIMIT)
                .map(|a| a.name.clone())
                .collect(),
        }
    }
}

/// The persisted unmatched-clusters artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedReport {
    pub generated: String,
    pub description: String,
    pub total: usize,
    pub clusters: Vec<UnmatchedCluster>,
}

impl UnmatchedReport {
    pub fn new(generated: impl Into<String>, clusters: Vec<UnmatchedCluster>) -> Self {
        Self {
            generated: generated.into(),
            description: UNMATCHED_DESCRIPTION.to_string(),
            total: clusters.len(),
            clusters,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Unmatched clusters, highest count first.
    pub unmatched: Vec<UnmatchedCluster>,
    pub stats: MergeStats,
}

// =============================================================================
// Merge
// =============================================================================

/// Merge clusters into `ontology` in place. The ontology ends sorted by slug.
pub fn merge_clusters(
    clusters: &[Cluster],
    ontology: &mut [OntologyEntry],
    synonyms: &SynonymTable,
) -> MergeOutcome {
    let mut index = SurfaceIndex::build(ontology);
    let mut outcome = MergeOutcome::default();

    for cluster in clusters {
        let Some((strategy, slug)) = find_match(cluster, &index) else {
            outcome.stats.clusters_unmatched += 1;
            outcome.unmatched.push(UnmatchedCluster::from(cluster));
            continue;
        };
        let Some(pos) = index.position(&slug) else {
            continue;
        };

        tracing::debug!(
            canonical = %cluster.canonical,
            slug = %slug,
            strategy = ?strategy,
            "Matched cluster"
        );
        outcome.stats.clusters_matched += 1;
        absorb_cluster(cluster, &mut ontology[pos], &mut index, synonyms, &mut outcome.stats);
    }

    seed_confirm_tokens(ontology, &index, synonyms, &mut outcome.stats);

    outcome.unmatched.sort_by(|a, b| b.count.cmp(&a.count));
    sort_by_slug(ontology);

    tracing::info!(
        matched = outcome.stats.clusters_matched,
        unmatched = outcome.stats.clusters_unmatched,
        forms_added = outcome.stats.surface_forms_added,
        "Merged clusters into ontology"
    );
    outcome
}

/// Fold one matched cluster into its entry.
fn absorb_cluster(
    cluster: &Cluster,
    entry: &mut OntologyEntry,
    index: &mut SurfaceIndex,
    synonyms: &SynonymTable,
    stats: &mut MergeStats,
) {
    for form in cluster.member_names() {
        if entry.has_surface_form(form) {
            continue;
        }
        if let Some(owner) = index.slug_for_form(form) {
            if owner != entry.slug {
                tracing::debug!(
                    form = %form,
                    owner = %owner,
                    slug = %entry.slug,
                    "Surface form belongs to another entry"
                );
                stats.surface_form_conflicts += 1;
                continue;
            }
        }
        entry.add_surface_form(form);
        index.register(form, &entry.slug);
        stats.surface_forms_added += 1;
    }

    if entry.recipe_count.flatten().map_or(true, |c| c < cluster.total_usage) {
        entry.recipe_count = Some(Some(cluster.total_usage));
        stats.recipe_counts_updated += 1;
    }

    // A curated `null` counts as set
    if entry.confirm_tokens.is_none() {
        if let Some(tokens) = synonyms.get(&cluster.canonical.to_lowercase()) {
            entry.confirm_tokens = Some(Some(tokens.clone()));
            stats.confirm_tokens_added += 1;
        }
    }
}

/// Give every entry reachable from a synonym key its confirm tokens, unless it has some.
fn seed_confirm_tokens(
    ontology: &mut [OntologyEntry],
    index: &SurfaceIndex,
    synonyms: &SynonymTable,
    stats: &mut MergeStats,
) {
    for (key, tokens) in synonyms.iter() {
        let Some(pos) = index.slug_for_form(key).and_then(|slug| index.position(slug)) else {
            continue;
        };
        let entry = &mut ontology[pos];
        if entry.confirm_tokens.is_none() {
            entry.confirm_tokens = Some(Some(tokens.clone()));
            stats.confirm_tokens_added += 1;
        }
    }
}
