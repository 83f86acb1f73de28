//! Propose new ontology entries from unmatched clusters.
//!
//! Frequent clusters that no existing entry covers become new entries,
//! each carrying the best external-catalog candidate (if the matcher found
//! one) for a human to confirm.

use std::collections::HashSet;

use crate::matcher::CandidateOracle;
use crate::merge::UnmatchedCluster;
use crate::ontology::{sort_by_slug, surface_form_set, FdcCandidate, OntologyEntry};
use crate::slug::{normalize_surface, slugify, title_case};

#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Clusters below this count are not considered.
    pub min_count: u64,
    /// Candidates at or above this score count as strong matches in the stats.
    pub high_score_threshold: f64,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            min_count: 50,
            high_score_threshold: 0.5,
        }
    }
}

/// Where a candidate lookup is keyed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Canonical,
    /// First alias with a candidate.
    Alias,
}

/// Lookup order for external candidates.
pub const CANDIDATE_SOURCES: [CandidateSource; 2] =
    [CandidateSource::Canonical, CandidateSource::Alias];

impl CandidateSource {
    pub fn find<'a>(
        self,
        cluster: &UnmatchedCluster,
        oracle: &'a CandidateOracle,
    ) -> Option<&'a FdcCandidate> {
        match self {
            CandidateSource::Canonical => oracle.get(&cluster.canonical),
            CandidateSource::Alias => cluster.aliases.iter().find_map(|a| oracle.get(a)),
        }
    }
}

/// Best external candidate for a cluster, trying [`CANDIDATE_SOURCES`] in order.
pub fn find_candidate<'a>(
    cluster: &UnmatchedCluster,
    oracle: &'a CandidateOracle,
) -> Option<(CandidateSource, &'a FdcCandidate)> {
    CANDIDATE_SOURCES
        .iter()
        .find_map(|&source| source.find(cluster, oracle).map(|c| (source, c)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandStats {
    /// Unmatched clusters offered.
    pub considered: usize,
    pub below_min_count: usize,
    /// Skipped because the slug or canonical form is already taken.
    pub skipped_existing: usize,
    pub with_candidate: usize,
    pub without_candidate: usize,
    pub high_score: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExpandOutcome {
    /// New entries, highest recipe count first.
    pub new_entries: Vec<OntologyEntry>,
    pub stats: ExpandStats,
}

/// Build new entries for unmatched clusters not covered by `ontology`.
///
/// Surface forms are checked against the ontology as it was before this
/// call only, so two new entries may share an alias.
pub fn expand_ontology(
    unmatched: &[UnmatchedCluster],
    oracle: &CandidateOracle,
    ontology: &[OntologyEntry],
    config: &ExpandConfig,
) -> ExpandOutcome {
    let existing_forms = surface_form_set(ontology);
    let mut taken_slugs: HashSet<String> = ontology.iter().map(|e| e.slug.clone()).collect();
    let mut outcome = ExpandOutcome::default();

    for cluster in unmatched {
        outcome.stats.considered += 1;
        if cluster.count < config.min_count {
            outcome.stats.below_min_count += 1;
            continue;
        }

        let slug = slugify(&cluster.canonical);
        let canonical_form = normalize_surface(&cluster.canonical);
        if slug.is_empty()
            || taken_slugs.contains(&slug)
            || existing_forms.contains(&canonical_form)
        {
            tracing::debug!(canonical = %cluster.canonical, slug = %slug, "Already in ontology");
            outcome.stats.skipped_existing += 1;
            continue;
        }

        let mut surface_forms = vec![canonical_form];
        for alias in &cluster.aliases {
            let form = normalize_surface(alias);
            if !surface_forms.contains(&form) && !existing_forms.contains(&form) {
                surface_forms.push(form);
            }
        }

        let candidate = find_candidate(cluster, oracle).map(|(_, c)| c.clone());
        match &candidate {
            Some(c) => {
                outcome.stats.with_candidate += 1;
                if c.match_score >= config.high_score_threshold {
                    outcome.stats.high_score += 1;
                }
            }
            None => outcome.stats.without_candidate += 1,
        }

        let mut entry = OntologyEntry::new(slug.clone(), title_case(&cluster.canonical));
        entry.surface_forms = surface_forms;
        entry.recipe_count = Some(Some(cluster.count));
        entry.fdc_candidate = Some(candidate);

        taken_slugs.insert(slug);
        outcome.new_entries.push(entry);
    }

    // Stable: equal counts keep report order
    outcome
        .new_entries
        .sort_by(|a, b| b.recipe_count.cmp(&a.recipe_count));

    tracing::info!(
        new_entries = outcome.new_entries.len(),
        skipped_existing = outcome.stats.skipped_existing,
        "Expanded ontology"
    );
    outcome
}

/// Append new entries and restore slug order.
pub fn apply_expansion(ontology: &mut Vec<OntologyEntry>, new_entries: Vec<OntologyEntry>) {
    ontology.extend(new_entries);
    sort_by_slug(ontology);
}
