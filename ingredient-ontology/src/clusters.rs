//! Synonym clustering of raw ingredient strings.
//!
//! Every string is split into base and form tokens; strings whose base set
//! and form set match exactly land in the same cluster. The most frequent
//! member becomes the canonical name and the rest become aliases.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::lexicon::extract_base_and_form;

const KEY_DELIMITER: &str = "+";
const EMPTY_BASE: &str = "_empty_";
const BARE_FORM: &str = "base";

/// Thresholds for cluster building.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Ingredients seen fewer times than this are ignored.
    pub min_frequency: u64,
    /// Non-canonical members below this count are not listed as aliases.
    pub alias_min_frequency: u64,
    /// A cluster without aliases is kept only if its canonical reaches this count.
    pub single_entry_min_count: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_frequency: 5,
            alias_min_frequency: 5,
            single_entry_min_count: 50,
        }
    }
}

/// Identity of a cluster: sorted unique base tokens and sorted unique form lemmas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterKey {
    pub base: String,
    pub form: String,
}

impl ClusterKey {
    pub fn new(base: &[String], form: &[String]) -> Self {
        Self {
            base: join_sorted(base).unwrap_or_else(|| EMPTY_BASE.to_string()),
            form: join_sorted(form).unwrap_or_else(|| BARE_FORM.to_string()),
        }
    }
}

impl std::fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.base, self.form)
    }
}

fn join_sorted(tokens: &[String]) -> Option<String> {
    let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
    if unique.is_empty() {
        None
    } else {
        Some(unique.into_iter().collect::<Vec<_>>().join(KEY_DELIMITER))
    }
}

/// A named member of a cluster with its corpus frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub count: u64,
}

/// One output cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub canonical: String,
    pub count: u64,
    /// Base tokens of the canonical member, in encounter order.
    pub base: Vec<String>,
    /// Form lemmas of the canonical member joined with `+`, or `base`.
    pub form: String,
    pub aliases: Vec<Alias>,
    /// Members that fell below the alias floor. Still surface forms of the cluster.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub below_floor: Vec<Alias>,
    pub total_usage: u64,
}

impl Cluster {
    /// Every member name: canonical first, then aliases, then sub-floor members.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str())
            .chain(self.aliases.iter().map(|a| a.name.as_str()))
            .chain(self.below_floor.iter().map(|a| a.name.as_str()))
    }

    /// Sorted base tokens joined with `+`, used to group clusters by ingredient.
    pub fn base_key(&self) -> String {
        let mut base: Vec<&str> = self.base.iter().map(String::as_str).collect();
        base.sort_unstable();
        base.join(KEY_DELIMITER)
    }
}

/// Discard counters from a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterBuildStats {
    /// Ingredients below `min_frequency`.
    pub filtered_low: usize,
    /// Ingredients with no base token.
    pub no_base: usize,
    /// Ingredients assigned to a group.
    pub kept: usize,
    /// Distinct cluster keys before output filtering.
    pub groups: usize,
}

struct Member {
    name: String,
    count: u64,
    base: Vec<String>,
    form: Vec<String>,
}

/// Group ingredient frequencies into clusters.
///
/// Input order matters only for tie-breaking: equal counts inside a cluster
/// keep their input order, and clusters with equal total usage keep the
/// order in which their key was first seen.
pub fn build_clusters<'a, I>(
    frequencies: I,
    config: &ClusterConfig,
) -> (Vec<Cluster>, ClusterBuildStats)
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut stats = ClusterBuildStats::default();
    let mut key_index: HashMap<ClusterKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<Member>> = Vec::new();

    for (name, count) in frequencies {
        if count < config.min_frequency {
            stats.filtered_low += 1;
            continue;
        }

        let parts = extract_base_and_form(name);
        if parts.base.is_empty() {
            tracing::trace!(ingredient = %name, "No base tokens, skipping");
            stats.no_base += 1;
            continue;
        }

        let key = ClusterKey::new(&parts.base, &parts.form);
        let idx = *key_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(Member {
            name: name.to_string(),
            count,
            base: parts.base,
            form: parts.form,
        });
        stats.kept += 1;
    }
    stats.groups = groups.len();

    let mut clusters: Vec<Cluster> = groups
        .into_iter()
        .filter_map(|members| reduce_group(members, config))
        .collect();

    // Stable: equal usage keeps discovery order
    clusters.sort_by(|a, b| b.total_usage.cmp(&a.total_usage));

    tracing::debug!(
        kept = stats.kept,
        groups = stats.groups,
        clusters = clusters.len(),
        "Built clusters"
    );

    (clusters, stats)
}

fn reduce_group(mut members: Vec<Member>, config: &ClusterConfig) -> Option<Cluster> {
    members.sort_by(|a, b| b.count.cmp(&a.count));

    let total_usage = members.iter().map(|m| m.count).sum();
    let mut rest = members.into_iter();
    let canonical = rest.next()?;

    let (aliases, below_floor): (Vec<Alias>, Vec<Alias>) = rest
        .map(|m| Alias {
            name: m.name,
            count: m.count,
        })
        .partition(|a| a.count >= config.alias_min_frequency);

    if aliases.is_empty() && canonical.count < config.single_entry_min_count {
        return None;
    }

    let form = if canonical.form.is_empty() {
        BARE_FORM.to_string()
    } else {
        canonical.form.join(KEY_DELIMITER)
    };

    Some(Cluster {
        canonical: canonical.name,
        count: canonical.count,
        base: canonical.base,
        form,
        aliases,
        below_floor,
        total_usage,
    })
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReportStats {
    pub total_clusters: usize,
    pub base_ingredients: usize,
    pub with_aliases: usize,
}

/// The persisted cluster artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
    pub generated: String,
    pub min_frequency: u64,
    pub stats: ClusterReportStats,
    pub clusters: Vec<Cluster>,
}

impl ClusterReport {
    pub fn new(generated: impl Into<String>, min_frequency: u64, clusters: Vec<Cluster>) -> Self {
        let base_ingredients = clusters
            .iter()
            .map(Cluster::base_key)
            .collect::<HashSet<_>>()
            .len();
        let stats = ClusterReportStats {
            total_clusters: clusters.len(),
            base_ingredients,
            with_aliases: clusters.iter().filter(|c| !c.aliases.is_empty()).count(),
        };

        Self {
            generated: generated.into(),
            min_frequency,
            stats,
            clusters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, u64)]) -> Vec<Cluster> {
        build_clusters(pairs.iter().copied(), &ClusterConfig::default()).0
    }

    #[test]
    fn test_cluster_key_is_order_independent() {
        let a = ClusterKey::new(
            &["olive".to_string(), "oil".to_string()],
            &["pure".to_string()],
        );
        let b = ClusterKey::new(
            &["oil".to_string(), "olive".to_string()],
            &["pure".to_string()],
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "oil+olive|pure");
    }

    #[test]
    fn test_cluster_key_sentinels() {
        let key = ClusterKey::new(&["salt".to_string()], &[]);
        assert_eq!(key.to_string(), "salt|base");
        let key = ClusterKey::new(&[], &["fresh".to_string()]);
        assert_eq!(key.to_string(), "_empty_|fresh");
    }

    #[test]
    fn test_distinct_forms_make_distinct_clusters() {
        let clusters = build(&[
            ("fresh garlic", 100),
            ("garlic", 80),
            ("minced garlic", 60),
            ("salt", 10),
        ]);

        let canonicals: Vec<&str> = clusters.iter().map(|c| c.canonical.as_str()).collect();
        assert_eq!(canonicals, vec!["fresh garlic", "garlic", "minced garlic"]);
        for cluster in &clusters {
            assert_eq!(cluster.base, vec!["garlic"]);
            assert!(cluster.aliases.is_empty());
        }
        assert_eq!(clusters[0].form, "fresh");
        assert_eq!(clusters[1].form, "base");
        assert_eq!(clusters[2].form, "mince");
    }

    #[test]
    fn test_canonical_tie_keeps_first_seen() {
        let clusters = build(&[
            ("garlic clove", 40),
            ("garlic", 55),
            ("garlic cloves", 55),
        ]);

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.canonical, "garlic");
        assert_eq!(cluster.count, 55);
        let aliases: Vec<&str> = cluster.aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(aliases, vec!["garlic cloves", "garlic clove"]);
        assert_eq!(cluster.total_usage, 150);
    }

    #[test]
    fn test_alias_floor_still_counts_toward_usage() {
        let config = ClusterConfig {
            min_frequency: 1,
            ..ClusterConfig::default()
        };
        let (clusters, _) = build_clusters(
            [("butter", 70), ("butter cups", 3)].iter().copied(),
            &config,
        );

        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].aliases.is_empty());
        assert_eq!(
            clusters[0].below_floor,
            vec![Alias {
                name: "butter cups".to_string(),
                count: 3
            }]
        );
        assert_eq!(clusters[0].total_usage, 73);
    }

    #[test]
    fn test_low_count_singletons_dropped() {
        let clusters = build(&[("salt", 10)]);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_low_count_pair_with_alias_kept() {
        let clusters = build(&[("paprika", 12), ("paprika cups", 6)]);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].aliases.len(), 1);
    }

    #[test]
    fn test_min_frequency_and_no_base() {
        let (clusters, stats) = build_clusters(
            [("onion", 60), ("shallot", 4), ("2 large cans", 90)]
                .iter()
                .copied(),
            &ClusterConfig::default(),
        );

        assert_eq!(clusters.len(), 1);
        assert_eq!(stats.filtered_low, 1);
        assert_eq!(stats.no_base, 1);
        assert_eq!(stats.kept, 1);
    }

    #[test]
    fn test_sorted_by_total_usage_with_stable_ties() {
        let clusters = build(&[("rice", 60), ("flour", 200), ("sugar", 60)]);
        let canonicals: Vec<&str> = clusters.iter().map(|c| c.canonical.as_str()).collect();
        assert_eq!(canonicals, vec!["flour", "rice", "sugar"]);
    }

    #[test]
    fn test_member_names() {
        let cluster = Cluster {
            canonical: "garlic".to_string(),
            count: 10,
            base: vec!["garlic".to_string()],
            form: "base".to_string(),
            aliases: vec![Alias {
                name: "garlic cloves".to_string(),
                count: 6,
            }],
            below_floor: vec![Alias {
                name: "garlic bulb".to_string(),
                count: 2,
            }],
            total_usage: 18,
        };
        let names: Vec<&str> = cluster.member_names().collect();
        assert_eq!(names, vec!["garlic", "garlic cloves", "garlic bulb"]);
    }

    #[test]
    fn test_report_stats() {
        let clusters = build(&[
            ("fresh garlic", 100),
            ("garlic", 80),
            ("garlic cloves", 20),
            ("olive oil", 90),
        ]);
        let report = ClusterReport::new("2026-01-01", 5, clusters);

        assert_eq!(report.stats.total_clusters, 3);
        assert_eq!(report.stats.base_ingredients, 2);
        assert_eq!(report.stats.with_aliases, 1);
    }

    #[test]
    fn test_report_json_shape() {
        let clusters = build(&[("garlic", 80), ("garlic cloves", 20)]);
        let report = ClusterReport::new("2026-01-01", 5, clusters);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["minFrequency"], 5);
        assert_eq!(json["stats"]["totalClusters"], 1);
        assert_eq!(json["clusters"][0]["totalUsage"], 100);
        assert_eq!(json["clusters"][0]["aliases"][0]["name"], "garlic cloves");
        assert!(json["clusters"][0].get("belowFloor").is_none());
    }
}
