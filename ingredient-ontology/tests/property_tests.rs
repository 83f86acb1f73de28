use std::collections::BTreeSet;

use ingredient_ontology::{
    build_clusters, classify, extract_base_and_form, slugify, tokenize, ClusterConfig,
    FrequencyTable, TokenClass,
};
use proptest::prelude::*;

const BASE_WORDS: &[&str] = &["garlic", "onion", "olive", "oil", "salt", "pepper", "basil"];
const MODIFIER_WORDS: &[&str] = &[
    "fresh", "ground", "minced", "dried", "large", "cups", "cloves", "ounces",
];
const ALL_WORDS: &[&str] = &[
    "garlic", "onion", "olive", "oil", "salt", "pepper", "basil", "fresh", "ground", "minced",
    "dried", "large", "cups", "cloves", "ounces",
];

fn name_from(words: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(words), 1..4).prop_map(|w| w.join(" "))
}

fn mixed_name() -> impl Strategy<Value = String> {
    prop_oneof![name_from(BASE_WORDS), name_from(ALL_WORDS)]
}

fn corpus() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec((mixed_name(), 1u64..200), 0..30)
}

/// Member sets and usage of every cluster, independent of canonical choice.
fn cluster_shape(pairs: &[(String, u64)]) -> BTreeSet<(Vec<String>, u64)> {
    let table = FrequencyTable::from_pairs(pairs.iter().map(|(n, c)| (n.as_str(), *c)));
    let (clusters, _) = build_clusters(table.iter(), &ClusterConfig::default());
    clusters
        .iter()
        .map(|c| {
            let mut members: Vec<String> = c.member_names().map(str::to_string).collect();
            members.sort();
            (members, c.total_usage)
        })
        .collect()
}

proptest! {
    #[test]
    fn clustering_ignores_input_order(
        (original, shuffled) in corpus().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        prop_assert_eq!(cluster_shape(&original), cluster_shape(&shuffled));
    }

    #[test]
    fn names_without_base_tokens_never_cluster(
        pairs in corpus(),
        modifier_only in prop::collection::vec((name_from(MODIFIER_WORDS), 1u64..500), 1..10)
    ) {
        let table = FrequencyTable::from_pairs(
            pairs.iter().chain(&modifier_only).map(|(n, c)| (n.as_str(), *c)),
        );
        let (clusters, _) = build_clusters(table.iter(), &ClusterConfig::default());

        for cluster in &clusters {
            prop_assert!(!cluster.base.is_empty());
            for member in cluster.member_names() {
                prop_assert!(
                    !modifier_only.iter().any(|(n, _)| n == member),
                    "modifier-only name {:?} clustered",
                    member
                );
            }
        }
    }

    #[test]
    fn total_usage_covers_members(pairs in corpus()) {
        let table = FrequencyTable::from_pairs(pairs.iter().map(|(n, c)| (n.as_str(), *c)));
        let (clusters, _) = build_clusters(table.iter(), &ClusterConfig::default());

        for cluster in &clusters {
            let sum: u64 = cluster.member_names().filter_map(|m| table.get(m)).sum();
            prop_assert_eq!(sum, cluster.total_usage);
            for alias in &cluster.aliases {
                prop_assert!(alias.count <= cluster.count);
            }
        }
    }

    #[test]
    fn tokens_are_clean(s in ".{0,60}") {
        for token in tokenize(&s) {
            prop_assert!(token.chars().count() >= 2);
            prop_assert!(token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }

    #[test]
    fn base_tokens_classify_as_base(s in ".{0,60}") {
        let parts = extract_base_and_form(&s);
        for token in &parts.base {
            prop_assert_eq!(classify(token), TokenClass::Base);
        }
        prop_assert_eq!(extract_base_and_form(&s), parts);
    }

    #[test]
    fn slugs_are_url_safe(s in ".{0,60}") {
        let slug = slugify(&s);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
        prop_assert_eq!(slugify(&slug), slug);
    }
}
