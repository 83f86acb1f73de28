//! Build synonym clusters from the recipe corpus.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ingredient_ontology::clusters::ClusterBuildStats;
use ingredient_ontology::store::{require_artifacts, write_json};
use ingredient_ontology::{
    build_clusters, read_recipe_corpus, ClusterConfig, ClusterReport, CorpusConfig, CorpusStats,
};

pub struct BuildClustersConfig {
    pub recipes_file: PathBuf,
    pub output: PathBuf,
    pub corpus: CorpusConfig,
    pub clusters: ClusterConfig,
    pub dry_run: bool,
}

impl Default for BuildClustersConfig {
    fn default() -> Self {
        Self {
            recipes_file: PathBuf::from("data/RAW_recipes.csv"),
            output: PathBuf::from("data/synonym-clusters.json"),
            corpus: CorpusConfig::default(),
            clusters: ClusterConfig::default(),
            dry_run: false,
        }
    }
}

pub fn run(config: &BuildClustersConfig) -> Result<()> {
    require_artifacts([config.recipes_file.as_path()])?;

    println!("=== Build Synonym Clusters ===");
    println!();

    let report = cluster_corpus(config)?;
    print_summary(&report);

    if config.dry_run {
        println!();
        println!("[DRY RUN - no files written]");
    } else {
        write_json(&config.output, &report)
            .with_context(|| format!("Failed to write {}", config.output.display()))?;
        println!();
        println!("Written to {}", config.output.display());
    }

    Ok(())
}

/// Read the corpus and cluster it, without writing anything.
pub fn cluster_corpus(config: &BuildClustersConfig) -> Result<ClusterReport> {
    tracing::debug!(path = %config.recipes_file.display(), "Reading recipe corpus");
    let (frequencies, corpus_stats) = read_recipe_corpus(&config.recipes_file, &config.corpus)
        .with_context(|| format!("Failed to read {}", config.recipes_file.display()))?;
    print_corpus_stats(&corpus_stats, frequencies.len());

    let (clusters, build_stats) = build_clusters(frequencies.iter(), &config.clusters);
    print_build_stats(&build_stats, config.clusters.min_frequency);

    Ok(ClusterReport::new(
        crate::generated_date(),
        config.clusters.min_frequency,
        clusters,
    ))
}

fn print_corpus_stats(stats: &CorpusStats, unique: usize) {
    println!("Recipes read: {}", stats.rows_read);
    if stats.rows_skipped > 0 {
        println!("  Skipped (unreadable ingredient list): {}", stats.rows_skipped);
    }
    println!("Ingredient mentions: {}", stats.ingredient_mentions);
    println!("Unique ingredients: {}", unique);
}

fn print_build_stats(stats: &ClusterBuildStats, min_frequency: u64) {
    println!(
        "Ingredients with count >= {}: {}",
        min_frequency,
        stats.kept + stats.no_base
    );
    println!("  No base tokens: {}", stats.no_base);
    println!("Cluster keys: {}", stats.groups);
}

fn print_summary(report: &ClusterReport) {
    println!();
    println!("Clusters: {}", report.stats.total_clusters);
    println!("  Base ingredients: {}", report.stats.base_ingredients);
    println!("  With aliases: {}", report.stats.with_aliases);

    println!();
    println!("Top clusters:");
    for cluster in report.clusters.iter().take(30) {
        let aliases: Vec<&str> = cluster
            .aliases
            .iter()
            .take(3)
            .map(|a| a.name.as_str())
            .collect();
        if aliases.is_empty() {
            println!("  [{:6}] {}", cluster.total_usage, cluster.canonical);
        } else {
            println!(
                "  [{:6}] {} + {:?}",
                cluster.total_usage, cluster.canonical, aliases
            );
        }
    }
}
