//! Merge synonym clusters into the ingredient ontology.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ingredient_ontology::store::{read_json, require_artifacts, write_json};
use ingredient_ontology::{
    merge_clusters, Cluster, ClusterReport, MergeOutcome, OntologyEntry, OntologySummary,
    SynonymTable, UnmatchedReport,
};

pub struct MergeClustersConfig {
    pub clusters_file: PathBuf,
    pub ontology_file: PathBuf,
    pub synonyms_file: PathBuf,
    pub output: PathBuf,
    pub unmatched_output: PathBuf,
    pub dry_run: bool,
}

impl Default for MergeClustersConfig {
    fn default() -> Self {
        Self {
            clusters_file: PathBuf::from("data/synonym-clusters.json"),
            ontology_file: PathBuf::from("data/ingredient-ontology.json"),
            synonyms_file: PathBuf::from("data/synonym-table.json"),
            output: PathBuf::from("data/ingredient-ontology-v2.json"),
            unmatched_output: PathBuf::from("data/unmatched-clusters.json"),
            dry_run: false,
        }
    }
}

pub fn run(config: &MergeClustersConfig) -> Result<()> {
    require_artifacts([
        config.clusters_file.as_path(),
        config.ontology_file.as_path(),
        config.synonyms_file.as_path(),
    ])?;

    println!("=== Merge Clusters to Ontology ===");
    println!();

    let report: ClusterReport = read_json(&config.clusters_file)?;
    println!("Synonym clusters: {}", report.clusters.len());

    let (ontology, unmatched) = merge_into(config, &report.clusters)?;
    write_outputs(config, &ontology, unmatched)
}

/// Load the ontology and synonym table and merge `clusters` into it.
pub fn merge_into(
    config: &MergeClustersConfig,
    clusters: &[Cluster],
) -> Result<(Vec<OntologyEntry>, UnmatchedReport)> {
    let mut ontology: Vec<OntologyEntry> = read_json(&config.ontology_file)?;
    println!("Existing ontology: {} entries", ontology.len());

    let synonyms = SynonymTable::load(&config.synonyms_file)?;
    println!("Synonym table entries: {}", synonyms.len());

    let outcome = merge_clusters(clusters, &mut ontology, &synonyms);
    print_summary(&outcome, &ontology);

    let unmatched = UnmatchedReport::new(crate::generated_date(), outcome.unmatched);
    Ok((ontology, unmatched))
}

pub fn write_outputs(
    config: &MergeClustersConfig,
    ontology: &[OntologyEntry],
    unmatched: UnmatchedReport,
) -> Result<()> {
    if config.dry_run {
        println!();
        println!("[DRY RUN - no files written]");
        return Ok(());
    }

    write_json(&config.output, &ontology)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    println!();
    println!("Written to {}", config.output.display());

    write_json(&config.unmatched_output, &unmatched)
        .with_context(|| format!("Failed to write {}", config.unmatched_output.display()))?;
    println!("Written unmatched to {}", config.unmatched_output.display());

    Ok(())
}

fn print_summary(outcome: &MergeOutcome, ontology: &[OntologyEntry]) {
    let stats = &outcome.stats;
    println!();
    println!("=== Results ===");
    println!("Clusters matched to ontology: {}", stats.clusters_matched);
    println!("Clusters unmatched: {}", stats.clusters_unmatched);
    println!("Surface forms added: {}", stats.surface_forms_added);
    if stats.surface_form_conflicts > 0 {
        println!(
            "Surface forms skipped (owned by another entry): {}",
            stats.surface_form_conflicts
        );
    }
    println!("Confirm tokens added: {}", stats.confirm_tokens_added);
    println!("Recipe counts updated: {}", stats.recipe_counts_updated);

    println!();
    println!("=== TOP 30 UNMATCHED CLUSTERS (potential new entries) ===");
    for cluster in outcome.unmatched.iter().take(30) {
        if cluster.aliases.is_empty() {
            println!("  [{:6}] {}", cluster.count, cluster.canonical);
        } else {
            let aliases: Vec<&str> = cluster.aliases.iter().take(3).map(String::as_str).collect();
            println!("  [{:6}] {} + {:?}", cluster.count, cluster.canonical, aliases);
        }
    }

    print_ontology_stats(ontology);
}

pub fn print_ontology_stats(ontology: &[OntologyEntry]) {
    let summary = OntologySummary::of(ontology);
    println!();
    println!("=== FINAL ONTOLOGY STATS ===");
    println!("Total entries: {}", summary.entries);
    println!("Total surface forms: {}", summary.surface_forms);
    println!("Entries with confirmTokens: {}", summary.with_confirm_tokens);
    println!("Entries with recipeCount: {}", summary.with_recipe_count);
}
