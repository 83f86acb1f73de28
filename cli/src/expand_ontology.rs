//! Add new ontology entries for frequent unmatched clusters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ingredient_ontology::store::{read_json, require_artifacts, write_json};
use ingredient_ontology::{
    apply_expansion, expand_ontology, CandidateOracle, ExpandConfig, ExpandOutcome,
    OntologyEntry, UnmatchedCluster, UnmatchedReport,
};

pub struct ExpandOntologyConfig {
    /// Read and rewritten in place.
    pub ontology_file: PathBuf,
    pub unmatched_file: PathBuf,
    pub gaps_file: PathBuf,
    pub expand: ExpandConfig,
    pub dry_run: bool,
}

impl Default for ExpandOntologyConfig {
    fn default() -> Self {
        Self {
            ontology_file: PathBuf::from("data/ingredient-ontology-v2.json"),
            unmatched_file: PathBuf::from("data/unmatched-clusters.json"),
            gaps_file: PathBuf::from("data/synonym-gaps.json"),
            expand: ExpandConfig::default(),
            dry_run: false,
        }
    }
}

pub fn run(config: &ExpandOntologyConfig) -> Result<()> {
    require_artifacts([
        config.ontology_file.as_path(),
        config.unmatched_file.as_path(),
        config.gaps_file.as_path(),
    ])?;

    println!("=== Expand Ontology from Clusters ===");
    println!();

    let oracle = CandidateOracle::load(&config.gaps_file)?;
    let ontology: Vec<OntologyEntry> = read_json(&config.ontology_file)?;
    let report: UnmatchedReport = read_json(&config.unmatched_file)?;
    println!("Unmatched clusters: {}", report.clusters.len());

    expand_and_write(config, ontology, &report.clusters, &oracle)
}

/// Expand `ontology` with `unmatched` and write it back, unless dry-running.
pub fn expand_and_write(
    config: &ExpandOntologyConfig,
    mut ontology: Vec<OntologyEntry>,
    unmatched: &[UnmatchedCluster],
    oracle: &CandidateOracle,
) -> Result<()> {
    println!("Current ontology: {} entries", ontology.len());
    println!("External candidates available: {}", oracle.len());

    let outcome = expand_ontology(unmatched, oracle, &ontology, &config.expand);
    print_summary(&outcome, config.expand.min_count);

    if config.dry_run {
        println!();
        println!("[DRY RUN - no files written]");
        return Ok(());
    }

    let added = outcome.new_entries.len();
    apply_expansion(&mut ontology, outcome.new_entries);
    write_json(&config.ontology_file, &ontology)
        .with_context(|| format!("Failed to write {}", config.ontology_file.display()))?;

    println!();
    println!(
        "Written {} entries to {}",
        ontology.len(),
        config.ontology_file.display()
    );
    println!("  New entries added: {}", added);
    println!(
        "  Total surface forms: {}",
        ontology.iter().map(|e| e.surface_forms.len()).sum::<usize>()
    );

    Ok(())
}

fn print_summary(outcome: &ExpandOutcome, min_count: u64) {
    let stats = &outcome.stats;
    println!(
        "Clusters with count >= {}: {}",
        min_count,
        stats.considered - stats.below_min_count
    );
    println!("Already in ontology: {}", stats.skipped_existing);
    println!("New entries to add: {}", outcome.new_entries.len());
    println!("New entries with external candidate: {}", stats.with_candidate);
    println!("New entries with strong candidate: {}", stats.high_score);

    println!();
    println!("=== SAMPLE NEW ENTRIES (top 20 by recipe count) ===");
    for entry in outcome.new_entries.iter().take(20) {
        let candidate = match entry.fdc_candidate.as_ref().and_then(Option::as_ref) {
            Some(c) => format!(
                " -> {} ({:.2})",
                truncate(&c.description, 40),
                c.match_score
            ),
            None => String::new(),
        };
        println!(
            "  [{:5}] {}{}",
            entry.recipe_count.flatten().unwrap_or_default(),
            entry.display_name,
            candidate
        );
        if entry.surface_forms.len() > 1 {
            let aliases: Vec<&str> = entry
                .surface_forms
                .iter()
                .skip(1)
                .take(3)
                .map(String::as_str)
                .collect();
            println!("          aliases: {:?}", aliases);
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
