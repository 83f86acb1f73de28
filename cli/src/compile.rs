//! Run every stage from the recipe corpus to the expanded ontology.

use anyhow::{Context, Result};
use ingredient_ontology::store::{require_artifacts, write_json};
use ingredient_ontology::CandidateOracle;

use crate::build_clusters::{self, BuildClustersConfig};
use crate::expand_ontology::{self, ExpandOntologyConfig};
use crate::merge_clusters::{self, MergeClustersConfig};

pub struct CompileConfig {
    pub build: BuildClustersConfig,
    pub merge: MergeClustersConfig,
    pub expand: ExpandOntologyConfig,
}

pub fn run(config: &CompileConfig) -> Result<()> {
    // Every input is checked before anything is computed or written
    require_artifacts([
        config.build.recipes_file.as_path(),
        config.merge.ontology_file.as_path(),
        config.merge.synonyms_file.as_path(),
        config.expand.gaps_file.as_path(),
    ])?;
    let oracle = CandidateOracle::load(&config.expand.gaps_file)?;

    println!("=== Stage 1: Build Synonym Clusters ===");
    println!();
    let report = build_clusters::cluster_corpus(&config.build)?;
    println!(
        "Clusters: {} ({} with aliases)",
        report.stats.total_clusters, report.stats.with_aliases
    );
    if !config.build.dry_run {
        write_json(&config.build.output, &report)
            .with_context(|| format!("Failed to write {}", config.build.output.display()))?;
        println!("Written to {}", config.build.output.display());
    }

    println!();
    println!("=== Stage 2: Merge Clusters to Ontology ===");
    println!();
    let (ontology, unmatched) = merge_clusters::merge_into(&config.merge, &report.clusters)?;
    merge_clusters::write_outputs(&config.merge, &ontology, unmatched.clone())?;

    println!();
    println!("=== Stage 3: Expand Ontology ===");
    println!();
    expand_ontology::expand_and_write(&config.expand, ontology, &unmatched.clusters, &oracle)
}
