mod build_clusters;
mod compile;
mod expand_ontology;
mod merge_clusters;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use ingredient_ontology::{ClusterConfig, CorpusConfig, ExpandConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use build_clusters::BuildClustersConfig;
use compile::CompileConfig;
use expand_ontology::ExpandOntologyConfig;
use merge_clusters::MergeClustersConfig;

#[derive(Parser)]
#[command(name = "ramekin")]
#[command(about = "Ramekin ingredient vocabulary tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster raw ingredient strings from the recipe corpus
    BuildClusters {
        /// Recipe CSV with an ingredients list column
        #[arg(long, default_value = "data/RAW_recipes.csv")]
        recipes: PathBuf,
        /// Output cluster file
        #[arg(long, default_value = "data/synonym-clusters.json")]
        output: PathBuf,
        /// Ignore ingredients seen fewer times than this
        #[arg(long, default_value_t = 5)]
        min_frequency: u64,
        /// Print results without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge synonym clusters into the ingredient ontology
    MergeClusters {
        #[arg(long, default_value = "data/synonym-clusters.json")]
        clusters: PathBuf,
        #[arg(long, default_value = "data/ingredient-ontology.json")]
        ontology: PathBuf,
        /// Versioned synonym table used to seed confirm tokens
        #[arg(long, default_value = "data/synonym-table.json")]
        synonyms: PathBuf,
        #[arg(long, default_value = "data/ingredient-ontology-v2.json")]
        output: PathBuf,
        #[arg(long, default_value = "data/unmatched-clusters.json")]
        unmatched: PathBuf,
        /// Print results without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Add ontology entries for frequent unmatched clusters
    ExpandOntology {
        /// Ontology to expand (rewritten in place)
        #[arg(long, default_value = "data/ingredient-ontology-v2.json")]
        ontology: PathBuf,
        #[arg(long, default_value = "data/unmatched-clusters.json")]
        unmatched: PathBuf,
        /// Gap report with precomputed external candidates
        #[arg(long, default_value = "data/synonym-gaps.json")]
        gaps: PathBuf,
        /// Minimum recipe count for a new entry
        #[arg(long, default_value_t = 50)]
        min_count: u64,
        /// Print results without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Run build-clusters, merge-clusters and expand-ontology in sequence
    Compile {
        #[arg(long, default_value = "data/RAW_recipes.csv")]
        recipes: PathBuf,
        #[arg(long, default_value = "data/ingredient-ontology.json")]
        ontology: PathBuf,
        #[arg(long, default_value = "data/synonym-table.json")]
        synonyms: PathBuf,
        #[arg(long, default_value = "data/synonym-gaps.json")]
        gaps: PathBuf,
        /// Directory for the cluster, unmatched and expanded ontology files
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
        #[arg(long, default_value_t = 5)]
        min_frequency: u64,
        #[arg(long, default_value_t = 50)]
        min_count: u64,
        /// Print results without writing files
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Date stamped into generated reports.
pub(crate) fn generated_date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildClusters {
            recipes,
            output,
            min_frequency,
            dry_run,
        } => {
            let config = BuildClustersConfig {
                recipes_file: recipes,
                output,
                clusters: ClusterConfig {
                    min_frequency,
                    ..ClusterConfig::default()
                },
                dry_run,
                ..BuildClustersConfig::default()
            };
            build_clusters::run(&config)?;
        }
        Commands::MergeClusters {
            clusters,
            ontology,
            synonyms,
            output,
            unmatched,
            dry_run,
        } => {
            merge_clusters::run(&MergeClustersConfig {
                clusters_file: clusters,
                ontology_file: ontology,
                synonyms_file: synonyms,
                output,
                unmatched_output: unmatched,
                dry_run,
            })?;
        }
        Commands::ExpandOntology {
            ontology,
            unmatched,
            gaps,
            min_count,
            dry_run,
        } => {
            expand_ontology::run(&ExpandOntologyConfig {
                ontology_file: ontology,
                unmatched_file: unmatched,
                gaps_file: gaps,
                expand: ExpandConfig {
                    min_count,
                    ..ExpandConfig::default()
                },
                dry_run,
            })?;
        }
        Commands::Compile {
            recipes,
            ontology,
            synonyms,
            gaps,
            output_dir,
            min_frequency,
            min_count,
            dry_run,
        } => {
            let ontology_out = output_dir.join("ingredient-ontology-v2.json");
            let unmatched_out = output_dir.join("unmatched-clusters.json");
            let config = CompileConfig {
                build: BuildClustersConfig {
                    recipes_file: recipes,
                    output: output_dir.join("synonym-clusters.json"),
                    corpus: CorpusConfig::default(),
                    clusters: ClusterConfig {
                        min_frequency,
                        ..ClusterConfig::default()
                    },
                    dry_run,
                },
                merge: MergeClustersConfig {
                    clusters_file: output_dir.join("synonym-clusters.json"),
                    ontology_file: ontology,
                    synonyms_file: synonyms,
                    output: ontology_out.clone(),
                    unmatched_output: unmatched_out.clone(),
                    dry_run,
                },
                expand: ExpandOntologyConfig {
                    ontology_file: ontology_out,
                    unmatched_file: unmatched_out,
                    gaps_file: gaps,
                    expand: ExpandConfig {
                        min_count,
                        ..ExpandConfig::default()
                    },
                    dry_run,
                },
            };
            compile::run(&config)?;
        }
    }

    Ok(())
}
