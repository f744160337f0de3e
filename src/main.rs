use clap::Parser;
use std::path::Path;

use ccld_etl::utils::{logger, validation::Validate};
use ccld_etl::{CapacityEngine, CliConfig, MergeReconciler, ReportPipeline};

fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting ccld-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let merge_target = config.merge.clone();
    let force = config.force;
    let write_updated = config.write_updated;

    let pipeline = ReportPipeline::new(config);
    let engine = CapacityEngine::new(pipeline);

    let outcome = match engine.run() {
        Ok(outcome) => {
            println!("✅ Capacity scan completed successfully!");
            outcome
        }
        Err(e) => {
            tracing::error!("❌ Capacity scan failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Some(target) = merge_target {
        let target = Path::new(&target);
        if !target.exists() {
            tracing::warn!("Merge target not found, skipping merge: {}", target.display());
            return;
        }

        let reconciler = MergeReconciler::new(&outcome.records, force);
        match reconciler.reconcile(target, write_updated) {
            Ok(updated) => {
                if write_updated {
                    println!("✅ Merged capacities into {} ({} rows updated)", target.display(), updated);
                } else {
                    println!(
                        "Would update {} rows in {} (run with --write-updated to apply)",
                        updated,
                        target.display()
                    );
                }
            }
            Err(e) => {
                tracing::error!("❌ Merge failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }
}
