// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod programs;
pub mod scheduler;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::{Core, EngineOptions};
use crate::errors::EngineError;
use crate::graph::{load_edge_list, Graph};
use crate::programs::{init_distances, shortest_path_update};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - graph loading
/// - the engine core, seeded with the shortest-path program at `--root`
/// - Ctrl-C handling (aborts the run)
pub async fn run(args: CliArgs) -> Result<()> {
    let options = resolve_options(&args)?;
    let mut graph = load_edge_list(&args.graph, f64::INFINITY)
        .with_context(|| format!("failed to load graph from {}", args.graph.display()))?;

    if args.dry_run {
        print_dry_run(&args, &options, &graph);
        return Ok(());
    }

    init_distances(&mut graph, args.root)?;

    let mut core = Core::with_options(options)?;
    core.set_graph(graph)?;
    core.schedule(args.root, shortest_path_update())?;

    // Ctrl-C -> abort the run; the engine stops after in-flight updates.
    let abort = core.abort_handle();
    let ctrl_c = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        warn!("Ctrl+C received; aborting run");
        abort.abort();
    });

    // The engine blocks; keep it off the async worker threads.
    let (mut core, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = core.start();
        (core, outcome)
    })
    .await?;
    ctrl_c.abort();

    let report = outcome?;
    info!(
        updates = report.updates,
        elapsed_ms = report.elapsed.as_millis() as u64,
        engine = %report.engine,
        "shortest path run complete"
    );
    core.report_metrics();

    let graph = core
        .destroy()?
        .ok_or(EngineError::GraphNotBound)?;

    for target in &args.targets {
        match graph.value(*target) {
            Ok(distance) => println!(
                "Shortest path from {} to {} was: {}",
                args.root, target, distance
            ),
            Err(e) => warn!(target = *target, error = %e, "cannot report distance"),
        }
    }

    Ok(())
}

/// Combine the config file (if any) with CLI overrides.
fn resolve_options(args: &CliArgs) -> Result<EngineOptions> {
    let cfg = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };

    let mut options = cfg.engine_options();
    if let Some(engine) = args.engine {
        options.engine = engine;
    }
    if let Some(ncpus) = args.ncpus {
        options.ncpus = ncpus;
    }
    if let Some(scheduler) = args.scheduler {
        options.scheduler = scheduler;
    }
    if let Some(policy) = args.policy {
        options.policy = policy;
    }

    debug!(?options, "resolved engine options");
    Ok(options)
}

/// Simple dry-run output: print options and graph shape.
fn print_dry_run(args: &CliArgs, options: &EngineOptions, graph: &Graph<f64, f64>) {
    println!("vertexflow dry-run");
    println!("  engine    = {}", options.engine);
    println!("  ncpus     = {}", options.ncpus);
    println!("  scheduler = {:?}", options.scheduler);
    println!("  policy    = {:?}", options.policy);
    println!();
    println!("graph: {}", args.graph.display());
    println!("  vertices = {}", graph.num_vertices());
    println!("  edges    = {}", graph.num_edges());
    println!("  memory   ~ {} bytes", graph.memory_usage());
    println!("  root     = {}", args.root);
    if !graph.contains(args.root) {
        println!("  (root is not a vertex of this graph)");
    }

    debug!("dry-run complete (no execution)");
}
