//! `simdist` - inspect and exercise runtime SIMD kernel dispatch.

use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use simdist_core::{
    CpuFeatures, DispatchConfig, DispatchRegistry, Element, ElementType, Metric, Tier,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// simdist - runtime CPU-dispatched distance kernels
#[derive(Parser, Debug)]
#[command(name = "simdist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "SIMDIST_CONFIG")]
    config: Option<PathBuf>,

    /// Widest SIMD tier to select (overrides config and environment)
    #[arg(long, global = true)]
    max_tier: Option<Tier>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show CPU features and the kernel bound for every metric and element type
    Info {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute the distance between two comma-separated vectors
    Distance {
        /// Metric (manhattan, euclidean)
        #[arg(short, long, default_value = "euclidean")]
        metric: Metric,

        /// Element type (f32, f64)
        #[arg(short, long, default_value = "f64")]
        element: ElementType,

        /// Print the reduced distance instead of the true distance
        #[arg(long)]
        reduced: bool,

        /// First vector, e.g. `1,2,3`
        #[arg(allow_hyphen_values = true)]
        a: String,

        /// Second vector, e.g. `4,0,3`
        #[arg(allow_hyphen_values = true)]
        b: String,
    },

    /// Time every kernel variant the host can run
    Bench {
        /// Metric (manhattan, euclidean)
        #[arg(short, long, default_value = "euclidean")]
        metric: Metric,

        /// Element type (f32, f64)
        #[arg(short, long, default_value = "f32")]
        element: ElementType,

        /// Vector dimension
        #[arg(short, long, default_value = "768")]
        dim: usize,

        /// Timed iterations per variant
        #[arg(short, long, default_value = "100000")]
        iters: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let registry = build_registry(&cli)?;

    match cli.command {
        Commands::Info { json } => info(&registry, json),
        Commands::Distance {
            metric,
            element,
            reduced,
            a,
            b,
        } => match element {
            ElementType::F32 => distance::<f32>(&registry, metric, reduced, &a, &b),
            ElementType::F64 => distance::<f64>(&registry, metric, reduced, &a, &b),
        },
        Commands::Bench {
            metric,
            element,
            dim,
            iters,
        } => match element {
            ElementType::F32 => bench::<f32>(&registry, metric, dim, iters),
            ElementType::F64 => bench::<f64>(&registry, metric, dim, iters),
        },
    }
}

fn build_registry(cli: &Cli) -> Result<DispatchRegistry> {
    let mut config =
        DispatchConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(tier) = cli.max_tier {
        config.max_tier = Some(tier);
    }
    tracing::debug!(?config, "Effective dispatch configuration");
    Ok(DispatchRegistry::with_config(config))
}

fn info(registry: &DispatchRegistry, json: bool) -> Result<()> {
    let features = CpuFeatures::detect();
    let best = features.best_tier();

    let mut selections = Vec::new();
    for metric in Metric::ALL {
        for element in ElementType::ALL {
            let tier = registry.selected_tier(metric, element)?;
            selections.push((metric, element, tier));
        }
    }

    if json {
        let report = serde_json::json!({
            "features": features,
            "best_tier": best,
            "max_tier": registry.config().max_tier,
            "selections": selections
                .iter()
                .map(|(metric, element, tier)| serde_json::json!({
                    "metric": metric,
                    "element": element,
                    "tier": tier,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", "CPU Features".bold().underline());
    for (name, present) in [
        ("sse2", features.sse2),
        ("avx2", features.avx2),
        ("fma", features.fma),
        ("avx512f", features.avx512f),
        ("neon", features.neon),
    ] {
        let mark = if present { "yes".green() } else { "no".red() };
        println!("  {:<8} {}", name.cyan(), mark);
    }
    println!("  {} {}", "Best tier:".cyan(), best.to_string().green());
    if let Some(ceiling) = registry.config().max_tier {
        println!("  {} {}", "Ceiling:".cyan(), ceiling.to_string().yellow());
    }

    println!("\n{}", "Selected Kernels".bold().underline());
    for (metric, element, tier) in selections {
        println!(
            "  {:<10} {:<4} {}",
            metric.name(),
            element.name(),
            tier.to_string().green()
        );
    }
    println!();
    Ok(())
}

fn parse_vector<T: Element>(input: &str) -> Result<Vec<T>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map(T::from_f64)
                .with_context(|| format!("Invalid number '{}' in vector '{input}'", part.trim()))
        })
        .collect()
}

fn distance<T: Element>(
    registry: &DispatchRegistry,
    metric: Metric,
    reduced: bool,
    a: &str,
    b: &str,
) -> Result<()> {
    let a = parse_vector::<T>(a)?;
    let b = parse_vector::<T>(b)?;
    if a.len() != b.len() {
        bail!(
            "Vectors must have the same length (got {} and {})",
            a.len(),
            b.len()
        );
    }

    let variant = registry.try_kernel::<T>(metric)?;
    let rdist = variant.compute(&a, &b);
    let value = if reduced {
        rdist
    } else {
        metric.rdist_to_dist(rdist)
    };
    tracing::debug!(tier = %variant.tier(), dim = a.len(), "Computed distance");
    println!("{value}");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn generate_vector<T: Element>(dim: usize, seed: f64) -> Vec<T> {
    (0..dim)
        .map(|i| T::from_f64((seed + i as f64 * 0.1).sin()))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn bench<T: Element>(
    registry: &DispatchRegistry,
    metric: Metric,
    dim: usize,
    iters: u32,
) -> Result<()> {
    if iters == 0 {
        bail!("--iters must be at least 1");
    }

    let a = generate_vector::<T>(dim, 0.0);
    let b = generate_vector::<T>(dim, 1.0);
    let variants = registry.available_variants::<T>(metric);
    let baseline = variants
        .iter()
        .find(|v| v.tier() == Tier::Scalar)
        .map(|v| v.compute(&a, &b).to_f64())
        .context("Scalar baseline variant missing")?;
    let bound = registry.try_kernel::<T>(metric)?.tier();

    println!(
        "\n{} {} over {} x {} ({} iterations)",
        "Benchmark".bold().underline(),
        metric.name().green(),
        T::TYPE,
        dim,
        iters
    );

    let bytes_per_call = (2 * dim * T::TYPE.size_bytes()) as f64;
    for variant in variants {
        for _ in 0..3 {
            black_box(variant.compute(&a, &b));
        }

        let start = Instant::now();
        for _ in 0..iters {
            black_box(variant.compute(black_box(&a), black_box(&b)));
        }
        let elapsed = start.elapsed();

        let ns_per_call = elapsed.as_nanos() as f64 / f64::from(iters);
        let gb_per_sec = if ns_per_call > 0.0 {
            bytes_per_call / ns_per_call
        } else {
            0.0
        };
        let deviation = (variant.compute(&a, &b).to_f64() - baseline).abs();
        let marker = if variant.tier() == bound { "*" } else { " " };

        println!(
            " {marker} {:<8} {:>2} lanes {:>12.1} ns/call {:>8.2} GB/s  max dev {:.3e}",
            variant.tier().name(),
            variant.tier().lanes(T::TYPE),
            ns_per_call,
            gb_per_sec,
            deviation
        );
    }
    println!("\n  * bound by dispatch under current configuration\n");
    Ok(())
}
