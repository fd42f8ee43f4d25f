mod catalog;
mod client;
mod crawl;
mod model;
mod parser;
mod registry;
mod settings;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scraper::Html;
use tracing::{info, warn};

use client::{Endpoints, Fetch, HttpFetcher, OfflineFetcher};
use crawl::CrawlContext;
use parser::classify::Classifier;
use parser::merge::Extractor;
use registry::FacultyRegistry;
use settings::Settings;

#[derive(Parser)]
#[command(name = "su_courses", about = "Degree curriculum scraper for SUIS program pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl programs and write one course file per program
    Run {
        /// Program code to crawl (repeatable; default: programs from settings)
        #[arg(short, long = "program")]
        programs: Vec<String>,
        /// Output directory (default: output_dir from settings)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List programs on the degree index
    Programs,
    /// Extract courses from a saved degree page and print them as JSON
    Parse {
        /// Saved degree detail page
        file: PathBuf,
        /// Do not fetch linked course lists
        #[arg(long)]
        offline: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = Settings::load()?;
    let endpoints = Endpoints::from_settings(&settings)?;
    let registry = FacultyRegistry::builtin();
    info!("Faculty registry: {} courses", registry.len());

    let result = match cli.command {
        Commands::Run { programs, out } => {
            let fetcher = HttpFetcher::new(&settings)?;
            let wanted = select_programs(&settings, &programs);
            if wanted.is_empty() {
                println!("No programs configured. Set SU_PROGRAMS or pass --program.");
                return Ok(());
            }
            let out_dir = out.unwrap_or_else(|| settings.output_dir.clone());
            let available = catalog::fetch_programs(&fetcher, &endpoints)?;
            let majors = settings.detail_majors();
            let ctx = CrawlContext {
                fetcher: &fetcher,
                endpoints: &endpoints,
                registry: &registry,
                detail_majors: &majors,
            };

            let mut written = 0;
            for (code, file) in &wanted {
                if !available.iter().any(|p| &p.code == code) {
                    warn!("Program {} is not on the degree index, skipping", code);
                    continue;
                }
                let t_program = Instant::now();
                match run_program(&ctx, code, &out_dir, file) {
                    Ok(Some(path)) => {
                        written += 1;
                        println!(
                            "{}: wrote {} in {}",
                            code,
                            path.display(),
                            format_duration(t_program.elapsed())
                        );
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Program {} failed: {:#}", code, e),
                }
            }
            println!("{} of {} programs written to {}", written, wanted.len(), out_dir.display());
            Ok(())
        }
        Commands::Programs => {
            let fetcher = HttpFetcher::new(&settings)?;
            let programs = catalog::fetch_programs(&fetcher, &endpoints)?;
            if programs.is_empty() {
                println!("No programs found on the degree index.");
                return Ok(());
            }
            println!("{:<10} | {}", "Code", "Title");
            println!("{}", "-".repeat(72));
            for p in &programs {
                println!("{:<10} | {}", p.code, truncate(&p.title, 59));
            }
            println!("\n{} programs", programs.len());
            Ok(())
        }
        Commands::Parse { file, offline } => {
            if offline {
                parse_saved(&file, &OfflineFetcher, &endpoints, &registry)
            } else {
                let fetcher = HttpFetcher::new(&settings)?;
                parse_saved(&file, &fetcher, &endpoints, &registry)
            }
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Programs named on the command line (with their configured file name when
/// there is one), else every configured program.
fn select_programs(settings: &Settings, requested: &[String]) -> Vec<(String, String)> {
    let configured = settings.program_files();
    if requested.is_empty() {
        return configured;
    }
    requested
        .iter()
        .map(|code| {
            let file = configured
                .iter()
                .find(|(c, _)| c == code)
                .map(|(_, f)| f.clone())
                .unwrap_or_else(|| format!("{}.json", code));
            (code.clone(), file)
        })
        .collect()
}

/// Crawl one program and write its filtered records. `None` when nothing was
/// worth writing.
fn run_program<F: Fetch + Sync>(
    ctx: &CrawlContext<'_, F>,
    code: &str,
    out_dir: &Path,
    file: &str,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(term) = catalog::fetch_latest_term(ctx.fetcher, ctx.endpoints, code)? else {
        warn!("No terms listed for {}", code);
        return Ok(None);
    };
    let records = crawl::crawl_program(ctx, code, &term)
        .with_context(|| format!("Failed to fetch degree page of {}", code))?;
    if records.is_empty() {
        warn!("No courses found for {} ({})", code, term);
        return Ok(None);
    }
    let total = records.len();
    let detailed = store::retain_detailed(records);
    info!("{}: {} of {} courses have requisites", code, detailed.len(), total);
    if detailed.is_empty() {
        warn!("No course of {} has prerequisites or corequisites, nothing written", code);
        return Ok(None);
    }
    store::write_json(out_dir, file, &detailed).map(Some)
}

fn parse_saved<F: Fetch>(
    file: &Path,
    fetcher: &F,
    endpoints: &Endpoints,
    registry: &FacultyRegistry,
) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let doc = Html::parse_document(&html);
    let records = Extractor::new(fetcher, endpoints, registry, Classifier::default()).extract(&doc);
    println!("{}", serde_json::to_string_pretty(&records)?);
    info!("{} courses extracted from {}", records.len(), file.display());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
