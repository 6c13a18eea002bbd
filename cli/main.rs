#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use gamaffinity::config::RecommenderConfig;
use gamaffinity::pipeline::{DataLayout, Recommender};

#[derive(Args)]
pub struct RecommendArgs {
    /// Student identifier, as it appears in the roster's User column (e.g. elevebf01)
    #[arg(long)]
    pub user: String,

    /// Directory holding userStats.csv and the Hexad/ and Motivation/ model folders
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory the three affinity CSV files are written to
    #[arg(long, default_value = "outputs")]
    pub out_dir: PathBuf,

    /// TOML config with alpha, objective weights and blend weights
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// p-value threshold; a coefficient is kept only if its p-value is strictly below it
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Weight of the rescaled Hexad score in the final blend
    #[arg(long)]
    pub w_hexad: Option<f64>,

    /// Weight of the rescaled Motivation score in the final blend
    #[arg(long)]
    pub w_motiv: Option<f64>,

    /// Print the rankings without writing any CSV file
    #[arg(long)]
    pub no_export: bool,
}

#[derive(Parser)]
#[command(
    name = "gamaffinity",
    about = "Recommend the gamification element that best motivates a student",
    long_about = "Scores every gamification element against a student's Hexad and Motivation \
                 profiles using fitted PLS path coefficients, keeps only significant paths, \
                 and blends both rankings into one final recommendation."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the gamification elements for one student
    #[command(about = "Rank gamification elements for a student (outputs: 3 CSV files)")]
    Recommend(RecommendArgs),

    /// Print the default configuration as TOML
    #[command(about = "Print the default configuration (TOML) to seed a config file")]
    Config,

    /// Display version information
    #[command(about = "Display version information")]
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Recommend(args)) => recommend(args),
        Some(Commands::Config) => print_default_config(),
        Some(Commands::Version) => {
            println!("gamaffinity {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn resolve_config(args: &RecommendArgs) -> Result<RecommenderConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => RecommenderConfig::load(path)?,
        None => RecommenderConfig::default(),
    };
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(weight) = args.w_hexad {
        config.blend.hexad = weight;
    }
    if let Some(weight) = args.w_motiv {
        config.blend.motivation = weight;
    }
    Ok(config)
}

fn recommend(args: RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;
    let recommender = Recommender::new(config)?;
    let layout = DataLayout::new(&args.data_dir);

    let recommendation = recommender.recommend(&layout, &args.user)?;

    println!("\n=== Hexad affinity vector ===");
    print!("{}", recommendation.hexad);

    println!("\n=== Motivation affinity vector ===");
    print!("{}", recommendation.motivation);

    println!("\n=== Combined ranking ===");
    print!("{}", recommendation.combined);

    if let Some(element) = recommendation.final_element() {
        println!("\nFinal recommendation: {element}");
    }

    if !args.no_export {
        let files = recommendation.export(&args.out_dir)?;
        println!("\nResults written to:");
        for path in [&files.hexad, &files.motivation, &files.combined] {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

fn print_default_config() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", RecommenderConfig::default().to_toml_string()?);
    Ok(())
}
