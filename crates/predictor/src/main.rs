use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use recsys_core::{init_logging, load_dotenv, ConfigLoader, LogConfig, LoggingConfig};
use recsys_predictor::{pipeline, FeatureFlags, PredictorConfig, RunOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "recsys")]
#[command(about = "Neighborhood collaborative-filtering rating predictor", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, env = "RECSYS_TRAIN", help = "Training ratings file")]
    train: PathBuf,

    #[arg(
        long,
        env = "RECSYS_TEST",
        required_unless_present = "offline",
        help = "Query file to answer (ignored with --offline)"
    )]
    test: Option<PathBuf>,

    #[arg(long, env = "RECSYS_ATTRIBUTE", help = "Item attribute file")]
    attribute: Option<PathBuf>,

    #[arg(long, env = "RECSYS_RESULT", help = "Where to write predictions")]
    result: PathBuf,

    #[arg(
        long,
        help = "Hold out part of the training ratings and report RMSE"
    )]
    offline: bool,

    #[arg(short = 'k', long, help = "Neighbors kept per user [env: RECSYS_NEIGHBORS]")]
    neighbors: Option<usize>,

    #[arg(long, help = "Ratings held out per user offline [env: RECSYS_TEST_COUNT]")]
    test_count: Option<usize>,

    #[arg(long, requires = "attribute", help = "Fall back to items sharing an attribute")]
    use_attribute: bool,

    #[arg(
        long,
        requires = "use_attribute",
        help = "Weight attribute groups by 1/(size - 1)"
    )]
    use_weight: bool,

    #[arg(long, help = "Write a JSON run summary to this path")]
    report: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    load_dotenv();

    let cli = Cli::parse();

    let logging = LoggingConfig::from_env()?;
    logging.validate()?;
    init_logging(&LogConfig {
        format: logging.format,
        level: logging.level,
        service_name: "recsys".to_string(),
    })?;

    let mut config = PredictorConfig::from_env()?;
    if let Some(neighbors) = cli.neighbors {
        config.neighbors = neighbors;
    }
    if let Some(test_count) = cli.test_count {
        config.test_count = test_count;
    }
    config.validate()?;

    let options = RunOptions {
        train: cli.train,
        test: cli.test,
        attributes: cli.attribute,
        result: cli.result,
        offline: cli.offline,
        flags: FeatureFlags::new(cli.use_attribute, cli.use_weight)?,
        report: cli.report,
    };

    let summary = pipeline::run(&options, &config).with_context(|| {
        format!("Prediction run failed (train: {})", options.train.display())
    })?;

    match summary.rmse {
        Some(rmse) => {
            info!(rmse, "Offline evaluation complete");
            println!("{} {:.6}", "RMSE:".green().bold(), rmse);
        }
        None => {
            println!(
                "{} {} predictions written to {}",
                "Done:".green().bold(),
                summary.predictions,
                options.result.display()
            );
        }
    }

    Ok(())
}
