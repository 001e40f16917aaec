use anyhow::Context;
use clap::{builder::FalseyValueParser, ArgAction, Args, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

use krishisahay::{
    chart,
    config::{Settings, SettingsFile},
    features::Readings,
    model::TorchClassifier,
    report, FormOptions, Language, MetadataTable, RecommendRequest, Recommender, Vocabularies,
};

#[derive(Parser)]
#[command(author, version, about = "KrishiSahay smart fertilizer recommender", long_about = None)]
struct Cli {
    /// TorchScript classifier
    #[arg(long = "model", env = "MODEL_PATH", global = true)]
    model_path: Option<PathBuf>,

    /// Label encoder sidecar JSON
    #[arg(long = "meta", env = "META_PATH", global = true)]
    meta_path: Option<PathBuf>,

    /// Replacement fertilizer details table (JSON)
    #[arg(long = "fertilizer-info", env = "FERTILIZER_INFO_PATH", global = true)]
    fertilizer_info_path: Option<PathBuf>,

    /// JSON settings file; fills anything not given by flags or environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log feature vector statistics for every request
    #[arg(
        long,
        env = "LOG_PRED",
        global = true,
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    log_pred: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List valid soil and crop types and reading bounds
    Options {
        #[arg(long)]
        json: bool,
    },
    /// Recommend a fertilizer
    Recommend(RecommendArgs),
}

#[derive(Args)]
struct RecommendArgs {
    /// Soil type, e.g. Loamy
    #[arg(long)]
    soil: String,

    /// Crop type, e.g. Wheat
    #[arg(long)]
    crop: String,

    #[arg(long, short = 'n', default_value_t = 20.0)]
    nitrogen: f64,

    #[arg(long, short = 'k', default_value_t = 30.0)]
    potassium: f64,

    #[arg(long, short = 'p', default_value_t = 40.0)]
    phosphorous: f64,

    /// Soil pH
    #[arg(long, default_value_t = 6.5)]
    ph: f64,

    /// Rainfall in mm
    #[arg(long, default_value_t = 100.0)]
    rainfall: f64,

    /// Language code: en or hi
    #[arg(long, default_value = "en")]
    lang: String,

    /// Print the record as JSON
    #[arg(long)]
    json: bool,

    /// Also write the nutrient balance chart to this PNG
    #[arg(long)]
    chart: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let args = match cli.command {
        Command::Options { json } => {
            // Needs no model.
            let options = FormOptions::new(&Vocabularies::default());
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                print!("{}", report::render_options(&options));
            }
            return Ok(());
        }
        Command::Recommend(args) => args,
    };
    let language: Language = args.lang.parse()?;

    let file = cli
        .config
        .as_ref()
        .map(SettingsFile::load)
        .transpose()
        .context("failed to load settings file")?;
    let settings = Settings::resolve(
        SettingsFile {
            model_path: cli.model_path,
            meta_path: cli.meta_path,
            fertilizer_info_path: cli.fertilizer_info_path,
            log_pred: cli.log_pred.then_some(true),
        },
        file,
    );

    let metadata = match &settings.fertilizer_info_path {
        Some(path) => MetadataTable::load(path)
            .with_context(|| format!("failed to load fertilizer info {}", path.display()))?,
        None => MetadataTable::builtin(),
    };

    let mdl = TorchClassifier::load(&settings.model_path, &settings.meta_path)
        .context("cannot serve recommendations")?;
    tracing::info!(
        model = %settings.model_path.display(),
        labels = ?mdl.meta().classes,
        "loaded model"
    );

    let recommender = Recommender::new(Arc::new(mdl), metadata)
        .with_feature_logging(settings.log_pred);

    let req = RecommendRequest {
        soil: args.soil,
        crop: args.crop,
        readings: Readings {
            nitrogen: args.nitrogen,
            potassium: args.potassium,
            phosphorous: args.phosphorous,
            ph: args.ph,
            rainfall: args.rainfall,
        },
    };

    let record = recommender.recommend(&req, language)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", report::render_text(&record));
    }

    if let (Some(path), Some(nutrients)) = (&args.chart, &record.nutrients) {
        chart::render_nutrient_chart(nutrients, path)
            .with_context(|| format!("failed to write chart {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_pred_env_accepts_numeric_flags() {
        std::env::set_var("LOG_PRED", "1");
        let on = Cli::try_parse_from(["krishisahay", "options"]);
        std::env::set_var("LOG_PRED", "0");
        let off = Cli::try_parse_from(["krishisahay", "options"]);
        std::env::remove_var("LOG_PRED");

        assert!(on.expect("LOG_PRED=1 should parse").log_pred);
        assert!(!off.expect("LOG_PRED=0 should parse").log_pred);

        let flag = Cli::try_parse_from(["krishisahay", "options", "--log-pred"]).unwrap();
        assert!(flag.log_pred);
    }

    #[test]
    fn recommend_defaults_match_form() {
        let cli =
            Cli::try_parse_from(["krishisahay", "recommend", "--soil", "Loamy", "--crop", "Wheat"])
                .unwrap();
        match cli.command {
            Command::Recommend(args) => {
                assert_eq!(
                    (args.nitrogen, args.potassium, args.phosphorous, args.ph, args.rainfall),
                    (20.0, 30.0, 40.0, 6.5, 100.0)
                );
                assert_eq!(args.lang, "en");
            }
            Command::Options { .. } => panic!("expected recommend"),
        }
    }
}
