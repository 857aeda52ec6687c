use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use ensemble_cli::split::run_split;
use ensemble_cli::train::{load_train_config, run_training, TrainConfig};
use ensemble_kit::config::SplitConfig;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ENSEMBLE_LOG", "error,ensemble=info"))
        .init();

    let matches = Command::new("ensemble")
        .version(clap::crate_version!())
        .about("Train and evaluate weighted ensembles of trees, forests, boosting and margin classifiers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Split a dataset, train the configured models and report held-out metrics")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file (JSON)")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the dataset (*.csv or *.tsv). Overrides the data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("label_column")
                        .short('l')
                        .long("label-column")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Name of the label column. Overrides the configuration file."),
                )
                .arg(
                    Arg::new("model_type")
                        .short('m')
                        .long("model-type")
                        .help("Train a single model of this type instead of the configured ensemble.")
                        .value_parser([
                            "decision_tree",
                            "tree",
                            "random_forest",
                            "forest",
                            "gradient_boosting",
                            "gbm",
                            "svm",
                        ])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the split and for seeded forests.")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("split")
                .about("Split a dataset into train, validation and test files")
                .arg(
                    Arg::new("data")
                        .help("Path to the dataset (*.csv or *.tsv)")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory that receives train.csv, validation.csv and test.csv")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("label_column")
                        .short('l')
                        .long("label-column")
                        .default_value("label")
                        .help("Name of the label column."),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Shuffle seed.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("stratified")
                        .long("stratified")
                        .help("Preserve per-label proportions in every partition.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("train")
                        .long("train")
                        .help("Training ratio.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("validation")
                        .long("validation")
                        .help("Validation ratio.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("test")
                        .long("test")
                        .help("Test ratio.")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("split", sub_m)) => handle_split(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let mut config = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        log::info!("[Ensemble::Train] Using config: {:?}", config_path);
        load_train_config(config_path)?
    } else {
        eprintln!("[Ensemble::Train] No config file provided; using defaults.");
        TrainConfig::default()
    };

    config.apply_overrides(matches)?;

    if matches.get_one::<PathBuf>("config").is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[Ensemble::Train] Effective config:\n{}", default_json);
    }

    match run_training(&config) {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_split(matches: &ArgMatches) -> Result<()> {
    let data = matches
        .get_one::<String>("data")
        .map(String::as_str)
        .unwrap_or_default();
    let output_dir = matches
        .get_one::<PathBuf>("output_dir")
        .cloned()
        .unwrap_or_default();
    let label_column = matches
        .get_one::<String>("label_column")
        .map(String::as_str)
        .unwrap_or("label");

    let mut config = SplitConfig::default().stratified(matches.get_flag("stratified"));
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.random_seed = seed;
    }
    if let Some(&ratio) = matches.get_one::<f64>("train") {
        config.train_ratio = ratio;
    }
    if let Some(&ratio) = matches.get_one::<f64>("validation") {
        config.validation_ratio = ratio;
    }
    if let Some(&ratio) = matches.get_one::<f64>("test") {
        config.test_ratio = ratio;
    }

    let output = run_split(data, label_column, &output_dir, &config)?;
    let (train, validation, test) = output.sizes;
    eprintln!(
        "[Ensemble::Split] train {}, validation {}, test {} -> {}",
        train,
        validation,
        test,
        output_dir.display()
    );
    Ok(())
}
