use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use sporeprint_cli::classify::{format_metrics, run_classify, write_classify_report};
use sporeprint_cli::config::{load_dashboard_config, validate_csv_file, DashboardConfig};
use sporeprint_cli::dashboard::FormState;
use sporeprint_cli::server;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("SPOREPRINT_LOG", "error,sporeprint=info"))
        .init();

    let matches = Command::new("sporeprint")
        .version(clap::crate_version!())
        .author("Sporeprint developers")
        .about("\u{1F344} Sporeprint - Are your mushrooms edible or poisonous")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Run the interactive binary classification dashboard")
                .arg(config_arg())
                .arg(data_arg())
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .help(
                            "Address to listen on, e.g. 127.0.0.1:8501. \
                             Overrides the bind address specified in the configuration file.",
                        )
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Fit one classifier, print its metrics and write an HTML report")
                .arg(config_arg())
                .arg(data_arg())
                .arg(
                    Arg::new("classifier")
                        .long("classifier")
                        .help("Classifier to fit.")
                        .required(true)
                        .value_parser(["svm", "logistic_regression", "random_forest"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("c")
                        .short('c')
                        .long("c")
                        .help("Regularization parameter C for svm and logistic_regression [0.01, 10].")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("kernel")
                        .long("kernel")
                        .help("SVM kernel.")
                        .value_parser(["rbf", "linear"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("gamma")
                        .long("gamma")
                        .help("SVM kernel coefficient.")
                        .value_parser(["scale", "auto"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("max_iter")
                        .long("max-iter")
                        .help("Maximum number of logistic regression iterations [100, 500].")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("n_estimators")
                        .long("n-estimators")
                        .help("Number of trees in the forest [100, 5000].")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("max_depth")
                        .long("max-depth")
                        .help("Maximum depth of each tree [1, 20].")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("bootstrap")
                        .long("bootstrap")
                        .help("Bootstrap samples when building trees.")
                        .value_parser(["true", "false"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("metrics")
                        .short('m')
                        .long("metrics")
                        .help("Comma-separated charts: confusion_matrix, roc_curve, precision_recall_curve.")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("show_raw_data")
                        .long("show-raw-data")
                        .help("Include the encoded dataset in the report.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path of the HTML report. Defaults to sporeprint_<classifier>.html.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("serve", sub_m)) => handle_serve(sub_m),
        Some(("classify", sub_m)) => handle_classify(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1)
    }
    Ok(())
}

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to dashboard JSON configuration file")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn data_arg() -> Arg {
    Arg::new("data")
        .short('d')
        .long("data")
        .help(
            "Path to the mushroom CSV. \
             Overrides the data file specified in the configuration file.",
        )
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

/// Configuration file (or defaults) with the shared command line overrides applied.
fn resolve_config(matches: &ArgMatches) -> Result<DashboardConfig> {
    let mut config = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        log::info!("[Sporeprint] Using config: {:?}", config_path);
        load_dashboard_config(config_path)?
    } else {
        log::info!("[Sporeprint] No config provided; using defaults.");
        DashboardConfig::default()
    };

    if let Some(data) = matches.get_one::<PathBuf>("data") {
        config.data.path = data.clone();
    }
    validate_csv_file(&config.data.path)?;
    Ok(config)
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let mut config = resolve_config(matches)?;
    if let Some(bind) = matches.get_one::<String>("bind") {
        config.bind = bind.clone();
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::run(config))
}

/// Command line flags are translated into dashboard form pairs so that they pass
/// the same range checks as the web form.
fn form_from_matches(matches: &ArgMatches) -> Result<FormState> {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(classifier) = matches.get_one::<String>("classifier") {
        pairs.push(("classifier", classifier.clone()));
    }
    if let Some(c) = matches.get_one::<String>("c") {
        pairs.push(("C", c.clone()));
        pairs.push(("C_LR", c.clone()));
    }
    for (flag, key) in [
        ("kernel", "kernel"),
        ("gamma", "gamma"),
        ("max_iter", "max_iter"),
        ("n_estimators", "n_estimators"),
        ("max_depth", "max_depth"),
        ("bootstrap", "bootstrap"),
    ] {
        if let Some(value) = matches.get_one::<String>(flag) {
            pairs.push((key, value.clone()));
        }
    }
    if let Some(metrics) = matches.get_many::<String>("metrics") {
        pairs.extend(metrics.map(|metric| ("metrics", metric.clone())));
    }
    if matches.get_flag("show_raw_data") {
        pairs.push(("show_raw_data", "true".to_string()));
    }

    FormState::from_pairs(pairs).context("Invalid classifier arguments")
}

fn handle_classify(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let form = form_from_matches(matches)?;
    let output_path = matches
        .get_one::<PathBuf>("output_file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("sporeprint_{}.html", form.classifier.key())));

    log::info!(
        "[Sporeprint::Classify] Fitting {} on {}",
        form.classifier,
        config.data.path.display()
    );
    let description = run_classify(&config, &form)?;
    if let Some(metrics) = format_metrics(&description) {
        println!("{}", metrics);
    }
    write_classify_report(&config, description, &output_path)?;
    log::info!(
        "[Sporeprint::Classify] Report written to {}",
        output_path.display()
    );
    Ok(())
}
