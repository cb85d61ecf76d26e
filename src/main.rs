use clap::{Parser, Subcommand};
use knit::{
    Config, analyze, find_class_files, load_class_files, print_class_table, print_failures,
    print_json, print_no_files_message, print_summaries,
};
use std::path::{Path, PathBuf};

/// knit - cohesion metrics for compiled JVM classes
#[derive(Parser, Debug)]
#[command(name = "knit", version, about = "Cohesion metrics for compiled JVM classes")]
struct Cli {
    /// Use specified config file instead of defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory with compiled classes (for default analyze command)
    #[arg(default_value = ".")]
    path: String,

    /// Comma-separated metric names to compute (default: all)
    #[arg(long, value_delimiter = ',')]
    metrics: Option<Vec<String>>,

    /// Score constructors alongside regular methods
    #[arg(long)]
    include_ctors: bool,

    /// Score static methods
    #[arg(long)]
    include_statics: bool,

    /// Score private methods
    #[arg(long)]
    include_private: bool,

    /// Score compiler-generated bridge/synthetic methods
    #[arg(long)]
    include_bridges: bool,

    /// Emit the full report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump the structural skeleton as JSON
    Skeleton {
        /// Directory with compiled classes
        #[arg(default_value = ".")]
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Skeleton { ref path }) => run_skeleton(path, &config),
        None => run_analyze(&cli.path, &config, cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<Config, knit::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(names) = &cli.metrics {
        config.metrics = Config::parse_metrics(names)?;
    }
    config.filters.include_ctors |= cli.include_ctors;
    config.filters.include_statics |= cli.include_statics;
    config.filters.include_private |= cli.include_private;
    config.filters.include_bridges |= cli.include_bridges;
    Ok(config)
}

fn run_analyze(path: &str, config: &Config, json: bool) {
    let root = Path::new(path);
    let files = find_class_files(root);
    if files.is_empty() {
        print_no_files_message(root);
        return;
    }

    let (blobs, resource_failures) = load_class_files(&files);
    let mut analysis = analyze(&blobs, config);
    analysis.input_failures.extend(resource_failures);
    analysis.input_failures.sort_by(|a, b| a.id.cmp(&b.id));

    if json {
        print_json(&analysis);
    } else {
        print_class_table(&analysis, &config.metrics);
        print_summaries(&analysis, &config.metrics);
    }
    print_failures(&analysis);
}

fn run_skeleton(path: &str, config: &Config) {
    let root = Path::new(path);
    let files = find_class_files(root);
    if files.is_empty() {
        print_no_files_message(root);
        return;
    }

    let (blobs, resource_failures) = load_class_files(&files);
    // Metrics are irrelevant for a skeleton dump.
    let bare = Config {
        metrics: Vec::new(),
        ..config.clone()
    };
    let mut analysis = analyze(&blobs, &bare);
    analysis.input_failures.extend(resource_failures);

    match serde_json::to_string_pretty(&analysis.skeleton) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
    print_failures(&analysis);
}
