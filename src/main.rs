use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use decision_matrix::scoring::{MissingValueError, MissingValuePolicy};

const EXIT_SUCCESS: i32 = 0;
const EXIT_SOURCE: i32 = 1;
const EXIT_SCORE: i32 = 2;
const EXIT_TERMINAL: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    /// Aligned table, chart and recommendation
    #[default]
    Table,
    /// Tab-separated values for scripting
    Tsv,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the scored matrix and recommendation (default if no subcommand)
    Show {
        /// Override a category weight for this run, e.g. --weight "Cost=25"
        #[arg(short, long = "weight", value_name = "CATEGORY=N")]
        weights: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also print the reasoning for every category
        #[arg(short, long)]
        reasoning: bool,
    },
    /// Adjust weights interactively with live rescoring
    Tui {
        /// Starting weight override, e.g. --weight "Cost=25"
        #[arg(short, long = "weight", value_name = "CATEGORY=N")]
        weights: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "decision-matrix")]
#[command(about = "Weighted decision matrix scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/decision-matrix/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Decision matrix spreadsheet (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Zero-based row holding the column headers
    #[arg(long, global = true)]
    header_row: Option<usize>,

    /// How to treat blank option values
    #[arg(long, value_enum, global = true)]
    missing_values: Option<MissingValuePolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Show {
        weights: Vec::new(),
        format: OutputFormat::Table,
        reasoning: false,
    });
    let start_time = Instant::now();

    // Load config, then let flags win
    let config_path = cli.config.map(PathBuf::from);
    let mut config = match decision_matrix::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(file) = cli.file {
        config.source = Some(file);
    }
    if let Some(row) = cli.header_row {
        config.header_row = Some(row);
    }
    if let Some(policy) = cli.missing_values {
        config.missing_values = Some(policy);
    }

    if let Err(errors) = decision_matrix::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let source = config.source();
    let header_row = config.header_row();
    let policy = config.missing_values();

    if cli.verbose {
        eprintln!(
            "Loading {} (header on row {})",
            source.display(),
            header_row + 1
        );
    }

    let matrix = match decision_matrix::matrix::MatrixCache::global().load(&source, header_row) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to load decision matrix: {:#}", e);
            std::process::exit(EXIT_SOURCE);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} categories in {:?}",
            matrix.rows.len(),
            start_time.elapsed()
        );
        for row in &matrix.rows {
            eprintln!(
                "  {}: base weight {}",
                row.name,
                row.base_weight
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "(blank)".to_string())
            );
        }
    }

    let override_args = match &command {
        Commands::Show { weights, .. } | Commands::Tui { weights } => weights.as_slice(),
    };

    let mut weights = decision_matrix::scoring::WeightController::from_rows(&matrix.rows);
    match decision_matrix::scoring::parse_weight_overrides(override_args, &matrix.rows) {
        Ok(overrides) => {
            if cli.verbose && !overrides.is_empty() {
                eprintln!("Applying {} weight override(s)", overrides.len());
            }
            weights.apply_overrides(&overrides);
        }
        Err(errors) => {
            eprintln!("Weight override errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
    }

    match command {
        Commands::Show {
            format, reasoning, ..
        } => {
            let card = match decision_matrix::scoring::compute_scores(
                &matrix.rows,
                weights.current(),
                policy,
            ) {
                Ok(card) => card,
                Err(e) => {
                    if let Some(missing) = e.downcast_ref::<MissingValueError>() {
                        eprintln!("Scoring error: {}", missing);
                    } else {
                        eprintln!("Scoring error: {:#}", e);
                    }
                    std::process::exit(EXIT_SCORE);
                }
            };

            let output = match format {
                OutputFormat::Table => decision_matrix::output::format_report(
                    &matrix,
                    &card,
                    decision_matrix::output::ReportOptions {
                        use_colors: decision_matrix::output::should_use_colors(),
                        show_reasoning: reasoning,
                    },
                ),
                OutputFormat::Tsv => decision_matrix::output::format_tsv(&matrix.rows, &card),
                OutputFormat::Json => match decision_matrix::output::format_json(&matrix, &card) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Failed to serialize report: {:#}", e);
                        std::process::exit(EXIT_SCORE);
                    }
                },
            };
            println!("{}", output);

            if cli.verbose {
                eprintln!();
                eprintln!("Scored {} categories in {:?}", matrix.rows.len(), start_time.elapsed());
            }
        }
        Commands::Tui { .. } => {
            let theme = decision_matrix::tui::resolve_theme(config.theme());
            if cli.verbose {
                eprintln!("Using {:?} theme", theme);
            }

            let app = decision_matrix::tui::App::new(
                matrix,
                weights,
                policy,
                decision_matrix::tui::ThemeColors::for_theme(theme),
                cli.verbose,
            );

            if let Err(e) = decision_matrix::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_TERMINAL);
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
