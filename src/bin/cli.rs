use clap::{ArgGroup, Parser, Subcommand, Args, ValueEnum};
use docdir::constants::{specialty_label, SPECIALTIES};
use docdir::prelude::*;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "docdir")]
#[command(about = "Provider directory CLI - search, filter, sort and export healthcare providers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "DOCDIR_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the directory and show the view for a query
    List(ListArgs),
    /// Show autocomplete suggestions for a search term
    Suggest(SuggestArgs),
    /// Apply one selection change to a query string and print the result
    Toggle(ToggleArgs),
    /// List the specialties offered as filters
    Specialties,
    /// Show summary statistics for the directory
    Stats(SourceArgs),
    /// Export the view for a query to JSON, JSON Lines or CSV
    Export(ExportArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Read the payload from a local JSON file instead of the network
    #[arg(short, long, conflicts_with = "url")]
    input: Option<PathBuf>,
    /// Override the payload URL
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Starting query string, e.g. "specialty=Dentist&sort=fees"
    #[arg(short, long, default_value = "")]
    query: String,
    /// Search term matched against provider names
    #[arg(long)]
    search: Option<String>,
    /// Consultation mode: video, clinic or all
    #[arg(long)]
    consultation: Option<ConsultationChoice>,
    /// Specialty to include (repeatable)
    #[arg(long)]
    specialty: Vec<String>,
    /// Sort order: fees or experience
    #[arg(long)]
    sort: Option<SortKey>,
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Output format (defaults to the configured format)
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Limit number of results shown
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct SuggestArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Partial search term
    term: String,
    /// Maximum number of suggestions
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("change").required(true).multiple(false)))]
struct ToggleArgs {
    /// Current query string
    #[arg(short, long, default_value = "")]
    query: String,
    /// Toggle a consultation mode (video, clinic) or clear it (all)
    #[arg(long, group = "change")]
    consultation: Option<ConsultationChoice>,
    /// Toggle a specialty
    #[arg(long, group = "change")]
    specialty: Option<String>,
    /// Toggle a sort order
    #[arg(long, group = "change")]
    sort: Option<SortKey>,
    /// Set the search term (empty removes it)
    #[arg(long, group = "change")]
    search: Option<String>,
    /// Clear every selection
    #[arg(long, group = "change")]
    clear: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormatOpt::Json)]
    format: ExportFormatOpt,
    /// Write JSON on a single line
    #[arg(long)]
    compact: bool,
    /// CSV field delimiter (a single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Omit the CSV header row
    #[arg(long)]
    no_headers: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ExportFormatOpt {
    Json,
    Jsonl,
    Csv,
}

fn main() {
    let cli = Cli::parse();
    docdir::logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<DirectoryError>() {
            Some(directory_error) => eprintln!("Error: {}", directory_error.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => DirectoryConfig::from_file(path)?,
        None => DirectoryConfig::load(),
    };

    match cli.command {
        Commands::List(args) => cmd_list(args, config),
        Commands::Suggest(args) => cmd_suggest(args, config),
        Commands::Toggle(args) => {
            cmd_toggle(args);
            Ok(())
        }
        Commands::Specialties => {
            for specialty in SPECIALTIES {
                println!("{}\t{}", specialty, specialty_label(specialty));
            }
            Ok(())
        }
        Commands::Stats(args) => {
            let directory = require_directory(load(&args, &config))?;
            directory.statistics().print_summary();
            Ok(())
        }
        Commands::Export(args) => cmd_export(args, config),
    }
}

/// Run the one-shot load for the selected source
fn load(source: &SourceArgs, config: &DirectoryConfig) -> LoadState {
    if let Some(path) = &source.input {
        return LoadState::from_result(load_from_file(path));
    }

    let mut config = config.clone();
    if let Some(url) = &source.url {
        config.endpoint_url = url.clone();
    }
    fetch_remote(&config)
}

#[cfg(feature = "fetch")]
fn fetch_remote(config: &DirectoryConfig) -> LoadState {
    use tokio::runtime::Runtime;

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return LoadState::Failed(format!("Failed to create tokio runtime: {}", e)),
    };
    let result = DirectoryClient::new(config);
    match result {
        Ok(client) => LoadState::from_result(rt.block_on(client.load())),
        Err(e) => LoadState::from_result(Err(e)),
    }
}

#[cfg(not(feature = "fetch"))]
fn fetch_remote(_config: &DirectoryConfig) -> LoadState {
    LoadState::from_result(Err(DirectoryError::feature_required("fetch")))
}

fn require_directory(state: LoadState) -> anyhow::Result<Directory> {
    match state {
        LoadState::Ready(directory) => Ok(directory),
        LoadState::Failed(message) => Err(anyhow::anyhow!("Error loading doctors: {}", message)),
        LoadState::Loading => Err(anyhow::anyhow!("directory load did not finish")),
    }
}

/// Fold the individual flags into the starting query
///
/// Flags select rather than toggle: a value already selected stays selected.
fn query_from_args(args: &ViewArgs) -> QueryState {
    let mut query = QueryState::from_query_string(&args.query);
    if let Some(search) = &args.search {
        query = query.set_search(search);
    }
    if let Some(choice) = args.consultation {
        let already_selected = matches!(choice, ConsultationChoice::Mode(mode) if query.consultation == Some(mode));
        if !already_selected {
            query = query.toggle_consultation(choice);
        }
    }
    for specialty in &args.specialty {
        if !query.has_specialty(specialty) {
            query = query.toggle_specialty(specialty);
        }
    }
    if let Some(key) = args.sort {
        if query.sort != Some(key) {
            query = query.toggle_sort(key);
        }
    }
    query
}

fn cmd_list(args: ListArgs, config: DirectoryConfig) -> anyhow::Result<()> {
    let query = query_from_args(&args.view);
    let state = load(&args.view.source, &config);
    let format = args.format.unwrap_or(config.output_format);
    info!(query = %query, "rendering view");

    match state.view(&query) {
        ViewState::Loading => println!("Loading doctors..."),
        ViewState::Error(message) => {
            eprintln!("Error loading doctors");
            eprintln!("{}", message);
            std::process::exit(1);
        }
        ViewState::NoResults => match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Text => println!("No doctors found matching your criteria"),
        },
        ViewState::Providers(providers) => {
            let shown = &providers[..args.limit.unwrap_or(providers.len()).min(providers.len())];
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
                OutputFormat::Text => {
                    for provider in shown {
                        println!("{}", provider);
                    }
                    println!("Total matches: {}", providers.len());
                }
            }
        }
    }

    if format == OutputFormat::Text {
        println!("Query: ?{}", query);
    }
    Ok(())
}

fn cmd_suggest(args: SuggestArgs, config: DirectoryConfig) -> anyhow::Result<()> {
    let directory = require_directory(load(&args.source, &config))?;
    let limit = args.limit.unwrap_or(config.suggestion_limit);
    for provider in directory.suggest(&args.term, limit) {
        println!("{}\t{}", provider.name, provider.specialities_label());
    }
    Ok(())
}

fn cmd_toggle(args: ToggleArgs) {
    let query = QueryState::from_query_string(&args.query);
    let next = if args.clear {
        QueryState::clear_all()
    } else if let Some(choice) = args.consultation {
        query.toggle_consultation(choice)
    } else if let Some(specialty) = args.specialty.as_deref() {
        query.toggle_specialty(specialty)
    } else if let Some(key) = args.sort {
        query.toggle_sort(key)
    } else if let Some(search) = args.search.as_deref() {
        query.set_search(search)
    } else {
        query
    };
    println!("{}", next);
}

fn cmd_export(args: ExportArgs, config: DirectoryConfig) -> anyhow::Result<()> {
    let query = query_from_args(&args.view);
    let directory = require_directory(load(&args.view.source, &config))?;
    let view = directory.view(&query);

    let exporter: Box<dyn ViewExporter> = match args.format {
        ExportFormatOpt::Json => Box::new(JsonExporter::new().with_pretty_print(!args.compact)),
        ExportFormatOpt::Jsonl => Box::new(JsonExporter::new().as_json_lines()),
        ExportFormatOpt::Csv => {
            if !args.delimiter.is_ascii() {
                return Err(DirectoryError::Export {
                    message: format!("delimiter '{}' is not a single-byte character", args.delimiter),
                    format: ExportFormat::Csv,
                    suggestion: Some("Use an ASCII delimiter such as ',', ';' or '\\t'".to_string()),
                }.into());
            }
            Box::new(
                CsvExporter::new()
                    .with_delimiter(args.delimiter as u8)
                    .with_headers(!args.no_headers),
            )
        }
    };
    exporter.export(&view, &args.output)?;
    println!("Exported {} providers to {}", view.len(), args.output.display());
    Ok(())
}
