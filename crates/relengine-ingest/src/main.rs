//! relengine-ingest - Relation Engine data import tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use relengine_common::keys::timestamp_millis;
use relengine_common::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use relengine_ingest::bulk_import::{bulk_import, BulkImportRequest, DryRunLoader};
use relengine_ingest::data_sources::import_data_sources;
use relengine_ingest::store::{load_and_save, DryRunStore, OnDuplicate};
use relengine_ingest::{IngestConfig, NetworkParser, SchemaType, SchemaValidator, SpecLoader};
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "relengine-ingest")]
#[command(author, version, about = "Relation Engine data import tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormatArg {
    #[value(alias = "pretty")]
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OnDuplicateArg {
    Update,
    Replace,
    Ignore,
    Error,
}

impl From<OnDuplicateArg> for OnDuplicate {
    fn from(arg: OnDuplicateArg) -> Self {
        match arg {
            OnDuplicateArg::Update => OnDuplicate::Update,
            OnDuplicateArg::Replace => OnDuplicate::Replace,
            OnDuplicateArg::Ignore => OnDuplicate::Ignore,
            OnDuplicateArg::Error => OnDuplicate::Error,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a network data directory, then dry-run the save
    Network {
        /// Root data directory (overrides RES_ROOT_DATA_PATH)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Print the node key delta report as JSON
    Delta {
        /// Root data directory (overrides RES_ROOT_DATA_PATH)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Validate and import data_sources.json
    DataSources {
        /// Data directory (overrides RES_ROOT_DATA_PATH)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// JSON Schema for a single data source (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Validate only, save nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate and stage newline-delimited JSON for a bulk import
    ///
    /// The collection's schema is looked up in the spec repository unless
    /// --schema names a file directly.
    BulkStage {
        /// Schema file to use instead of the collection's own
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// JSON pointer to the schema inside --schema, e.g. /schema
        #[arg(long, requires = "schema")]
        schema_pointer: Option<String>,

        /// Spec repository root (overrides RES_SPEC_PATH)
        #[arg(long, conflicts_with = "schema")]
        spec_root: Option<PathBuf>,

        /// Newline-delimited JSON input
        #[arg(short, long)]
        input: PathBuf,

        /// Target collection
        #[arg(short, long)]
        collection: String,

        /// Behaviour on key collision
        #[arg(long, value_enum, default_value_t = OnDuplicateArg::Update)]
        on_duplicate: OnDuplicateArg,
    },

    /// List schema names of one type in the spec repository
    Schemas {
        /// Schema type, singular or plural (collection, stored_queries, ...)
        #[arg(value_parser = parse_schema_type)]
        schema_type: SchemaType,

        /// Spec repository root (overrides RES_SPEC_PATH)
        #[arg(long)]
        spec_root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .format(cli.log_format.into())
        .log_file_prefix("relengine-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let config = IngestConfig::from_env();

    match cli.command {
        Command::Network { root } => {
            let parser = configure_parser(config, root)?;
            let mut store = DryRunStore::new();
            let summary = load_and_save(&parser, &mut store)?;
            let report = parser.check_data_delta()?;
            info!(
                nodes = summary.nodes.created,
                edges = summary.edges.created,
                consistent = report.is_consistent(),
                "Network validated"
            );
        },
        Command::Delta { root } => {
            let parser = configure_parser(config, root)?;
            let report = parser.check_data_delta()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        Command::DataSources {
            root,
            schema,
            dry_run,
        } => {
            let config = match root {
                Some(root) => config.with_root_data_path(root),
                None => config,
            };
            let validator = SchemaValidator::from_file(&schema)?;
            let mut store = DryRunStore::new();
            let report =
                import_data_sources(config.root_data_path()?, &validator, &mut store, dry_run)?;

            if !report.is_success() {
                for problem in &report.errors {
                    error!("{}", problem);
                }
                bail!("{} data source validation error(s)", report.errors.len());
            }
            info!(documents = report.documents, dry_run, "Data sources import finished");
        },
        Command::BulkStage {
            schema,
            schema_pointer,
            spec_root,
            input,
            collection,
            on_duplicate,
        } => {
            let validator = match schema {
                Some(schema) => SchemaValidator::from_file_at(&schema, schema_pointer.as_deref())?,
                None => spec_loader(config, spec_root)?.collection_validator(&collection)?,
            };
            let file = std::fs::File::open(&input)
                .with_context(|| format!("cannot open {}", input.display()))?;

            let request = BulkImportRequest::new(collection).with_on_duplicate(on_duplicate.into());
            let mut loader = DryRunLoader::new();
            let outcome = bulk_import(
                BufReader::new(file),
                &validator,
                &mut loader,
                &request,
                timestamp_millis(),
            )?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        },
        Command::Schemas {
            schema_type,
            spec_root,
        } => {
            for name in spec_loader(config, spec_root)?.names(schema_type)? {
                println!("{}", name);
            }
        },
    }

    Ok(())
}

fn configure_parser(config: IngestConfig, root: Option<PathBuf>) -> Result<NetworkParser> {
    let config = match root {
        Some(root) => config.with_root_data_path(root),
        None => config,
    };
    Ok(NetworkParser::from_config(&config)?)
}

fn spec_loader(config: IngestConfig, spec_root: Option<PathBuf>) -> Result<SpecLoader> {
    let config = match spec_root {
        Some(root) => config.with_spec_path(root),
        None => config,
    };
    Ok(SpecLoader::from_config(&config)?)
}

fn parse_schema_type(value: &str) -> std::result::Result<SchemaType, String> {
    value.parse().map_err(|e: relengine_ingest::IngestError| e.to_string())
}
