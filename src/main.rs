use std::io::Read;
use std::path::{Path, PathBuf};

use sonar_query::cli::{Cli, Commands, ConfigAction, FetchEndpoint};
use sonar_query::client::{HttpTransport, SampleApi};
use sonar_query::config::Config;
use sonar_query::error::{Result, SonarError};
use sonar_query::filters::{compile, normalize_date_range, parse_date, FilterGroup};
use sonar_query::query::{parse_query_string, FilterGroupRoot, Pagination};
use sonar_query::reshape::{coverage_series, generate_weeks_between};
use sonar_query::session::QuerySession;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::InitFilter { property } => {
            let config = load_config(cli.config, cli.profile)?;
            let property = property.unwrap_or(config.query.default_property);
            print_json(&FilterGroup::initial(&property))?;
        }
        Commands::Compile { file, normalize } => {
            let mut group = read_filter_group(&file)?;
            if normalize {
                group.normalize_date_ranges();
            }
            print_json(&compile(&group))?;
        }
        Commands::QueryString {
            file,
            limit,
            offset,
            reference,
            reference_mode,
            data_sets,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let group = read_filter_group(&file)?;

            let data_sets = if data_sets.is_empty() {
                config.scope.data_sets.clone()
            } else {
                data_sets
            };
            let mode = reference_mode
                .map(Into::into)
                .unwrap_or(config.scope.reference_mode);

            let mut root = FilterGroupRoot::from_group(&group).with_dataset_scope(&data_sets);
            if let Some(accession) = reference.or(config.scope.reference_accession) {
                root = root.with_reference_scope(&accession, mode);
            }
            if limit.is_some() || offset.is_some() {
                let defaults = config.query.pagination();
                root = root.with_page(Pagination::new(
                    limit.unwrap_or(defaults.limit),
                    offset.unwrap_or(0),
                ));
            }
            println!("{}", root.to_query_string());
        }
        Commands::Decode { query } => {
            print_json(&parse_query_string(&query)?)?;
        }
        Commands::Dates { dates } => {
            let parsed = dates
                .iter()
                .map(|d| parse_date(d))
                .collect::<Result<Vec<_>>>()?;
            match normalize_date_range(&parsed) {
                Some([start, end]) => println!("{},{}", start, end),
                None => println!(),
            }
        }
        Commands::Weeks { start, end } => {
            for week in generate_weeks_between(&start, &end)? {
                println!("{}", week);
            }
        }
        Commands::Fetch {
            endpoint,
            file,
            property,
            page,
            columns,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let runtime = tokio::runtime::Runtime::new().map_err(|e| SonarError::Io {
                source: e,
                context: "Failed to start async runtime".to_string(),
            })?;
            runtime.block_on(cmd_fetch(&config, endpoint, file, property, page, columns))?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "sonar_query=debug" } else { "sonar_query=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_fetch(
    config: &Config,
    endpoint: FetchEndpoint,
    file: Option<PathBuf>,
    property: Option<String>,
    page: u64,
    columns: Vec<String>,
) -> Result<()> {
    let token = config.client.token();
    if token.is_none() {
        tracing::warn!(
            "No API token found in ${}; requests may be rejected",
            config.client.token_env
        );
    }
    let transport = HttpTransport::new(&config.client, token.as_deref())?;
    let api = SampleApi::new(transport);

    let mut session = QuerySession::new(config);
    if let Some(path) = &file {
        session.filter_group = read_filter_group(path)?;
    }
    let limit = session.pagination.limit;
    session.set_page(Pagination::at_page(limit, page));
    let root = session.filters();

    let require_property = || {
        property.clone().ok_or_else(|| {
            SonarError::Config("--property is required for this endpoint".to_string())
        })
    };

    match endpoint {
        FetchEndpoint::Samples => match session.fetch_samples(&api).await {
            Some(page) => print_json(&page)?,
            None => {
                eprintln!("{}", session.error_message.unwrap_or_default());
            }
        },
        FetchEndpoint::Statistics => print_json(&api.statistics().await?)?,
        FetchEndpoint::FilteredStatistics => print_json(&api.filtered_statistics(&root).await?)?,
        FetchEndpoint::SamplesPerWeek => print_json(&api.samples_per_week(&root).await?)?,
        FetchEndpoint::GroupedLineages => {
            print_json(&api.grouped_lineages_per_week(&root).await?)?
        }
        FetchEndpoint::Coverage => {
            let total = api.filtered_statistics(&root).await?.filtered_total_count;
            let coverage = api.metadata_coverage(&root).await?;
            print_json(&coverage_series(&coverage, total))?;
        }
        FetchEndpoint::Custom => {
            let property = require_property()?;
            print_json(&api.plot_custom(&root, &property).await?)?;
        }
        FetchEndpoint::PropertyValues => {
            let property = require_property()?;
            print_json(&api.property_values(&property).await?)?;
        }
        FetchEndpoint::Properties => print_json(&api.all_properties().await?)?,
        FetchEndpoint::Lineages => print_json(&api.lineages().await?)?,
        FetchEndpoint::Accessions => print_json(&api.replicon_accessions().await?)?,
        FetchEndpoint::GeneSymbols => print_json(&api.gene_symbols().await?)?,
        FetchEndpoint::ExportUrl => {
            println!("{}", api.export_url(&root, &columns, &session.ordering));
        }
    }
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, None)?;
            let content = toml::to_string_pretty(&config)?;
            println!("{}", content);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Backend: {}", config.client.base_address);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save(&path)?;
            println!("✓ Configuration written to {}", path.display());
        }
    }
    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'sonar-query config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(&path, &profile),
        None => Config::load(&path),
    }
}

/// Read a filter group from a JSON file, or stdin for "-"
fn read_filter_group(path: &Path) -> Result<FilterGroup> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| SonarError::Io {
                source: e,
                context: "Failed to read filter group from stdin".to_string(),
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| SonarError::Io {
            source: e,
            context: format!("Failed to read filter group file: {}", path.display()),
        })?
    };

    serde_json::from_str(&content).map_err(|e| SonarError::Json {
        source: e,
        context: "Failed to parse filter group".to_string(),
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| SonarError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })?;
    println!("{}", json);
    Ok(())
}
