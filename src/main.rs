//! `oc-ops`: Open Collective automation helpers (staging-first).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use opencollective_ops::batch::{load_records, run_collectives, run_hosts, run_projects};
use opencollective_ops::ops::queries::WHOAMI_QUERY;
use opencollective_ops::auth::SECRET_REF_ENV_VAR;
use opencollective_ops::{
    resolve_endpoint, resolve_token, AuthMode, OcClient, OcConfig, Session, UpsertResult,
};

#[derive(Debug, Parser)]
#[command(name = "oc-ops", version, about = "Open Collective automation helpers (staging-first).")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch account/collective metadata by slug.
    Whoami {
        #[command(flatten)]
        common: CommonOpts,
        /// Account slug to query.
        slug: String,
    },
    /// Create/update host organizations from YAML/JSON.
    Hosts {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        batch: BatchOpts,
    },
    /// Create/update collectives and optionally apply to a host.
    Collectives {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        batch: BatchOpts,
    },
    /// Create/update projects under a parent collective from YAML/JSON.
    Projects {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        batch: BatchOpts,
    },
    /// Print the package version.
    Version,
}

#[derive(Args, Debug)]
struct CommonOpts {
    /// Use the production API (staging is the default).
    #[arg(long)]
    prod: bool,

    /// Override the GraphQL endpoint.
    #[arg(long, env = "OC_API_URL")]
    api_url: Option<String>,

    /// Override the token (defaults to OC_TOKEN / OC_SECRET_REF).
    #[arg(long)]
    token: Option<String>,

    /// Personal-Token vs OAuth bearer.
    #[arg(long, default_value = "personal")]
    auth_mode: String,

    /// Print request summaries (also via OC_DEBUG=1).
    #[arg(long)]
    log_requests: bool,
}

#[derive(Args, Debug)]
struct BatchOpts {
    /// Path to the records YAML/JSON file (top-level array).
    #[arg(long, visible_alias = "config")]
    file: PathBuf,

    /// Only process the matching slug.
    #[arg(long)]
    only: Option<String>,
}

fn init_tracing(log_requests: bool) {
    let filter = if log_requests {
        EnvFilter::new("opencollective_ops=debug,oc_ops=debug,info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(common: &CommonOpts) -> Result<OcClient, Box<dyn std::error::Error>> {
    let auth_mode: AuthMode = common.auth_mode.parse()?;
    let token = resolve_token(common.token.as_deref())?;
    let secret_ref = std::env::var(SECRET_REF_ENV_VAR).ok();
    let endpoint = resolve_endpoint(common.api_url.as_deref(), common.prod, secret_ref.as_deref());
    tracing::debug!(url = %endpoint.url, "resolved endpoint");

    let session = Session::new(endpoint, token, auth_mode)?;
    let mut builder = OcConfig::builder();
    if common.log_requests {
        builder = builder.debug(true);
    }
    Ok(OcClient::new(session, builder.build()))
}

fn print_results(label: &str, results: &[UpsertResult]) {
    for result in results {
        let summary = json!({
            "slug": result.slug,
            "created": result.created,
            "updated": result.updated,
            "applied_to_host": result.applied_to_host,
            "warnings": result.warnings,
        });
        println!("[{label}] {summary}");
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "account": result.account }))
                .unwrap_or_default()
        );
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Whoami { common, slug } => {
            let client = build_client(&common)?;
            let data = client
                .execute(WHOAMI_QUERY, Some(json!({ "slug": slug })))
                .await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Hosts { common, batch } => {
            if !batch.file.exists() {
                eprintln!("hosts file not found: {}", batch.file.display());
                return Ok(ExitCode::from(2));
            }
            let records = load_records(&batch.file)?;
            let client = build_client(&common)?;
            let results = run_hosts(&client, &records, batch.only.as_deref()).await?;
            print_results("host", &results);
            Ok(ExitCode::SUCCESS)
        }
        Command::Collectives { common, batch } => {
            if !batch.file.exists() {
                eprintln!("collectives file not found: {}", batch.file.display());
                return Ok(ExitCode::from(2));
            }
            let records = load_records(&batch.file)?;
            let client = build_client(&common)?;
            let results = run_collectives(&client, &records, batch.only.as_deref()).await?;
            print_results("collective", &results);
            Ok(ExitCode::SUCCESS)
        }
        Command::Projects { common, batch } => {
            if !batch.file.exists() {
                eprintln!("projects file not found: {}", batch.file.display());
                return Ok(ExitCode::from(2));
            }
            let records = load_records(&batch.file)?;
            let client = build_client(&common)?;
            let results = run_projects(&client, &records, batch.only.as_deref()).await?;
            print_results("project", &results);
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_batch_file_flag_parses() {
        let cli = Cli::try_parse_from(["oc-ops", "hosts", "--file", "hosts.yaml"]).unwrap();
        let Command::Hosts { batch, .. } = cli.command else {
            panic!("expected hosts subcommand");
        };
        assert_eq!(batch.file, PathBuf::from("hosts.yaml"));
    }

    #[test]
    fn test_config_is_an_alias_for_file() {
        let cli =
            Cli::try_parse_from(["oc-ops", "collectives", "--config", "collectives.yaml"])
                .unwrap();
        let Command::Collectives { batch, .. } = cli.command else {
            panic!("expected collectives subcommand");
        };
        assert_eq!(batch.file, PathBuf::from("collectives.yaml"));
    }

    #[test]
    fn test_only_filter_parses() {
        let cli = Cli::try_parse_from([
            "oc-ops", "projects", "--config", "projects.yaml", "--only", "tooling",
        ])
        .unwrap();
        let Command::Projects { batch, .. } = cli.command else {
            panic!("expected projects subcommand");
        };
        assert_eq!(batch.only.as_deref(), Some("tooling"));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_requests = match &cli.command {
        Command::Whoami { common, .. }
        | Command::Hosts { common, .. }
        | Command::Collectives { common, .. }
        | Command::Projects { common, .. } => common.log_requests,
        Command::Version => false,
    };
    init_tracing(log_requests);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("[error] {error}");
            ExitCode::FAILURE
        }
    }
}
