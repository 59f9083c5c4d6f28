use clap::{Args as RequestOptions, Parser, Subcommand};
use reqwest::Method;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::IntoEnumIterator;
use wander_client::cli_messages::print_body;
use wander_client::config::{Config, Service, ServiceRegistry, get_config_path};
use wander_client::consts::client_consts::{AUTH_TOKEN_COOKIE, retry};
use wander_client::network::{ApiClient, CookieJar, RequestConfig, RequestHeaderCredentialSource};
use wander_client::reporting::{ErrorReporter, get_http_error_message, get_http_status_message};
use wander_client::{Environment, logging, print_cmd_error, print_cmd_info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line client for the wanderlist and packages APIs
struct Args {
    /// JSON file with service URL overrides (defaults to ~/.wander/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log requests and errors at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a resource
    Get(RequestArgs),
    /// Create a resource
    Post(RequestArgs),
    /// Replace a resource
    Put(RequestArgs),
    /// Partially update a resource
    Patch(RequestArgs),
    /// Delete a resource
    Delete(RequestArgs),
    /// Show the resolved base URL of every service
    Services,
    /// Explain an HTTP status code
    Status {
        /// HTTP status code
        code: u16,
    },
}

#[derive(RequestOptions)]
struct RequestArgs {
    /// Target service: wanderlist or packages
    service: Service,

    /// Path appended verbatim to the service base URL
    path: String,

    /// Query parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Extra request header (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// JSON request body. Never sent with `get`.
    #[arg(long, value_parser = parse_json)]
    body: Option<serde_json::Value>,

    /// Bearer token to send instead of the authToken cookie
    #[arg(long)]
    token: Option<String>,

    /// Cookie header of an inbound request to act on behalf of
    #[arg(long, value_name = "COOKIE_HEADER")]
    cookie: Option<String>,

    /// Retry transient failures this many times with exponential backoff
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected NAME:VALUE, got `{}`", raw))
}

fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON body: {}", e))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let environment = Environment::from_env();
    let file_config = load_file_config(args.config.as_deref())?;
    let registry = ServiceRegistry::from_env(environment, file_config.as_ref())?;

    match args.command {
        Command::Get(request) => send(Method::GET, request, registry, environment).await,
        Command::Post(request) => send(Method::POST, request, registry, environment).await,
        Command::Put(request) => send(Method::PUT, request, registry, environment).await,
        Command::Patch(request) => send(Method::PATCH, request, registry, environment).await,
        Command::Delete(request) => send(Method::DELETE, request, registry, environment).await,
        Command::Services => {
            println!("environment\t{}", environment);
            for service in Service::iter() {
                println!("{}\t{}", service, registry.get(service).base_url);
            }
            println!("app\t{}", registry.public_app_url());
            Ok(())
        }
        Command::Status { code } => {
            println!(
                "{} {}: {}",
                code,
                get_http_status_message(code),
                get_http_error_message(code)
            );
            Ok(())
        }
    }
}

/// An explicit `--config` must load; the default path is optional.
fn load_file_config(path: Option<&Path>) -> Result<Option<Config>, Box<dyn Error>> {
    if let Some(path) = path {
        let config = Config::load_from_file(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?;
        return Ok(Some(config));
    }
    match get_config_path() {
        Ok(default) if default.exists() => Ok(Some(Config::load_from_file(&default)?)),
        _ => Ok(None),
    }
}

async fn send(
    method: Method,
    args: RequestArgs,
    registry: ServiceRegistry,
    environment: Environment,
) -> Result<(), Box<dyn Error>> {
    let jar = Arc::new(CookieJar::new());
    if let Ok(token) = std::env::var("WANDER_AUTH_TOKEN") {
        jar.set(AUTH_TOKEN_COOKIE, token);
    }

    let client = ApiClient::with_cookie_jar(registry, jar, ErrorReporter::new(environment))?
        .with_auth_events(Arc::new(|| {
            print_cmd_info!("Session expired.", "Stored auth token cleared, log in again.")
        }));

    let mut config = RequestConfig::new();
    for (key, value) in args.params {
        config = config.param(key, value);
    }
    for (name, value) in args.headers {
        config = config.header(name, value);
    }
    if let Some(body) = args.body {
        config = config.body(body);
    }
    if let Some(token) = args.token {
        config = config.token(token);
    }
    if let Some(cookie) = args.cookie {
        config = config.credentials(Arc::new(RequestHeaderCredentialSource::new(Some(cookie))));
    }

    let result = if args.retries > 0 {
        let context = format!("{} {} {}", args.service, method, args.path);
        client
            .reporter()
            .retry_with_backoff_if(
                || client.request(method.clone(), args.service, &args.path, config.clone()),
                |e| client.error_handler().should_retry(e),
                args.retries,
                retry::initial_delay(),
                &context,
            )
            .await
    } else {
        client.request(method, args.service, &args.path, config).await
    };

    match result {
        Ok(body) => {
            print_body(&body);
            Ok(())
        }
        Err(e) => {
            match e.as_api() {
                Some(api) => print_cmd_error!(
                    &format!("{} {}", api.status, api.status_label()),
                    &format!("{} ({})", api.message, api.user_message())
                ),
                None => print_cmd_error!("Request failed", &e.to_string()),
            }
            Err(e.into())
        }
    }
}
