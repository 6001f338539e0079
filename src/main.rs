use clap::{Parser, Subcommand, ValueHint};
use hanime_bridge::{CatalogConfig, DEFAULT_API_URL, DEFAULT_SITE_URL, MediaAdapter};
use log::{LevelFilter, error};
use std::process;
use std::time::Duration;

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base of the item page URLs in search results
    #[arg(long, env = "HANIME_SITE_URL", value_hint = ValueHint::Url, default_value = DEFAULT_SITE_URL)]
    site_url: String,

    /// Base of the catalog API endpoints
    #[arg(long, env = "HANIME_API_URL", value_hint = ValueHint::Url, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds
    ///
    /// [default: the HTTP client's own timeout]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Suppresses all log output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the catalog for a keyword
    Search { keyword: String },
    /// Show the details of an item
    Details {
        #[arg(value_hint = ValueHint::Url)]
        url: String,
    },
    /// List the episodes of an item
    Episodes {
        #[arg(value_hint = ValueHint::Url)]
        url: String,
    },
    /// Resolve the playable stream of an item
    Stream {
        #[arg(value_hint = ValueHint::Url)]
        url: String,
    },
}

/// Initializes the logger facade.
///
/// Command line flags take precedence over `RUST_LOG`, which takes
/// precedence over the `info` default. Logs go to stderr.
fn init_logger(args: &Args) {
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if args.quiet || args.verbose > 0 {
        let level = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module("hanime_bridge", level);
    }

    logger.init();
}

fn main() {
    let args = Args::parse();
    init_logger(&args);

    let mut config = CatalogConfig::default()
        .with_site_url(args.site_url)
        .with_api_url(args.api_url);
    if let Some(seconds) = args.timeout {
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    let adapter = match MediaAdapter::hanime(config) {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let output = match &args.command {
        Command::Search { keyword } => adapter.search_results(keyword),
        Command::Details { url } => adapter.extract_details(url),
        Command::Episodes { url } => adapter.extract_episodes(url),
        Command::Stream { url } => adapter.extract_stream_url(url),
    };

    println!("{output}");
}
