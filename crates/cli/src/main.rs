mod config;
mod error;
mod logging;
mod tools;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use itinerary::ItineraryBuilder;
use mcp::{ServerConfig, ToolHandler};
use serde_json::{Value, json};
use tracing::info;

use config::Config;
use error::{Error, Result};
use tools::FlightTools;

const CONFIG_FILE: &str = "flight-search.toml";
const SERVER_NAME: &str = "FlightSearchService";
const INSTRUCTIONS: &str = "Search flights with search_flights_tool, or build a multi-city \
    itinerary with search_multi_city_flights. Airport codes are IATA codes and dates are \
    YYYY-MM-DD.";

#[derive(Parser)]
#[command(name = "flight-search")]
#[command(about = "Flight search MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./flight-search.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. info or itinerary=debug (overrides MCP_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout
    Serve,
    /// Search one-way or round-trip flights and print them as JSON
    Search {
        /// Departure airport code
        #[arg(long)]
        origin: String,
        /// Arrival airport code
        #[arg(long)]
        destination: String,
        /// Outbound date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(long)]
        return_date: Option<String>,
        /// 1=Economy, 2=Premium Economy, 3=Business, 4=First
        #[arg(long, default_value = "1")]
        class: i64,
    },
    /// Build a multi-city itinerary and print it as JSON
    MultiCity {
        /// Legs as a JSON array of {departure_id, arrival_id, date}
        #[arg(long)]
        flights: String,
        /// cheapest, fastest or balanced
        #[arg(long)]
        strategy: Option<String>,
        /// 1=Economy, 2=Premium Economy, 3=Business, 4=First
        #[arg(long, default_value = "1")]
        class: i64,
        /// 0=Any, 1=Nonstop, 2=1 stop or fewer, 3=2 stops or fewer
        #[arg(long)]
        stops: Option<i64>,
        /// Comma-separated airline codes to avoid
        #[arg(long)]
        exclude_airlines: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&logging::resolve_level(
        cli.log_level.as_deref(),
        &config.logging.level,
    ));

    let client = config.client_builder()?.build()?;
    info!(provider = %client, "flight data provider ready");
    let builder = ItineraryBuilder::new(client).with_config(config.builder_config());
    let tools = FlightTools::new(builder, config.search.default_strategy);

    match cli.command {
        Some(Commands::Serve) | None => cmd_serve(tools).await,
        Some(Commands::Search {
            origin,
            destination,
            date,
            return_date,
            class,
        }) => {
            let arguments = json!({
                "origin": origin,
                "destination": destination,
                "outbound_date": date,
                "return_date": return_date,
                "travel_class": class,
            });
            cmd_tool(&tools, tools::SEARCH_FLIGHTS, arguments).await
        }
        Some(Commands::MultiCity {
            flights,
            strategy,
            class,
            stops,
            exclude_airlines,
        }) => {
            let arguments = json!({
                "flights": flights,
                "selection_strategy": strategy,
                "travel_class": class,
                "stops": stops,
                "exclude_airlines": exclude_airlines,
            });
            cmd_tool(&tools, tools::SEARCH_MULTI_CITY, arguments).await
        }
    }
}

async fn cmd_serve<H: ToolHandler>(tools: H) -> Result<()> {
    let server = mcp::Server::new(
        ServerConfig {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: Some(INSTRUCTIONS.to_string()),
        },
        tools,
    );
    server.serve_stdio().await?;
    Ok(())
}

async fn cmd_tool<H: ToolHandler>(tools: &H, name: &str, arguments: Value) -> Result<()> {
    let result = tools.call_tool(name, arguments).await?;
    let text = mcp::result_text(&result);

    if mcp::is_error(&result) {
        return Err(Error::Tool(text));
    }
    println!("{text}");
    Ok(())
}

/// Load an explicit config file, or the default one if it exists.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if !path.exists() => Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        }),
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}
