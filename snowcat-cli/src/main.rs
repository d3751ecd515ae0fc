//! Command-line host for snowcat adapters.
//!
//! Drives any registered adapter the way an interactive SQL client would:
//! connect, run a statement, browse the catalog, or list completions. All
//! command output is JSON on stdout; logs go to stderr.
//!
//! # Security Guarantees
//! - Passwords are never logged or echoed
//! - `--ask-password` reads from the terminal without echo

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use snowcat_core::{
    AdapterOptions, ColumnDescriptor, ColumnarBatch, Connection, PluginRegistry, init_logging,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "snowcat")]
#[command(about = "Run SQL and browse catalogs through snowcat adapters")]
#[command(version)]
#[command(disable_help_flag = true)]
#[command(long_about = "
snowcat - drive warehouse adapters from the command line

Connects through a registered adapter plugin and prints JSON:
- test:        open and close a connection
- execute:     run one statement and print its result
- catalog:     print the catalog, expanded to a chosen depth
- completions: print the adapter's keyword and function completions
- list:        print registered adapters and their options

-h is the hostname option; help is only available as --help.

EXAMPLES:
  snowcat --conn ./shop.db execute 'select * from orders' --limit 10
  snowcat --conn ./shop.db --conn ./archive.db catalog --depth 2
  snowcat list
")]
struct Cli {
    /// Print help
    #[arg(long, action = clap::ArgAction::Help, help = "Print help")]
    help: Option<bool>,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test the connection
    Test,
    /// Execute one statement
    Execute(ExecuteArgs),
    /// Print the catalog
    Catalog(CatalogArgs),
    /// Print editor completions
    Completions,
    /// List registered adapters
    List,
}

#[derive(Args)]
struct ExecuteArgs {
    /// Statement to execute
    #[arg(help = "SQL statement to execute")]
    sql: String,

    /// Row limit
    #[arg(long, help = "Return at most this many rows")]
    limit: Option<usize>,
}

#[derive(Args)]
struct CatalogArgs {
    /// Expansion depth below the roots
    #[arg(
        long,
        default_value = "1",
        help = "Levels to expand below the roots (0 prints roots only)"
    )]
    depth: usize,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    quiet: bool,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Adapter plugin name
    #[arg(
        long,
        env = "SNOWCAT_ADAPTER",
        default_value = "sqlite-adapter",
        help = "Adapter plugin to connect through"
    )]
    adapter: String,

    /// Connection strings
    #[arg(
        long = "conn",
        value_name = "CONN_STR",
        help = "Connection string; repeat for adapters that accept several"
    )]
    conn_str: Vec<String>,

    #[arg(short = 'u', long, help = "User name to authenticate as")]
    username: Option<String>,

    #[arg(short = 'A', long, help = "Account identifier, e.g. myorg-myaccount")]
    account: Option<String>,

    #[arg(short = 'p', long, help = "Password (prefer --ask-password or SNOWSQL_PWD)")]
    password: Option<String>,

    #[arg(short = 'h', long, help = "Host name override")]
    hostname: Option<String>,

    #[arg(short = 'r', long, help = "Role to assume")]
    role: Option<String>,

    #[arg(short = 'w', long, help = "Virtual warehouse")]
    warehouse: Option<String>,

    #[arg(short = 'd', long, help = "Default database")]
    database: Option<String>,

    #[arg(short = 's', long, help = "Default schema")]
    schema: Option<String>,

    /// Prompt for the password
    #[arg(long, help = "Prompt for the password without echo")]
    ask_password: bool,
}

impl ConnectionArgs {
    /// Builds the adapter option bag, prompting for a password if asked.
    fn to_options(&self) -> Result<AdapterOptions> {
        let pairs = [
            ("username", &self.username),
            ("account", &self.account),
            ("hostname", &self.hostname),
            ("role", &self.role),
            ("warehouse", &self.warehouse),
            ("database", &self.database),
            ("schema", &self.schema),
        ];
        let options = AdapterOptions::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name, v))),
        );

        let password = if self.ask_password {
            Some(read_password()?)
        } else {
            self.password.clone()
        };

        Ok(match password {
            Some(password) => options.with_password(password),
            None => options,
        })
    }
}

fn read_password() -> Result<String> {
    let password =
        rpassword::prompt_password("Password: ").context("Failed to read password")?;
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}

#[derive(Serialize)]
struct ExecuteOutput {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<JsonValue>>,
}

fn rows_of(batch: &ColumnarBatch) -> Vec<Vec<JsonValue>> {
    (0..batch.num_rows())
        .filter_map(|i| batch.row(i))
        .map(|row| row.into_iter().cloned().collect())
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let registry = PluginRegistry::with_builtin()?;

    if let Command::List = cli.command {
        return list_adapters(&registry);
    }

    let options = cli.connection.to_options()?;
    let adapter = registry.create(&cli.connection.adapter, cli.connection.conn_str.clone(), options)?;

    info!("Connecting through {}", cli.connection.adapter);
    let connection = adapter.connect().await.map_err(|e| {
        error!("{}", e.title());
        e
    })?;

    let outcome = run(&cli.command, connection.as_ref()).await;
    connection.close().await;
    outcome
}

async fn run(command: &Command, connection: &dyn Connection) -> Result<()> {
    match command {
        Command::Test => print_json(&json!({ "connected": true })),
        Command::Execute(args) => execute(connection, args).await,
        Command::Catalog(args) => {
            let catalog = connection.catalog().await?;
            let roots = catalog.snapshot(args.depth).await;
            print_json(&json!({
                "loaded_at": catalog.loaded_at(),
                "roots": roots,
            }))
        }
        Command::Completions => print_json(&connection.completions().await?),
        Command::List => Ok(()),
    }
}

async fn execute(connection: &dyn Connection, args: &ExecuteArgs) -> Result<()> {
    let Some(mut cursor) = connection.execute(&args.sql).await? else {
        info!("Statement returned no result set");
        return print_json(&JsonValue::Null);
    };

    if let Some(limit) = args.limit {
        cursor.set_limit(limit);
    }
    let columns = cursor.columns();
    let batch = cursor.fetch_all().await?;

    info!("Fetched {} rows", batch.num_rows());
    print_json(&ExecuteOutput {
        columns,
        rows: rows_of(&batch),
    })
}

fn list_adapters(registry: &PluginRegistry) -> Result<()> {
    let adapters: Vec<JsonValue> = registry
        .names()
        .into_iter()
        .map(|name| {
            let options: Vec<JsonValue> = registry
                .options_for(name)
                .unwrap_or_default()
                .iter()
                .map(|o| {
                    json!({
                        "name": o.name,
                        "short": o.short.map(String::from),
                        "description": o.description,
                    })
                })
                .collect();
            json!({ "name": name, "options": options })
        })
        .collect();

    print_json(&adapters)
}
