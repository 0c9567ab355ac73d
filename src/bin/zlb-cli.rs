use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use zlb_sdk::{CookieFilter, DomainConfig, HealthCheck, ZlbClient};

#[derive(Parser)]
#[command(name = "zlb-cli")]
#[command(about = "Operator CLI for the zlb configuration API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "ZLB_URL", default_value = "http://localhost:6300")]
    url: String,

    #[arg(short, long, env = "ZLB_API_KEY", hide_env_values = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show API version and store backend
    Status,
    /// List configured domains
    List,
    /// Show a domain's configuration tree
    Inspect { name: String },
    /// Create a domain path configuration
    Create(DomainArgs),
    /// Update a domain path configuration
    Update(DomainArgs),
    /// Remove a domain and everything stored for it
    Remove { name: String },
    /// Set a cookie filter lifetime
    SetCookieFilter(CookieArgs),
    /// Remove a cookie filter
    RemoveCookieFilter(CookieArgs),
    /// List a domain's cookie filters
    CookieFilters { name: String },
    /// Manage a domain's health check
    #[command(subcommand)]
    Healthcheck(HealthcheckCommands),
}

#[derive(Subcommand)]
enum HealthcheckCommands {
    Inspect { name: String },
    Update {
        name: String,
        #[command(flatten)]
        check: HealthCheckArgs,
    },
    Delete { name: String },
}

#[derive(Args)]
struct DomainArgs {
    name: String,

    /// Path override; "/" when omitted
    #[arg(long, default_value = "")]
    path: String,

    #[arg(long)]
    sticky: bool,

    #[arg(long, default_value_t = 0)]
    keep_alive: i64,

    #[command(flatten)]
    check: HealthCheckArgs,
}

#[derive(Args)]
struct HealthCheckArgs {
    /// Probe protocol (http, tcp, ...)
    #[arg(long = "hc-type", default_value = "")]
    kind: String,
    #[arg(long = "hc-uri", default_value = "")]
    uri: String,
    #[arg(long = "hc-valid-statuses", default_value = "")]
    valid_statuses: String,
    #[arg(long = "hc-interval", default_value_t = 0)]
    interval: i64,
    #[arg(long = "hc-timeout", default_value_t = 0)]
    timeout: i64,
    #[arg(long = "hc-fall", default_value_t = 0)]
    fall: i64,
    #[arg(long = "hc-rise", default_value_t = 0)]
    rise: i64,
    #[arg(long = "hc-concurrency", default_value_t = 0)]
    concurrency: i64,
}

impl From<HealthCheckArgs> for HealthCheck {
    fn from(a: HealthCheckArgs) -> Self {
        Self {
            kind: a.kind,
            uri: a.uri,
            valid_statuses: a.valid_statuses,
            interval: a.interval,
            timeout: a.timeout,
            fall: a.fall,
            rise: a.rise,
            concurrency: a.concurrency,
        }
    }
}

impl DomainArgs {
    fn split(self) -> (String, DomainConfig) {
        let config = DomainConfig {
            healthcheck: self.check.into(),
            sticky: self.sticky,
            keep_alive: self.keep_alive,
            path: self.path,
        };
        (self.name, config)
    }
}

#[derive(Args)]
struct CookieArgs {
    name: String,
    #[arg(long)]
    cookie_name: String,
    #[arg(long)]
    cookie_value: String,
    /// Stickiness lifetime in seconds
    #[arg(long, default_value_t = 0)]
    lifecycle: i64,
}

impl CookieArgs {
    fn split(self) -> (String, CookieFilter) {
        let filter = CookieFilter {
            name: self.cookie_name,
            value: self.cookie_value,
            lifecycle: self.lifecycle,
        };
        (self.name, filter)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut client = ZlbClient::new(&cli.url);
    if let Some(key) = cli.key {
        client = client.with_api_key(key);
    }

    match cli.command {
        Commands::Status => print(&client.status().await?)?,
        Commands::List => print(&client.list_domains().await?)?,
        Commands::Inspect { name } => print(&client.inspect_domain(&name).await?)?,
        Commands::Create(args) => {
            let (name, config) = args.split();
            client.create_domain(&name, &config).await?;
            println!("ok");
        }
        Commands::Update(args) => {
            let (name, config) = args.split();
            client.update_domain(&name, &config).await?;
            println!("ok");
        }
        Commands::Remove { name } => {
            client.remove_domain(&name).await?;
            println!("ok");
        }
        Commands::SetCookieFilter(args) => {
            let (name, filter) = args.split();
            client.set_cookie_filter(&name, &filter).await?;
            println!("ok");
        }
        Commands::RemoveCookieFilter(args) => {
            let (name, filter) = args.split();
            client.remove_cookie_filter(&name, &filter).await?;
            println!("ok");
        }
        Commands::CookieFilters { name } => print(&client.cookie_filters(&name).await?)?,
        Commands::Healthcheck(cmd) => match cmd {
            HealthcheckCommands::Inspect { name } => print(&client.health_check(&name).await?)?,
            HealthcheckCommands::Update { name, check } => {
                client.update_health_check(&name, &check.into()).await?;
                println!("ok");
            }
            HealthcheckCommands::Delete { name } => {
                client.delete_health_check(&name).await?;
                println!("ok");
            }
        },
    }

    Ok(())
}

fn print<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
