use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the tenant proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy system status
    Status,
    /// Show tenant cache statistics
    Cache,
    /// Drop cached tenant configuration
    Invalidate {
        /// Only drop this tenant's entry
        #[arg(short, long)]
        tenant: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Cache => {
            client
                .get(format!("{}/admin/cache", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Invalidate { tenant } => {
            let mut request = client
                .post(format!("{}/admin/cache/invalidate", cli.url))
                .headers(headers);
            if let Some(tenant) = tenant {
                request = request.query(&[("tenant", tenant)]);
            }
            request.send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
