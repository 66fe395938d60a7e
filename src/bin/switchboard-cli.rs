use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "switchboard-cli")]
#[command(about = "Management CLI for the switchboard orchestrator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status and breaker states
    Status,
    /// Log a user in through the auth downstream
    Login {
        #[arg(short, long)]
        username: String,
    },
    /// Create an order (calls auth for a token first)
    Order {
        #[arg(short, long)]
        username: String,
    },
    /// Process a payment through the payment downstream
    Pay {
        #[arg(short, long)]
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let response = match cli.command {
        Commands::Status => client.get(format!("{}/status", cli.url)).send().await?,
        Commands::Login { username } => {
            client
                .post(format!("{}/login", cli.url))
                .json(&json!({ "username": username }))
                .send()
                .await?
        }
        Commands::Order { username } => {
            client
                .post(format!("{}/order", cli.url))
                .json(&json!({ "username": username }))
                .send()
                .await?
        }
        Commands::Pay { amount } => {
            client
                .post(format!("{}/pay", cli.url))
                .json(&json!({ "amount": amount }))
                .send()
                .await?
        }
    };

    print_response(response).await
}

async fn print_response(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = response.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = response.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let body: Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
