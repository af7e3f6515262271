use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "graphql-cli")]
#[command(about = "Probe a deployed GraphQL function", long_about = None)]
struct Cli {
    /// Endpoint of the GraphQL function.
    #[arg(short, long, default_value = "http://localhost:3000/api/graphql")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the health-check endpoint
    Health,
    /// Run a GraphQL operation
    Query {
        /// Query document.
        query: String,

        /// Variables as a JSON object.
        #[arg(long)]
        variables: Option<String>,

        #[arg(long)]
        operation_name: Option<String>,

        /// Send as GET with query parameters instead of a JSON POST.
        #[arg(long)]
        get: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let mut url = reqwest::Url::parse(&cli.url)?;
            url.set_path("/.well-known/apollo/server-health");
            url.set_query(None);
            let res = client.get(url).send().await?;
            print_response(res).await?;
        }
        Commands::Query {
            query,
            variables,
            operation_name,
            get,
        } => {
            let variables: Option<Value> = variables.as_deref().map(serde_json::from_str).transpose()?;
            let res = if get {
                let mut params = vec![("query", query)];
                if let Some(variables) = variables {
                    params.push(("variables", variables.to_string()));
                }
                if let Some(name) = operation_name {
                    params.push(("operationName", name));
                }
                client.get(&cli.url).query(&params).send().await?
            } else {
                let body = json!({
                    "query": query,
                    "variables": variables,
                    "operationName": operation_name,
                });
                client.post(&cli.url).json(&body).send().await?
            };
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: function returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
