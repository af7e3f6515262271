//! Local development server for the GraphQL function.
//!
//! Serves a demo schema through the same handler a serverless deployment
//! would use, on every path of a local listener.
//!
//! ```text
//! graphql-vercel --config graphql.toml --bind 127.0.0.1:4000
//! ```

use std::path::PathBuf;

use async_graphql::{Context, EmptySubscription, Object, Schema, Upload};
use clap::Parser;
use tokio::net::TcpListener;

use graphql_vercel::config::{load_config, ServerConfig};
use graphql_vercel::lifecycle::{wait_for_signal, Shutdown};
use graphql_vercel::observability::init_logging;
use graphql_vercel::upload::{FileMetadata, UploadPlaceholder};
use graphql_vercel::{GraphQLHandler, GraphQLServer, HttpServer};

#[derive(Parser)]
#[command(name = "graphql-vercel")]
#[command(about = "Run the GraphQL function locally", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

struct Query;

#[Object]
impl Query {
    async fn hello(&self, name: Option<String>) -> String {
        format!("Hello, {}!", name.as_deref().unwrap_or("world"))
    }
}

struct Mutation;

#[Object]
impl Mutation {
    async fn single_upload(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<FileMetadata> {
        Ok(UploadPlaceholder::resolve(ctx, &file)?.metadata())
    }

    async fn multiple_upload(&self, ctx: &Context<'_>, files: Vec<Upload>) -> async_graphql::Result<Vec<FileMetadata>> {
        files
            .iter()
            .map(|file| -> async_graphql::Result<FileMetadata> {
                Ok(UploadPlaceholder::resolve(ctx, file)?.metadata())
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        cors = config.handler.cors.is_some(),
        "Configuration loaded"
    );

    let schema = Schema::new(Query, Mutation, EmptySubscription);
    let handler = GraphQLHandler::builder(GraphQLServer::new(schema))
        .config(config.handler.clone())
        .build();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config.timeouts, handler);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
