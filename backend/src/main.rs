use std::{net::SocketAddr, sync::Arc};

use backend::{AppState, create_router, tomtom::TomTomClient};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Proxy between the travel-time frontend and the TomTom APIs.
#[derive(Parser)]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// Override the TomTom base URL (useful against a local stub).
    #[arg(long, default_value = backend::tomtom::DEFAULT_BASE_URL)]
    api_base: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let state = AppState {
        tomtom: Arc::new(TomTomClient::new(args.api_base.clone())),
    };
    let app = create_router(state);

    tracing::info!("proxying routing calls to {}", args.api_base);
    tracing::info!("starting backend on http://{}", args.listen);
    axum::serve(
        tokio::net::TcpListener::bind(args.listen)
            .await
            .expect("bind listen address"),
        app,
    )
    .await
    .expect("serve backend");
}
