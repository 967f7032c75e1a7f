use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use log::info;

mod route;

#[derive(Debug, Parser)]
#[command(about = "Serve waste collection calendars over HTTP")]
struct Arguments {
    /// the address to listen on
    #[arg(long, env = "MKG_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    /// the port to listen on
    #[arg(long, env = "MKG_PORT", default_value_t = 8008)]
    port: u16,
}

fn app() -> Router {
    Router::new()
        .route("/holidays", get(route::holidays::handler))
        .route("/preview", post(route::preview::handler))
        .route("/calendar", post(route::calendar::handler))
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Arguments::parse();
    let addr = SocketAddr::from((args.host, args.port));
    info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(app().into_make_service())
        .await?;
    Ok(())
}
