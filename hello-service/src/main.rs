mod error;
mod handlers;
mod routes;

#[cfg(test)]
mod tests;

use recipebook_shared::runtime::{init_logging, serve, shutdown_signal};

const DEFAULT_PORT: u16 = 3002;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    init_logging("info,recipebook_hello_service=debug");

    serve(routes::create_router(), DEFAULT_PORT, shutdown_signal()).await
}
