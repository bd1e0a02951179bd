mod cli;
mod infra;
mod routes;
mod server;
mod shutdown;

use property_desk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
