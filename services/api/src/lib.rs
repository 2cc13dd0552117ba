mod cli;
mod infra;
mod routes;
mod server;
mod verify;

use h2_verify::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
