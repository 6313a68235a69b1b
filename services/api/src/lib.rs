mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use forest_subsidy::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
