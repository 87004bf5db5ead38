use timetable_solver::config::{DEFAULT_LOG_FILTER, ServerConfig};
use timetable_solver::error::ServerError;
use timetable_solver::server;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let config = ServerConfig::from_env()?;
    server::run_server(&config).await
}
