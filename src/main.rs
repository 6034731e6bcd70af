use std::net::TcpListener;

use env_logger::Env;
use log::info;

use gorgies::auth::utils::create_default_admin_if_not_exists;
use gorgies::configuration::get_configuration;
use gorgies::{database, startup};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()?;

    database::ensure_sqlite_dir(&configuration.database.url)?;
    let pool = database::get_connection_pool(
        &configuration.database.url,
        configuration.database.max_connections,
    )
    .await?;

    database::run_migrations(&pool).await?;

    create_default_admin_if_not_exists(&pool, &configuration.admin).await?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;

    info!("Starting the gorgies HTTP server at {address}");

    startup::run(listener, pool, configuration)?.await?;

    Ok(())
}
