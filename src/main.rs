use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ward_core::config::{
    dataset_path_from_env_value, hospital_name_from_env_value, vitals_policy_from_env_value,
};
use ward_core::constants::{DATASET_ENV, HOSPITAL_NAME_ENV, VITALS_POLICY_ENV};
use ward_core::{CoreConfig, SharedWard};

/// Main entry point for the ward server
///
/// Loads the ward once, then serves the REST API (with Swagger UI) over a single shared ward.
///
/// # Environment Variables
/// - `WARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WARD_DATASET`: YAML dataset to load (default: the bundled seed)
/// - `WARD_VITALS_POLICY`: `flag` or `reject` for out-of-range vitals (default: `flag`)
/// - `WARD_HOSPITAL_NAME`: overrides the dataset's hospital name
///
/// # Errors
/// Returns an error if the configuration is invalid, the dataset cannot be loaded, the address
/// cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward_run=info".parse()?)
                .add_directive("ward_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        dataset_path_from_env_value(std::env::var(DATASET_ENV).ok()),
        vitals_policy_from_env_value(std::env::var(VITALS_POLICY_ENV).ok())?,
        hospital_name_from_env_value(std::env::var(HOSPITAL_NAME_ENV).ok()),
    )?;
    let ward = cfg.load_ward()?;
    tracing::info!(
        hospital = ward.directory().hospital_name(),
        rooms = ward.directory().list_rooms(None).len(),
        policy = %cfg.vitals_policy(),
        "ward loaded"
    );

    tracing::info!("++ Starting ward REST on {}", rest_addr);

    let app = api_rest::router(SharedWard::new(ward));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
