//! `creogen-worker` -- renders one stored bulk-upload export to a file.
//!
//! Loads the export document from Postgres, expands it into the Ads Manager
//! bulk sheet and writes the result next to the other job outputs.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                                  |
//! |-------------------------|----------|---------|----------------------------------------------|
//! | `DATABASE_URL`          | yes      | --      | Postgres connection string                   |
//! | `EXPORT_ID`             | yes      | --      | Id of the `tt_exports` document              |
//! | `EXPORT_OUTPUT_DIR`     | no       | `.`     | Directory for `<id>.csv` / `<id>.xlsx`       |
//! | `EXPORT_FORMAT`         | no       | `csv`   | `csv` or `xlsx`                              |
//! | `EXPORT_TEMPLATE_PATH`  | no       | --      | Workbook to append rows to (xlsx only)       |
//! | `EXPORT_TEMPLATE_SHEET` | no       | `Ads`   | Sheet name hint inside the template          |
//! | `DB_MAX_CONNECTIONS`    | no       | `5`     | Pool size                                    |

use creogen_core::store::DocumentStore;
use creogen_db::{PgDocumentStore, StoreConfig};
use creogen_worker::config::JobConfig;
use creogen_worker::job;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creogen_worker=info,creogen_export=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store_config = StoreConfig::from_env().unwrap_or_else(|| {
        tracing::error!("DATABASE_URL environment variable is required");
        std::process::exit(1);
    });

    let job_config = JobConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid job configuration");
        std::process::exit(1);
    });

    tracing::info!(
        export_id = %job_config.export_id,
        format = job_config.format.extension(),
        output_dir = %job_config.output_dir.display(),
        "Starting creogen-worker",
    );

    let store = PgDocumentStore::connect(&store_config)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to connect to the document store");
            std::process::exit(1);
        });

    let result = job::run(&store, &job_config).await;
    store.close().await;

    if let Err(e) = result {
        tracing::error!(error = %e, "Export failed");
        std::process::exit(1);
    }
}
