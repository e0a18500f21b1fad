//! Bulk-loads a JSON array of records into one collection.
//!
//! ```bash
//! cargo run -p campus-registry --bin seed -- --collection students --file data/students.json
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use campus_core::tracing::init_tracing;

use campus_registry::config::RegistryConfig;
use campus_registry::domain::types::{Course, Enrollment, Record, Student};
use campus_registry::infra::backend::StoreBackend;
use campus_registry::state::AppState;

#[derive(Clone, Copy, ValueEnum)]
enum SeedCollection {
    Students,
    Courses,
    Enrollments,
}

#[derive(Parser)]
#[command(about = "Seed a registry collection from a JSON array file")]
struct Args {
    /// Target collection
    #[arg(long, value_enum)]
    collection: SeedCollection,

    /// Path to a JSON file holding an array of records
    #[arg(long)]
    file: PathBuf,
}

async fn seed<T: Record>(state: &AppState, raw: &str) -> Result<usize> {
    let records: Vec<T> = serde_json::from_str(raw)
        .with_context(|| format!("parse {} array", T::ENTITY.to_lowercase()))?;
    let created = state.collection::<T>().create_many(records).await?;
    Ok(created.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = RegistryConfig::from_env();
    let state = AppState {
        store: StoreBackend::connect(&config).await?,
    };

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;

    let (collection, count) = match args.collection {
        SeedCollection::Students => (Student::COLLECTION, seed::<Student>(&state, &raw).await?),
        SeedCollection::Courses => (Course::COLLECTION, seed::<Course>(&state, &raw).await?),
        SeedCollection::Enrollments => (
            Enrollment::COLLECTION,
            seed::<Enrollment>(&state, &raw).await?,
        ),
    };
    info!(collection, count, "seed complete");
    Ok(())
}
