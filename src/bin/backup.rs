//! Create a compressed backup archive of the database and uploads.
//!
//! Usage: `backup [output.tar.gz]`. The default output name carries a
//! timestamp, e.g. `dahabiyat-backup-20260823-141500.tar.gz`.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use flate2::{write::GzEncoder, Compression};
use std::fs::File;
use std::path::Path;

use dahabiyat::config::Config;

fn main() -> Result<()> {
    let config = Config::load_with_env(Path::new("config.yml"))?;

    let output = std::env::args().nth(1).unwrap_or_else(|| {
        format!(
            "dahabiyat-backup-{}.tar.gz",
            Utc::now().format("%Y%m%d-%H%M%S")
        )
    });

    let db_path = Path::new(&config.database.url);
    if config.database.url.contains(":memory:") {
        bail!("Cannot back up an in-memory database");
    }
    if !db_path.exists() {
        bail!("Database file not found: {}", db_path.display());
    }

    let file = File::create(&output)
        .with_context(|| format!("Failed to create archive: {}", output))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = tar::Builder::new(encoder);

    let db_name = db_path
        .file_name()
        .context("Database path has no file name")?;
    archive
        .append_path_with_name(db_path, Path::new("db").join(db_name))
        .context("Failed to add database to archive")?;

    if config.upload.path.is_dir() {
        archive
            .append_dir_all("uploads", &config.upload.path)
            .context("Failed to add uploads to archive")?;
    }

    let encoder = archive
        .into_inner()
        .context("Failed to finish archive")?;
    encoder.finish().context("Failed to flush archive")?;

    println!("Backup written to {}", output);
    Ok(())
}
