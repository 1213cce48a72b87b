//! JSON and CSV writers

use crate::error::{SyncError, SyncResult};
use crate::models::{MeasureRow, NormalizedModule};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn create(path: &Path) -> SyncResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Pretty-printed UTF-8 JSON, four-space indent, non-ASCII kept as is
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SyncResult<()> {
    tracing::info!("Saving JSON output to {}", path.display());

    let mut writer = create(path)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(std::io::Error::from)?;
    writer.flush()?;
    Ok(())
}

/// One row per measure, in module order
pub fn measure_rows(modules: &[NormalizedModule]) -> Vec<MeasureRow> {
    modules.iter().flat_map(MeasureRow::from_module).collect()
}

/// Header plus rows, every field quoted
pub fn write_csv(path: &Path, rows: &[MeasureRow]) -> SyncResult<()> {
    if rows.is_empty() {
        return Err(SyncError::invalid_input(
            "rows",
            "no rows to derive a CSV header from",
        ));
    }
    tracing::info!("Saving CSV output to {} ({} rows)", path.display(), rows.len());

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(create(path)?);
    for row in rows {
        writer.serialize(row).map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}
