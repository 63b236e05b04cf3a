//! Batch file writer
//!
//! The simulator reads one comma-separated line per event, without a
//! header, in [`NcirfRow`] field order.

use crate::error::Result;
use crate::types::NcirfRow;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes rows as header-less CSV
pub fn write_rows<W: Write>(writer: W, rows: &[NcirfRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes rows to a new file, replacing any existing one
pub fn write_rows_to_path(path: &Path, rows: &[NcirfRow]) -> Result<()> {
    write_rows(File::create(path)?, rows)?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
