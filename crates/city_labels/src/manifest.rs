use crate::error::{LabelError, Result};
use crate::types::LabelRecord;

use csv::{Writer, WriterBuilder};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

pub const MANIFEST_HEADER: [&str; 4] = ["country", "city", "@platform_path", "platform_path_check"];
pub const SKIPPED_HEADER: [&str; 3] = ["country", "city", "reason"];
pub const SELECTION_HEADER: [&str; 5] = ["country", "city", "lat", "lon", "map_file"];

/// One saved map as listed for the layout tool.
///
/// The `@` column is an image-placement field for data merge; the check
/// column repeats the path so it stays readable after the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub country: String,
    pub city: String,
    pub platform_path: String,
}

/// A map that was not saved, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub country: String,
    pub city: String,
    pub reason: String,
}

fn create_writer(file_path: &Path) -> Result<Writer<BufWriter<File>>> {
    if let Some(dir) = file_path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).map_err(|e| LabelError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(file_path).map_err(|e| LabelError::CreateFile {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    let writer = BufWriter::new(file);
    #[allow(unused_mut)]
    let mut builder = WriterBuilder::new();
    #[cfg(windows)]
    {
        use csv::Terminator;
        builder = builder.terminator(Terminator::CRLF);
    }
    Ok(builder.from_writer(writer))
}

/// Writes the manifest in the order the maps were produced
pub fn write_manifest(rows: &[ManifestRow], file_path: &Path) -> Result<PathBuf> {
    let mut wtr = create_writer(file_path)?;
    wtr.write_record(MANIFEST_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.country.as_str(),
            row.city.as_str(),
            row.platform_path.as_str(),
            row.platform_path.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(file_path.to_path_buf())
}

pub fn write_skipped(rows: &[SkippedRow], file_path: &Path) -> Result<PathBuf> {
    let mut wtr = create_writer(file_path)?;
    wtr.write_record(SKIPPED_HEADER)?;
    for row in rows {
        wtr.write_record([row.country.as_str(), row.city.as_str(), row.reason.as_str()])?;
    }
    wtr.flush()?;
    Ok(file_path.to_path_buf())
}

/// Writes selected labels (pins included) without rendering anything
pub fn write_selection<'a, I>(records: I, file_path: &Path) -> Result<PathBuf>
where
    I: IntoIterator<Item = &'a LabelRecord>,
{
    let mut wtr = create_writer(file_path)?;
    wtr.write_record(SELECTION_HEADER)?;
    for rec in records {
        let lat = rec.lat.to_string();
        let lon = rec.lon.to_string();
        wtr.write_record([
            rec.country.as_str(),
            rec.city.as_str(),
            lat.as_str(),
            lon.as_str(),
            rec.output_path.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(file_path.to_path_buf())
}
