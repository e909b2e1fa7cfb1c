//! One full run: select, render each map, check label collisions, save, and
//! write the manifest. Per-record failures are collected; only configuration
//! and dataset problems abort the run.

use crate::{
    boundaries::{Boundaries, load_boundaries},
    config::{CollisionPolicy, Config},
    constants::DEFAULT_SELECTION_FILE,
    csv_reader::read_cities_csv,
    error::{LabelError, Result},
    frame::{Bounds, Frame},
    manifest::{ManifestRow, SkippedRow, write_manifest, write_selection, write_skipped},
    paths::{platform_path, validate_output_name},
    render::{RenderOptions, RenderedMap, render_map},
    select::{Selection, Selector},
    types::{CityRecord, LabelRecord},
};

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Where the inputs come from
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub cities: PathBuf,
    pub boundaries: Option<PathBuf>,
}

/// A record that could not be turned into a map
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRecord {
    pub country: String,
    pub city: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub requested: usize,
    pub selected: usize,
    pub pinned: usize,
    /// Maps written to the map directory
    pub rendered: usize,
    /// `(country, city)` of maps whose label hides the marker
    pub collided: Vec<(String, String)>,
    pub failed: Vec<FailedRecord>,
    pub manifest: Option<PathBuf>,
}

impl RunReport {
    pub fn is_underfilled(&self) -> bool {
        self.selected < self.requested
    }
}

/// Reads the datasets and runs every stage.
pub fn run(config: &Config, inputs: &RunInputs) -> Result<RunReport> {
    let cities = read_cities_csv(&inputs.cities)?;
    let boundaries = match &inputs.boundaries {
        Some(path) => load_boundaries(path, &config.render.excluded_regions)?,
        None => Boundaries::default(),
    };
    render_all(config, &cities, &boundaries)
}

/// Runs only the selection and writes it to `selection.csv` under the output root.
pub fn run_selection_only(config: &Config, inputs: &RunInputs) -> Result<(Selection, PathBuf)> {
    let cities = read_cities_csv(&inputs.cities)?;
    let selection = select(config, &cities)?;
    let path = write_selection(
        selection.records(),
        &config.output.output_dir.join(DEFAULT_SELECTION_FILE),
    )?;
    info!("Selection saved to: {}", path.display());
    Ok((selection, path))
}

pub fn select(config: &Config, cities: &[CityRecord]) -> Result<Selection> {
    config.validate()?;
    Selector::new(config.selection_policy()).select(cities, &config.selection.pins)
}

/// Selection plus rendering over already loaded data.
pub fn render_all(
    config: &Config,
    cities: &[CityRecord],
    boundaries: &Boundaries,
) -> Result<RunReport> {
    let selection = select(config, cities)?;

    let data_bounds = boundaries.bounds().unwrap_or_else(Bounds::world);
    let frame = Frame::new(
        config.render.plot_width_mm,
        config.render.plot_height_mm,
        data_bounds,
    );
    let options = RenderOptions::from(&config.render);
    let out = &config.output;

    let mut report = RunReport {
        requested: selection.requested,
        selected: selection.labels.len(),
        pinned: selection.pinned.len(),
        ..Default::default()
    };
    let mut manifest_rows = Vec::new();
    let mut skipped_rows = Vec::new();

    for record in selection.records() {
        if let Err(e) = validate_output_name(&record.country, &record.city) {
            warn!("Skipping {}, {}: {e}", record.city, record.country);
            report.failed.push(failed(record, e.to_string()));
            skipped_rows.push(skipped(record, e.to_string()));
            continue;
        }

        let map = match render_map(record, &frame, boundaries, &options) {
            Ok(map) => map,
            Err(e) => {
                warn!("Failed to render {}, {}: {e}", record.city, record.country);
                report.failed.push(failed(record, e.to_string()));
                continue;
            }
        };

        if map.marker_hidden() {
            info!("{} {} is behind the text", record.country, record.city);
            report
                .collided
                .push((record.country.clone(), record.city.clone()));

            if config.render.collision_policy == CollisionPolicy::Skip {
                skipped_rows.push(skipped(record, collision_reason(&map).to_string()));
                if let Some(dir) = &out.crossing_dir {
                    save_for_review(record, &frame, boundaries, &options, dir, &out.output_dir);
                }
                continue;
            }
        }

        let target = out.output_dir.join(&record.output_path);
        if let Err(e) = write_svg(&target, &map.svg) {
            warn!("{e}");
            report.failed.push(failed(record, e.to_string()));
            continue;
        }
        debug!("Saved {}", target.display());
        report.rendered += 1;

        manifest_rows.push(ManifestRow {
            country: record.country.clone(),
            city: record.city.clone(),
            platform_path: platform_path(
                out.platform_root.as_deref(),
                &record.output_path,
                out.backslash_paths,
            ),
        });
    }

    info!("saving the CSV");
    let manifest_path = write_manifest(&manifest_rows, &out.output_dir.join(&out.manifest))?;
    info!("Manifest saved to: {}", manifest_path.display());
    report.manifest = Some(manifest_path);

    if let Some(name) = &out.skipped_manifest {
        let path = write_skipped(&skipped_rows, &out.output_dir.join(name))?;
        info!("Skipped list saved to: {}", path.display());
    }

    log_summary(&report);
    Ok(report)
}

fn collision_reason(map: &RenderedMap) -> &'static str {
    match (map.city_hides_marker, map.country_hides_marker) {
        (true, true) => "marker behind city and country text",
        (true, false) => "marker behind city text",
        _ => "marker behind country text",
    }
}

/// Writes a skipped map with visible text and label boxes. Failures are only logged.
fn save_for_review(
    record: &LabelRecord,
    frame: &Frame,
    boundaries: &Boundaries,
    options: &RenderOptions,
    crossing_dir: &str,
    output_dir: &Path,
) {
    let file_name = Path::new(&record.output_path)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&record.output_path));
    let target = output_dir.join(crossing_dir).join(file_name);

    let result = render_map(record, frame, boundaries, &options.for_review())
        .and_then(|map| write_svg(&target, &map.svg));
    match result {
        Ok(()) => debug!("Saved review copy {}", target.display()),
        Err(e) => warn!("Could not save review copy for {}: {e}", record.city),
    }
}

fn write_svg(target: &Path, svg: &str) -> Result<()> {
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| LabelError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(target, svg).map_err(|e| LabelError::WriteFile {
        path: target.to_path_buf(),
        source: e,
    })
}

fn failed(record: &LabelRecord, reason: String) -> FailedRecord {
    FailedRecord {
        country: record.country.clone(),
        city: record.city.clone(),
        reason,
    }
}

fn skipped(record: &LabelRecord, reason: String) -> SkippedRow {
    SkippedRow {
        country: record.country.clone(),
        city: record.city.clone(),
        reason,
    }
}

fn log_summary(report: &RunReport) {
    info!(
        "Selected {} of {} requested labels (+{} pinned)",
        report.selected, report.requested, report.pinned
    );
    if report.is_underfilled() {
        warn!(
            "Ran out of candidate cities: {} labels short",
            report.requested - report.selected
        );
    }
    info!("Maps saved: {}", report.rendered);
    if !report.collided.is_empty() {
        info!("Label hides marker: {}", report.collided.len());
    }
    if !report.failed.is_empty() {
        warn!("Failed: {}", report.failed.len());
        for f in &report.failed {
            warn!("  {}, {}: {}", f.city, f.country, f.reason);
        }
    }
}
