use crate::{
    constants::{
        DEFAULT_BOUNDARY_WIDTH, DEFAULT_EXCLUDED_COUNTRIES, DEFAULT_EXCLUDED_REGIONS,
        DEFAULT_INK_COLOUR, DEFAULT_MANIFEST_FILE, DEFAULT_MAP_DIR, DEFAULT_MARKER_IMAGE,
        DEFAULT_NUMBER_OF_LABELS, DEFAULT_PLOT_HEIGHT_MM, DEFAULT_PLOT_WIDTH_MM,
        DEFAULT_REFERENCE_GLYPH, DEFAULT_REFERENCE_REPEAT, MAX_REFERENCE_REPEAT,
    },
    error::{LabelError, Result},
    select::SelectionPolicy,
    types::PinnedPlace,
    width::width_threshold,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};

const ENV_OUTPUT_DIR: &str = "CITY_LABELS_OUTPUT_DIR";

/// How the location is marked on each map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    /// Place the marker image centred on the city
    #[default]
    Image,
    /// Draw a plotted `+` symbol
    Symbol,
    /// No marker
    None,
}

/// What to do with a map whose label hides its marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Do not save the map or list it in the manifest
    #[default]
    Skip,
    /// Save it anyway and report it for manual review
    Flag,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub selection: SelectionConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub number_of_labels: usize,
    pub excluded_countries: Vec<String>,
    /// Width threshold is `reference_glyph` repeated `reference_repeat` times
    pub reference_glyph: String,
    pub reference_repeat: usize,
    pub pins: Vec<PinnedPlace>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            number_of_labels: DEFAULT_NUMBER_OF_LABELS,
            excluded_countries: DEFAULT_EXCLUDED_COUNTRIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            reference_glyph: DEFAULT_REFERENCE_GLYPH.to_string(),
            reference_repeat: DEFAULT_REFERENCE_REPEAT,
            pins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub marker: MarkerStyle,
    pub marker_image: String,
    /// Make label text visible; it is measured either way
    pub add_text: bool,
    pub draw_text_boxes: bool,
    pub plot_width_mm: f64,
    pub plot_height_mm: f64,
    pub ink_colour: String,
    pub boundary_width: f64,
    pub excluded_regions: Vec<String>,
    pub collision_policy: CollisionPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            marker: MarkerStyle::default(),
            marker_image: DEFAULT_MARKER_IMAGE.to_string(),
            add_text: false,
            draw_text_boxes: false,
            plot_width_mm: DEFAULT_PLOT_WIDTH_MM,
            plot_height_mm: DEFAULT_PLOT_HEIGHT_MM,
            ink_colour: DEFAULT_INK_COLOUR.to_string(),
            boundary_width: DEFAULT_BOUNDARY_WIDTH,
            excluded_regions: DEFAULT_EXCLUDED_REGIONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root for every file written; `CITY_LABELS_OUTPUT_DIR` overrides it
    pub output_dir: PathBuf,
    pub map_dir: String,
    /// Skipped maps are written here with visible text when set
    pub crossing_dir: Option<String>,
    pub manifest: String,
    pub skipped_manifest: Option<String>,
    /// Prefix for the manifest's platform paths
    pub platform_root: Option<String>,
    pub backslash_paths: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            map_dir: DEFAULT_MAP_DIR.to_string(),
            crossing_dir: None,
            manifest: DEFAULT_MANIFEST_FILE.to_string(),
            skipped_manifest: None,
            platform_root: None,
            backslash_paths: false,
        }
    }
}

impl Config {
    /// Read settings from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LabelError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `CITY_LABELS_OUTPUT_DIR` if set and not blank
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(output_dir) = env::var(ENV_OUTPUT_DIR)
            && !output_dir.trim().is_empty()
        {
            let path = PathBuf::from(output_dir);

            // If the path already exists but is not a directory, reject early.
            if path.exists() && !path.is_dir() {
                return Err(LabelError::Config(format!(
                    "Output path is not a directory: {}",
                    path.display()
                )));
            }
            self.output.output_dir = path;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let selection = &self.selection;
        if selection.number_of_labels == 0 {
            return Err(LabelError::Config(
                "selection.number_of_labels must be at least 1".to_string(),
            ));
        }
        if selection.reference_glyph.is_empty() || selection.reference_repeat == 0 {
            return Err(LabelError::Config(
                "selection.reference_glyph and reference_repeat must be non-empty".to_string(),
            ));
        }
        if selection.reference_repeat > MAX_REFERENCE_REPEAT {
            return Err(LabelError::Config(format!(
                "selection.reference_repeat must be at most {MAX_REFERENCE_REPEAT}, got {}",
                selection.reference_repeat
            )));
        }
        for pin in &selection.pins {
            if pin.country.trim().is_empty() || pin.city.trim().is_empty() {
                return Err(LabelError::Config(format!(
                    "pinned place at ({}, {}) needs a country and a city",
                    pin.lat, pin.lon
                )));
            }
        }

        let render = &self.render;
        if !(render.plot_width_mm > 0.0 && render.plot_height_mm > 0.0) {
            return Err(LabelError::Config(format!(
                "plot size must be positive, got {} x {} mm",
                render.plot_width_mm, render.plot_height_mm
            )));
        }
        if render.boundary_width < 0.0 {
            return Err(LabelError::Config(
                "render.boundary_width cannot be negative".to_string(),
            ));
        }

        if self.output.manifest.trim().is_empty() {
            return Err(LabelError::Config(
                "output.manifest cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Widest permitted name in picas
    pub fn max_width(&self) -> f64 {
        width_threshold(
            &self.selection.reference_glyph,
            self.selection.reference_repeat,
        )
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            number_of_labels: self.selection.number_of_labels,
            max_width: self.max_width(),
            excluded_countries: self.selection.excluded_countries.iter().cloned().collect(),
            map_dir: self.output.map_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection.number_of_labels, 700);
        assert_eq!(config.max_width(), 10.0);
        assert_eq!(config.render.marker, MarkerStyle::Image);
        assert_eq!(config.render.collision_policy, CollisionPolicy::Skip);
        assert_eq!(config.output.map_dir, "city_maps");
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
[selection]
number_of_labels = 5
excluded_countries = []

[[selection.pins]]
country = "Italy"
city = "Como"
lat = 45.81477
lon = 9.07528

[render]
marker = "symbol"
add_text = true
"#,
        );
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.selection.number_of_labels, 5);
        assert!(config.selection.excluded_countries.is_empty());
        assert_eq!(config.selection.pins.len(), 1);
        assert_eq!(config.selection.pins[0].city, "Como");
        // Unset fields keep their defaults
        assert_eq!(config.selection.reference_repeat, 13);
        assert_eq!(config.render.marker, MarkerStyle::Symbol);
        assert!(config.render.add_text);
        assert_eq!(config.render.plot_width_mm, 62.0);

        let policy = config.selection_policy();
        assert_eq!(policy.number_of_labels, 5);
        assert!(policy.excluded_countries.is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[selection]\nnumber_of_labels = 0\n");
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(LabelError::Config(_))
        ));

        let file = write_config("[render]\nplot_width_mm = -1.0\n");
        assert!(Config::load_from_file(file.path()).is_err());

        let file = write_config("[render]\nmarker = \"sparkles\"\n");
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(LabelError::Config(msg)) if msg.starts_with("TOML parse error")
        ));

        let file = write_config("[selection]\nreference_repeat = 1000\n");
        assert!(Config::load_from_file(file.path()).is_ok());
        let file = write_config("[selection]\nreference_repeat = 1000000000\n");
        assert!(matches!(
            Config::load_from_file(file.path()),
            Err(LabelError::Config(msg)) if msg.contains("at most 1000")
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load_from_file(Path::new("nonexistent/config.toml"));
        assert!(matches!(result, Err(LabelError::Config(_))));
    }

    // Environment cases run in one test so they cannot race each other.
    #[test]
    fn test_apply_env() {
        let orig_output_dir = env::var(ENV_OUTPUT_DIR).ok();

        let temp_dir = TempDir::new().unwrap();
        unsafe {
            env::set_var(ENV_OUTPUT_DIR, temp_dir.path());
        }
        let mut config = Config::default();
        config.apply_env().unwrap();
        assert_eq!(config.output.output_dir, temp_dir.path().to_path_buf());

        unsafe {
            env::set_var(ENV_OUTPUT_DIR, "   ");
        }
        let mut config = Config::default();
        config.apply_env().unwrap();
        assert_eq!(config.output.output_dir, PathBuf::from("."));

        let file = NamedTempFile::new().unwrap();
        unsafe {
            env::set_var(ENV_OUTPUT_DIR, file.path());
        }
        let mut config = Config::default();
        assert!(config.apply_env().is_err());

        // Cleanup
        unsafe {
            env::remove_var(ENV_OUTPUT_DIR);
            if let Some(value) = orig_output_dir {
                env::set_var(ENV_OUTPUT_DIR, value);
            }
        }
    }
}
