/// Selection defaults
pub const DEFAULT_NUMBER_OF_LABELS: usize = 700;
pub const DEFAULT_REFERENCE_GLYPH: &str = "M"; // widest width class
pub const DEFAULT_REFERENCE_REPEAT: usize = 13; // label column fits 13 M's
pub const MAX_REFERENCE_REPEAT: usize = 1000;
pub const DEFAULT_EXCLUDED_COUNTRIES: [&str; 1] = ["Korea, North"];

/// Width estimator unit conversion (milli-inch -> pica)
pub const MILLI_INCH_TO_PICA: f64 = 6.0 / 1000.0;

/// Map figure settings
pub const DEFAULT_PLOT_WIDTH_MM: f64 = 62.0;
pub const DEFAULT_PLOT_HEIGHT_MM: f64 = 28.0;
pub const MM_PER_INCH: f64 = 25.4;
pub const POINTS_PER_INCH: f64 = 72.0;
pub const DEFAULT_BOUNDARY_WIDTH: f64 = 0.3;
pub const DEFAULT_INK_COLOUR: &str = "black";
pub const DEFAULT_MARKER_IMAGE: &str = "markers/cross.png";
pub const MARKER_SIZE_PT: f64 = 6.0;

/// Subplot margins as figure fractions
pub const AXES_LEFT: f64 = 0.125;
pub const AXES_RIGHT: f64 = 0.9;
pub const AXES_BOTTOM: f64 = 0.11;
pub const AXES_TOP: f64 = 0.88;

/// Label placement in axes fractions (y = 0 is the bottom edge)
pub const CITY_TEXT_POS: (f64, f64) = (0.02, 0.04);
pub const COUNTRY_TEXT_POS: (f64, f64) = (0.02, -0.11);
pub const CITY_FONT_SIZE: f64 = 10.0;
pub const COUNTRY_FONT_SIZE: f64 = 7.0;
pub const FONT_ASCENT: f64 = 0.905; // em
pub const FONT_DESCENT: f64 = 0.212; // em

/// Anti-bounce ticks outside the print area
pub const ANTI_BOUNCE_DISTANCE: f64 = 0.2;
pub const ANTI_BOUNCE_FONT_SIZE: f64 = 2.0;

/// World extent used when no boundaries are loaded
pub const WORLD_BOUNDS: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);
pub const DEFAULT_EXCLUDED_REGIONS: [&str; 2] = ["Antarctica", "Fr. S. Antarctic Lands"];

/// Output locations
pub const DEFAULT_MAP_DIR: &str = "city_maps";
pub const DEFAULT_MANIFEST_FILE: &str = "label_data.csv";
pub const DEFAULT_SELECTION_FILE: &str = "selection.csv";

/// Expected headers in the city dataset
pub const COUNTRY_HEADER: &str = "country";
pub const CITY_HEADER: &str = "city";
pub const LAT_HEADER: &str = "lat";
pub const LNG_HEADER: &str = "lng";
pub const LON_HEADER_ALIAS: &str = "lon";

/// Characters that cannot appear in an output file name
pub const ILLEGAL_PATH_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
