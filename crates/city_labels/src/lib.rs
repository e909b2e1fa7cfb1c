pub mod boundaries;
pub mod collision;
pub mod config;
pub mod constants;
pub mod csv_reader;
pub mod error;
pub mod frame;
pub mod manifest;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod select;
pub mod types;
pub mod width;

pub use collision::{TextBox, marker_is_behind_text};
pub use config::{CollisionPolicy, Config, MarkerStyle};
pub use csv_reader::{read_cities_csv, read_cities_from_reader};
pub use error::{LabelError, Result};
pub use pipeline::{RunInputs, RunReport, run, run_selection_only};
pub use select::{
    Rejection, Selection, SelectionPolicy, Selector, Verdict, evaluate, should_include,
};
pub use types::{CityRecord, LabelRecord, PinnedPlace};
pub use width::{estimate_width, width_threshold};
