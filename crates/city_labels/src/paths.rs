use crate::{
    constants::ILLEGAL_PATH_CHARS,
    error::{LabelError, Result},
};

/// Relative output path of the map for one city.
pub fn map_file_for(map_dir: &str, country: &str, city: &str) -> String {
    let dir = map_dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("{country}_{city}.svg")
    } else {
        format!("{dir}/{country}_{city}.svg")
    }
}

/// Rejects names that cannot be used as part of a file name (e.g. "Biel/Bienne").
pub fn validate_output_name(country: &str, city: &str) -> Result<()> {
    for name in [country, city] {
        if let Some(ch) = name
            .chars()
            .find(|c| ILLEGAL_PATH_CHARS.contains(c) || c.is_control())
        {
            return Err(LabelError::MalformedPath {
                country: country.to_string(),
                city: city.to_string(),
                ch,
            });
        }
    }
    Ok(())
}

/// Path written into the manifest for the layout tool.
pub fn platform_path(root: Option<&str>, map_file: &str, backslashes: bool) -> String {
    let joined = match root {
        Some(root) if !root.is_empty() => {
            format!("{}/{}", root.trim_end_matches(['/', '\\']), map_file)
        }
        _ => map_file.to_string(),
    };
    if backslashes {
        joined.replace('/', "\\")
    } else {
        joined
    }
}
