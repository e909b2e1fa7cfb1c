//! Round-robin city selection.
//!
//! Countries take turns: round `r` offers every country its `r`-th city (in
//! dataset order), and each offer is accepted or rejected by [`evaluate`].
//! Rounds continue until enough labels are accepted or every country has run
//! out of cities.
//!
//! City names are unique across the whole selection, not per country: once
//! one country contributes "San Jose", no other country can. This is kept as
//! is even though it can drop a legitimate city elsewhere.

use crate::{
    constants::{
        DEFAULT_EXCLUDED_COUNTRIES, DEFAULT_MAP_DIR, DEFAULT_NUMBER_OF_LABELS,
        DEFAULT_REFERENCE_GLYPH, DEFAULT_REFERENCE_REPEAT,
    },
    error::{LabelError, Result},
    paths::map_file_for,
    types::{CityRecord, LabelRecord, PinnedPlace},
    width::{estimate_width, width_threshold},
};

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Why a candidate was turned down.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    CountryTooWide { width: f64 },
    CityTooWide { width: f64 },
    CityTaken,
    CountryExcluded,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CountryTooWide { width } => write!(f, "country too long ({width:.2} picas)"),
            Rejection::CityTooWide { width } => write!(f, "city too long ({width:.2} picas)"),
            Rejection::CityTaken => write!(f, "city name already taken"),
            Rejection::CountryExcluded => write!(f, "country is on the exclusion list"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Inclusion rules applied to every candidate.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub number_of_labels: usize,
    /// Widest permitted `country` or `city`, in picas
    pub max_width: f64,
    pub excluded_countries: HashSet<String>,
    pub map_dir: String,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            number_of_labels: DEFAULT_NUMBER_OF_LABELS,
            max_width: width_threshold(DEFAULT_REFERENCE_GLYPH, DEFAULT_REFERENCE_REPEAT),
            excluded_countries: DEFAULT_EXCLUDED_COUNTRIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            map_dir: DEFAULT_MAP_DIR.to_string(),
        }
    }
}

/// Decides whether `candidate` may join the selection. The first failing
/// rule is reported.
pub fn evaluate(
    candidate: &CityRecord,
    taken_cities: &HashSet<String>,
    max_width: f64,
    excluded_countries: &HashSet<String>,
) -> Verdict {
    let country_width = estimate_width(&candidate.country);
    if country_width > max_width {
        return Verdict::Reject(Rejection::CountryTooWide {
            width: country_width,
        });
    }
    let city_width = estimate_width(&candidate.city);
    if city_width > max_width {
        return Verdict::Reject(Rejection::CityTooWide { width: city_width });
    }
    if taken_cities.contains(&candidate.city) {
        return Verdict::Reject(Rejection::CityTaken);
    }
    if excluded_countries.contains(&candidate.country) {
        return Verdict::Reject(Rejection::CountryExcluded);
    }
    Verdict::Accept
}

pub fn should_include(
    candidate: &CityRecord,
    taken_cities: &HashSet<String>,
    max_width: f64,
    excluded_countries: &HashSet<String>,
) -> bool {
    evaluate(candidate, taken_cities, max_width, excluded_countries).is_accept()
}

/// Result of one selection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Accepted labels in acceptance order, never more than requested
    pub labels: Vec<LabelRecord>,
    /// Hand-placed labels, appended after `labels` without any checks
    pub pinned: Vec<LabelRecord>,
    pub requested: usize,
    pub rounds: usize,
    /// Countries in the order they ran out of cities
    pub exhausted: Vec<String>,
}

impl Selection {
    /// Selected labels followed by pinned ones.
    pub fn records(&self) -> impl Iterator<Item = &LabelRecord> {
        self.labels.iter().chain(self.pinned.iter())
    }

    pub fn len(&self) -> usize {
        self.labels.len() + self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every country ran out before the requested count was reached.
    pub fn is_underfilled(&self) -> bool {
        self.labels.len() < self.requested
    }
}

pub struct Selector {
    policy: SelectionPolicy,
}

impl Selector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Runs the round-robin scan over `cities` and appends `pins`.
    ///
    /// # Errors
    /// Returns error if `cities` is empty or no labels are requested.
    pub fn select(&self, cities: &[CityRecord], pins: &[PinnedPlace]) -> Result<Selection> {
        if cities.is_empty() {
            return Err(LabelError::Config("city dataset is empty".to_string()));
        }
        if self.policy.number_of_labels == 0 {
            return Err(LabelError::Config(
                "number_of_labels must be at least 1".to_string(),
            ));
        }

        let by_country = group_by_country(cities);
        let target = self.policy.number_of_labels;

        let mut selection = Selection {
            requested: target,
            ..Default::default()
        };
        let mut taken_cities: HashSet<String> = HashSet::new();
        let mut exhausted: HashSet<&str> = HashSet::new();
        let mut round = 0usize;

        'rounds: while selection.labels.len() < target && exhausted.len() < by_country.len() {
            for (&country, group) in &by_country {
                let Some(candidate) = group.get(round) else {
                    if exhausted.insert(country) {
                        info!(
                            "by round {}, with {} cities on the list, {} is out of cities",
                            round + 1,
                            selection.labels.len(),
                            country
                        );
                        selection.exhausted.push(country.to_string());
                    }
                    continue;
                };

                match evaluate(
                    candidate,
                    &taken_cities,
                    self.policy.max_width,
                    &self.policy.excluded_countries,
                ) {
                    Verdict::Accept => {
                        taken_cities.insert(candidate.city.clone());
                        selection.labels.push(self.label_for(
                            &candidate.country,
                            &candidate.city,
                            candidate.lat,
                            candidate.lon,
                        ));
                        if selection.labels.len() >= target {
                            round += 1;
                            break 'rounds;
                        }
                    }
                    Verdict::Reject(reason) => {
                        debug!("rejected {}, {}: {}", candidate.city, candidate.country, reason);
                    }
                }
            }
            round += 1;
        }
        selection.rounds = round;

        if selection.is_underfilled() {
            warn!(
                "all {} countries ran out of cities after {} rounds: {} of {} labels selected",
                by_country.len(),
                round,
                selection.labels.len(),
                target
            );
        } else {
            info!("selected {} labels in {} rounds", selection.labels.len(), round);
        }

        for pin in pins {
            debug!("pinning {}, {}", pin.city, pin.country);
            selection
                .pinned
                .push(self.label_for(&pin.country, &pin.city, pin.lat, pin.lon));
        }

        Ok(selection)
    }

    fn label_for(&self, country: &str, city: &str, lat: f64, lon: f64) -> LabelRecord {
        LabelRecord {
            country: country.to_string(),
            city: city.to_string(),
            lat,
            lon,
            output_path: map_file_for(&self.policy.map_dir, country, city),
        }
    }
}

/// Groups cities by country in ascending name order, keeping dataset order
/// inside each group.
fn group_by_country(cities: &[CityRecord]) -> BTreeMap<&str, Vec<&CityRecord>> {
    let mut groups: BTreeMap<&str, Vec<&CityRecord>> = BTreeMap::new();
    for city in cities {
        groups.entry(city.country.as_str()).or_default().push(city);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn city(country: &str, name: &str) -> CityRecord {
        CityRecord::new(country, name, 1.0, 2.0)
    }

    fn open_policy(n: usize) -> SelectionPolicy {
        SelectionPolicy {
            number_of_labels: n,
            max_width: f64::INFINITY,
            excluded_countries: HashSet::new(),
            map_dir: DEFAULT_MAP_DIR.to_string(),
        }
    }

    fn names(selection: &Selection) -> Vec<(&str, &str)> {
        selection
            .labels
            .iter()
            .map(|l| (l.country.as_str(), l.city.as_str()))
            .collect()
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(SelectionPolicy::default().max_width, 10.0);
        assert!(
            SelectionPolicy::default()
                .excluded_countries
                .contains("Korea, North")
        );
    }

    #[test]
    fn test_rules_apply_in_order() {
        let taken: HashSet<String> = ["Lima".to_string()].into_iter().collect();
        let excluded: HashSet<String> = ["Peru".to_string()].into_iter().collect();

        // Too wide country wins over every other rule
        let wide = city("MMMMMMMMMMMMMMMM", "Lima");
        assert!(matches!(
            evaluate(&wide, &taken, 10.0, &excluded),
            Verdict::Reject(Rejection::CountryTooWide { .. })
        ));

        let wide_city = city("Peru", "WWWWWWWWWWWWWWWW");
        assert!(matches!(
            evaluate(&wide_city, &taken, 10.0, &excluded),
            Verdict::Reject(Rejection::CityTooWide { .. })
        ));

        // Taken is reported before excluded
        assert_eq!(
            evaluate(&city("Peru", "Lima"), &taken, 10.0, &excluded),
            Verdict::Reject(Rejection::CityTaken)
        );
        assert_eq!(
            evaluate(&city("Peru", "Cusco"), &taken, 10.0, &excluded),
            Verdict::Reject(Rejection::CountryExcluded)
        );
        assert_eq!(
            evaluate(&city("Chile", "Arica"), &taken, 10.0, &excluded),
            Verdict::Accept
        );
        assert!(should_include(&city("Chile", "Arica"), &taken, 10.0, &excluded));
    }

    #[test]
    fn test_width_is_compared_strictly() {
        // "MMMMMMMMMMMMM" is 10.53 picas, over a threshold of 10
        let taken = HashSet::new();
        let excluded = HashSet::new();
        let at_limit = city("Peru", "MMMMMMMMMMMMM");
        assert!(!should_include(&at_limit, &taken, 10.0, &excluded));
        assert!(should_include(&at_limit, &taken, 10.53 + 1e-9, &excluded));
    }

    #[test]
    fn test_underfilled_run_stops_when_all_countries_exhausted() {
        let cities = vec![
            city("A", "a1"),
            city("A", "a2"),
            city("A", "a3"),
            city("B", "b1"),
        ];
        let selection = Selector::new(open_policy(5)).select(&cities, &[]).unwrap();

        assert_eq!(
            names(&selection),
            vec![("A", "a1"), ("B", "b1"), ("A", "a2"), ("A", "a3")]
        );
        assert_eq!(selection.labels.len(), 4);
        assert!(selection.is_underfilled());
        assert_eq!(selection.exhausted, vec!["B".to_string(), "A".to_string()]);
        assert_eq!(selection.rounds, 4);
    }

    #[test]
    fn test_never_exceeds_requested_count() {
        let cities: Vec<CityRecord> = ["A", "B", "C"]
            .iter()
            .flat_map(|c| (0..10).map(move |i| city(c, &format!("{c}{i}"))))
            .collect();
        let selection = Selector::new(open_policy(5)).select(&cities, &[]).unwrap();

        // Stops mid-round once the target is reached
        assert_eq!(selection.labels.len(), 5);
        assert!(!selection.is_underfilled());
        assert_eq!(
            names(&selection),
            vec![("A", "A0"), ("B", "B0"), ("C", "C0"), ("A", "A1"), ("B", "B1")]
        );

        let mut per_country: HashMap<&str, usize> = HashMap::new();
        for label in &selection.labels {
            *per_country.entry(label.country.as_str()).or_insert(0) += 1;
        }
        assert!(per_country.values().all(|&n| n <= selection.rounds));
    }

    #[test]
    fn test_country_order_is_by_name_not_row_order() {
        let cities = vec![city("Zambia", "Lusaka"), city("Angola", "Luanda")];
        let selection = Selector::new(open_policy(10)).select(&cities, &[]).unwrap();
        assert_eq!(
            names(&selection),
            vec![("Angola", "Luanda"), ("Zambia", "Lusaka")]
        );
    }

    #[test]
    fn test_city_names_unique_across_countries() {
        // Second "San Jose" is dropped even though it is another country's city
        let cities = vec![
            city("Costa Rica", "San Jose"),
            city("Costa Rica", "Limon"),
            city("United States", "San Jose"),
            city("United States", "Austin"),
        ];
        let selection = Selector::new(open_policy(10)).select(&cities, &[]).unwrap();
        assert_eq!(
            names(&selection),
            vec![
                ("Costa Rica", "San Jose"),
                ("Costa Rica", "Limon"),
                ("United States", "Austin"),
            ]
        );

        let unique: HashSet<&str> = selection.labels.iter().map(|l| l.city.as_str()).collect();
        assert_eq!(unique.len(), selection.labels.len());
        let paths: HashSet<&str> = selection
            .labels
            .iter()
            .map(|l| l.output_path.as_str())
            .collect();
        assert_eq!(paths.len(), selection.labels.len());
    }

    #[test]
    fn test_excluded_and_wide_names_never_selected() {
        let cities = vec![
            city("Korea, North", "Pyongyang"),
            city("Korea, South", "Seoul"),
            city("Peru", "Santiago de Surco de la Sierra"),
            city("Peru", "Lima"),
        ];
        let selection = Selector::new(SelectionPolicy::default())
            .select(&cities, &[])
            .unwrap();

        assert!(selection.labels.iter().all(|l| l.country != "Korea, North"));
        assert_eq!(names(&selection), vec![("Korea, South", "Seoul"), ("Peru", "Lima")]);
    }

    #[test]
    fn test_pins_bypass_every_rule() {
        let cities = vec![city("Italy", "Como"), city("Italy", "Rome")];
        let pins = vec![
            // Duplicate name, excluded country and an overlong name all go through
            PinnedPlace {
                country: "Italy".to_string(),
                city: "Como".to_string(),
                lat: 45.81477,
                lon: 9.07528,
            },
            PinnedPlace {
                country: "Korea, North".to_string(),
                city: "MMMMMMMMMMMMMMMMMMMM".to_string(),
                lat: 39.0,
                lon: 125.7,
            },
        ];
        let selection = Selector::new(SelectionPolicy {
            number_of_labels: 1,
            ..SelectionPolicy::default()
        })
        .select(&cities, &pins)
        .unwrap();

        assert_eq!(selection.labels.len(), 1);
        assert_eq!(selection.pinned.len(), 2);
        assert_eq!(selection.len(), 3);
        let all: Vec<&str> = selection.records().map(|r| r.city.as_str()).collect();
        assert_eq!(all, vec!["Como", "Como", "MMMMMMMMMMMMMMMMMMMM"]);
        assert_eq!(selection.pinned[0].output_path, "city_maps/Italy_Como.svg");
    }

    #[test]
    fn test_output_path_and_coordinates_carried() {
        let cities = vec![CityRecord::new("Peru", "Lima", -12.06, -77.04)];
        let selection = Selector::new(open_policy(1)).select(&cities, &[]).unwrap();
        let label = &selection.labels[0];
        assert_eq!(label.lat, -12.06);
        assert_eq!(label.lon, -77.04);
        assert_eq!(label.output_path, "city_maps/Peru_Lima.svg");
    }

    #[test]
    fn test_deterministic() {
        let cities: Vec<CityRecord> = (0..50)
            .map(|i| city(&format!("C{}", i % 7), &format!("city{}", i % 13)))
            .collect();
        let selector = Selector::new(open_policy(20));
        let first = selector.select(&cities, &[]).unwrap();
        let second = selector.select(&cities, &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_and_zero_target_are_errors() {
        let selector = Selector::new(open_policy(3));
        assert!(matches!(selector.select(&[], &[]), Err(LabelError::Config(_))));

        let zero = Selector::new(open_policy(0));
        assert!(zero.select(&[city("A", "a")], &[]).is_err());
    }
}
