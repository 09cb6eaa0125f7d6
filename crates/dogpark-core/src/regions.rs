use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::ConfigError;

/// A named search shortcut: selecting it centers the search on `latitude`/`longitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Region {
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
struct RegionsFile {
    regions: Vec<Region>,
}

/// Fixed, ordered lookup table of regions. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Builds a registry after validating names, identifiers and coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on a blank name or identifier, a
    /// duplicate identifier, or a center outside the lat/lng ranges.
    pub fn new(regions: Vec<Region>) -> Result<Self, ConfigError> {
        validate_regions(&regions)?;
        Ok(Self { regions })
    }

    /// The 21 Swedish counties (län).
    #[must_use]
    pub fn swedish_counties() -> Self {
        let regions = SWEDISH_COUNTIES
            .iter()
            .map(|&(name, identifier, latitude, longitude)| Region {
                name: name.to_string(),
                identifier: identifier.to_string(),
                latitude,
                longitude,
            })
            .collect();
        Self { regions }
    }

    /// Uses the YAML file at `path` when given, the Swedish counties otherwise.
    ///
    /// # Errors
    ///
    /// Propagates [`load_regions`] errors.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_regions(path),
            None => Ok(Self::swedish_counties()),
        }
    }

    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.identifier == identifier)
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::swedish_counties()
    }
}

/// Load and validate a region registry from a YAML file of the form
/// `regions: [{ name, identifier, latitude, longitude }, ...]`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_regions(path: &Path) -> Result<RegionRegistry, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_regions(&content)
}

fn parse_regions(content: &str) -> Result<RegionRegistry, ConfigError> {
    let file: RegionsFile = serde_yaml::from_str(content)?;
    RegionRegistry::new(file.regions)
}

fn validate_regions(regions: &[Region]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for region in regions {
        if region.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region name must be non-empty".to_string(),
            ));
        }

        if region.identifier.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "region '{}' has an empty identifier",
                region.name
            )));
        }

        if !region.center().is_valid() {
            return Err(ConfigError::Validation(format!(
                "region '{}' has invalid center {},{}",
                region.identifier, region.latitude, region.longitude
            )));
        }

        if !seen.insert(region.identifier.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region identifier: '{}'",
                region.identifier
            )));
        }
    }

    Ok(())
}

const SWEDISH_COUNTIES: &[(&str, &str, f64, f64)] = &[
    ("Stockholm", "stockholm", 59.329_3, 18.068_6),
    ("Uppsala", "uppsala", 59.858_6, 17.638_9),
    ("Södermanland", "sodermanland", 59.0, 17.0),
    ("Östergötland", "ostergotland", 58.41, 15.615),
    ("Jönköping", "jonkoping", 57.75, 14.466_7),
    ("Kronoberg", "kronoberg", 56.883_3, 14.666_7),
    ("Kalmar", "kalmar", 56.68, 16.333_3),
    ("Gotland", "gotland", 57.5, 18.5),
    ("Blekinge", "blekinge", 56.25, 15.333_3),
    ("Skåne", "skane", 55.833_3, 13.5),
    ("Halland", "halland", 56.833_3, 13.0),
    ("Västra Götaland", "vastra_gotaland", 58.0, 12.5),
    ("Värmland", "varmland", 59.666_7, 13.0),
    ("Örebro", "orebro", 59.274_1, 15.206_6),
    ("Västmanland", "vastmanland", 59.61, 16.546_7),
    ("Dalarna", "dalarna", 60.666_7, 15.0),
    ("Gävleborg", "gavleborg", 60.833_3, 17.0),
    ("Västernorrland", "vasternorrland", 62.632_5, 17.924_2),
    ("Jämtland", "jamtland", 63.5, 14.5),
    ("Västerbotten", "vasterbotten", 64.833_3, 18.0),
    ("Norrbotten", "norrbotten", 67.0, 20.0),
];

#[cfg(test)]
#[path = "regions_test.rs"]
mod tests;
