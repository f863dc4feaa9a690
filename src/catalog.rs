//! Static business catalog
//!
//! The catalog is read once at startup and never changes afterwards. Entries
//! keep the storage shape of the store list: coordinates are decimal strings
//! and either may be missing, in which case the business location is unknown
//! until someone checks in there.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::Result;
use crate::error::StoreCheckError;
use crate::geo::Coordinates;

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

/// A visitable location of interest
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub note: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// `None` means the location is unknown and pending a check-in
    pub coordinates: Option<Coordinates>,
}

impl Business {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            note: String::new(),
            address: None,
            phone: None,
            coordinates: None,
        }
    }

    #[must_use]
    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// On-disk shape of a catalog entry
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    #[serde(default)]
    note: String,
    address: Option<String>,
    phone: Option<String>,
    lat: Option<String>,
    long: Option<String>,
}

impl TryFrom<CatalogEntry> for Business {
    type Error = StoreCheckError;

    fn try_from(entry: CatalogEntry) -> Result<Self> {
        let coordinates = match (non_blank(entry.lat), non_blank(entry.long)) {
            (Some(lat), Some(lon)) => Some(parse_coordinates(&entry.id, &lat, &lon)?),
            _ => None,
        };

        Ok(Business {
            id: entry.id,
            name: entry.name,
            note: entry.note,
            address: non_blank(entry.address),
            phone: non_blank(entry.phone),
            coordinates,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_coordinates(id: &str, lat: &str, lon: &str) -> Result<Coordinates> {
    let parse = |raw: &str, axis: &str| {
        let Ok(value) = raw.trim().parse::<f64>() else {
            let message = format!("business '{id}' has an invalid {axis} '{raw}'");
            return Err(StoreCheckError::catalog(message));
        };
        Ok(value)
    };
    let coordinates = Coordinates::new(parse(lat, "latitude")?, parse(lon, "longitude")?);
    if !coordinates.is_valid() {
        let message = format!("business '{id}' has out-of-range coordinates {lat}, {lon}");
        return Err(StoreCheckError::catalog(message));
    }
    Ok(coordinates)
}

/// Read-only list of every known business
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    businesses: Vec<Business>,
}

impl Catalog {
    /// The store list compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        let count = catalog.len();
        info!("Loaded {count} businesses from {}", path.display());
        Ok(catalog)
    }

    /// Parse a JSON array of catalog entries
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(raw)
            .map_err(|e| StoreCheckError::catalog(format!("malformed catalog: {e}")))?;

        let businesses = entries
            .into_iter()
            .map(Business::try_from)
            .collect::<Result<Vec<_>>>()?;

        Self::from_businesses(businesses)
    }

    /// Build a catalog from already-typed records
    pub fn from_businesses(businesses: Vec<Business>) -> Result<Self> {
        let mut seen = HashSet::new();
        for business in &businesses {
            if business.id.trim().is_empty() {
                return Err(StoreCheckError::catalog("business with an empty id"));
            }
            if !seen.insert(business.id.as_str()) {
                let message = format!("duplicate business id '{}'", business.id);
                return Err(StoreCheckError::catalog(message));
            }
        }
        debug!("Catalog holds {} businesses", businesses.len());
        Ok(Self { businesses })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Business> {
        self.businesses.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Business> {
        self.businesses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }
}
