//! Searchable business picker
//!
//! Presents the catalog as `(id, label)` options and turns a raw selection
//! into the business the controller should inspect.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Business, Catalog};

/// One entry of the picker list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    pub value: String,
    pub label: String,
}

/// Event emitted whenever the picked entry changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChanged {
    Selected(String),
    Cleared,
}

pub struct LocationPicker {
    catalog: Arc<Catalog>,
    options: Vec<PickerOption>,
}

impl LocationPicker {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let options = catalog
            .iter()
            .map(|b| PickerOption {
                value: b.id.clone(),
                label: b.name.clone(),
            })
            .collect();
        Self { catalog, options }
    }

    /// All options in catalog order
    #[must_use]
    pub fn options(&self) -> &[PickerOption] {
        &self.options
    }

    /// Options whose label or id contains `query`, ignoring case
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&PickerOption> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.options.iter().collect();
        }
        self.options
            .iter()
            .filter(|o| {
                o.label.to_lowercase().contains(&needle) || o.value.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Catalog record for a selection; unknown ids count as cleared
    #[must_use]
    pub fn resolve(&self, selection: &SelectionChanged) -> Option<&Business> {
        match selection {
            SelectionChanged::Selected(id) => {
                let business = self.catalog.get(id);
                if business.is_none() {
                    debug!("Picker selection '{}' is not in the catalog", id);
                }
                business
            }
            SelectionChanged::Cleared => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn picker() -> LocationPicker {
        let catalog = Catalog::from_businesses(vec![
            Business::new("1", "Central Pharmacy").at(Coordinates::new(13.8267, 100.5750)),
            Business::new("2", "Riverside Clinic"),
            Business::new("13", "Pharma Chem Co."),
        ])
        .unwrap();
        LocationPicker::new(Arc::new(catalog))
    }

    #[test]
    fn test_options_follow_catalog_order() {
        let picker = picker();
        let labels: Vec<_> = picker.options().iter().map(|o| o.label.as_str()).collect();
        let expected = ["Central Pharmacy", "Riverside Clinic", "Pharma Chem Co."];
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let picker = picker();
        let hits = picker.search("  PHARM ");
        let ids: Vec<_> = hits.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(ids, ["1", "13"]);
    }

    #[test]
    fn test_search_matches_ids_and_empty_query() {
        let picker = picker();
        let hits = picker.search("3");
        let ids: Vec<_> = hits.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(ids, ["13"]);
        assert_eq!(picker.search("").len(), 3);
        assert!(picker.search("bakery").is_empty());
    }

    #[test]
    fn test_resolve_selection() {
        let picker = picker();
        let business = picker
            .resolve(&SelectionChanged::Selected("2".to_string()))
            .unwrap();
        assert_eq!(business.name, "Riverside Clinic");

        assert!(picker.resolve(&SelectionChanged::Cleared).is_none());
        let unknown = SelectionChanged::Selected("99".to_string());
        assert!(picker.resolve(&unknown).is_none());
    }
}
