//! Station search filters and facet extraction.

use std::collections::BTreeSet;

use crate::protocol::Station;

/// Filters sent to the search endpoint. Each field may hold several values;
/// the server ORs values within a field and ANDs across fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub countries: Vec<String>,
    pub states: Vec<String>,
    pub tags: Vec<String>,
}

impl SearchQuery {
    /// Split a free-text filter field ("France, Belgium") into values.
    pub fn parse_field(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn from_fields(country: &str, state: &str, tag: &str) -> Self {
        Self {
            countries: Self::parse_field(country),
            states: Self::parse_field(state),
            tags: Self::parse_field(tag),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.states.is_empty() && self.tags.is_empty()
    }

    /// Query-string pairs; blank values are never sent.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("country", &self.countries),
            ("state", &self.states),
            ("tag", &self.tags),
        ];
        fields
            .into_iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(move |v| (key, v.to_string()))
            })
            .collect()
    }

    /// Short human description, e.g. `country=France tag=jazz`.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "all stations".to_string();
        }
        self.to_params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Distinct filter values present in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub countries: Vec<String>,
    pub states: Vec<String>,
    pub tags: Vec<String>,
}

impl Facets {
    pub fn from_stations(stations: &[Station]) -> Self {
        let mut countries = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut tags = BTreeSet::new();

        for s in stations {
            if !s.country.trim().is_empty() {
                countries.insert(s.country.trim().to_string());
            }
            if !s.state.trim().is_empty() {
                states.insert(s.state.trim().to_string());
            }
            for tag in s.tag_list() {
                tags.insert(tag.to_string());
            }
        }

        Self {
            countries: countries.into_iter().collect(),
            states: states.into_iter().collect(),
            tags: tags.into_iter().collect(),
        }
    }
}
