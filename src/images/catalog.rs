//! Static city catalog
//!
//! Each city theme on the site maps to a fixed list of image search queries.

/// A city theme and the searches used to build its collage
#[derive(Debug, Clone, Copy)]
pub struct City {
    /// Key used in URLs and cache keys
    pub key: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Image search queries, in catalog order
    pub queries: &'static [&'static str],
}

/// Static array of all city themes
pub static CITIES: [City; 3] = [
    City {
        key: "baltimore",
        name: "Baltimore",
        queries: &[
            "Baltimore Inner Harbor",
            "Baltimore skyline",
            "Baltimore row houses",
            "Domino Sugars sign Baltimore",
            "Fells Point Baltimore",
            "Federal Hill Baltimore",
            "Fort McHenry",
            "Camden Yards",
            "Baltimore Power Plant",
            "Mount Vernon Baltimore",
            "Canton Baltimore waterfront",
            "Patterson Park pagoda",
            "Baltimore harbor sunset",
        ],
    },
    City {
        key: "dc",
        name: "DC",
        queries: &[
            "Washington Monument",
            "US Capitol building",
            "Lincoln Memorial",
            "Georgetown Washington DC",
            "Washington DC cherry blossoms",
            "Jefferson Memorial",
            "Washington DC Wharf",
            "Dupont Circle",
            "Library of Congress",
            "Washington DC skyline",
        ],
    },
    City {
        key: "chicago",
        name: "Chicago",
        queries: &[
            "Chicago skyline",
            "Cloud Gate Chicago",
            "Chicago Riverwalk",
            "Wrigley Field",
            "Chicago L train",
            "Navy Pier Chicago",
            "Chicago architecture",
            "Lake Michigan Chicago",
            "Buckingham Fountain",
            "Chicago at night",
        ],
    },
];

/// Returns all cities in catalog order
pub fn all_cities() -> &'static [City] {
    &CITIES
}

/// Get a city by its key
///
/// Returns `Some(&City)` if found, `None` otherwise.
pub fn get_city_by_key(key: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.key == key)
}

/// Resolves the search queries for a city key
///
/// An unknown key is used as the only query.
pub fn queries_for(key: &str) -> Vec<String> {
    match get_city_by_key(key) {
        Some(city) => city.queries.iter().map(|q| q.to_string()).collect(),
        None => vec![key.to_string()],
    }
}
