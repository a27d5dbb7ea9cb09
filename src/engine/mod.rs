//! Read-only query and aggregation engine over air quality records.
//!
//! Everything here is a pure, total function over in-memory slices: empty
//! input gives empty output, and no function returns an error. Records are
//! borrowed, never mutated.

use std::collections::HashMap;
use std::hash::Hash;

mod query;
mod report;

pub use query::{
    active_alerts_for_region, filter_by_date, filter_by_pollutant, filter_by_region,
    latest_for_region, latest_per_region,
};
pub use report::{average_aqi_by_region, monthly_trend};

// ---

/// Case-insensitive region comparison.
pub(crate) fn region_matches(region: &str, wanted: &str) -> bool {
    // ---
    region.to_lowercase() == wanted.to_lowercase()
}

/// Group values by key, keeping groups in first-encounter order.
pub(crate) fn group_in_encounter_order<K, V, I>(items: I) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, V)>,
{
    // ---
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();

    for (key, value) in items {
        match index.get(&key) {
            Some(&i) => groups[i].1.push(value),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![value]));
            }
        }
    }
    groups
}

/// Arithmetic mean of AQI values. Callers only pass non-empty groups.
pub(crate) fn mean(values: &[i64]) -> f64 {
    // ---
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}
