//! Identity and coercion helpers shared by the store, the engine and the
//! commands.

use chrono::Local;
use uuid::Uuid;

use crate::models::Entity;

// ---

/// Generate an identifier of the form `{prefix}_{8 hex chars}`.
///
/// Uniqueness is probabilistic only; the result is not checked against
/// existing ids.
pub fn gen_id(prefix: &str) -> String {
    // ---
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..8])
}

/// Parse free text as a floating point number, substituting `default` when the
/// text is not a finite number. Never fails.
pub fn parse_float(text: &str, default: f64) -> f64 {
    // ---
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Return the first item whose id equals `id`.
pub fn find_by_id<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    // ---
    items.iter().find(|item| item.id() == id)
}

/// Mutable variant of [`find_by_id`].
pub fn find_by_id_mut<'a, T: Entity>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    // ---
    items.iter_mut().find(|item| item.id() == id)
}
