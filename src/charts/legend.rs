//! Legend Module
//! Series lookup keys and per-series visibility toggled from the legend.

use std::collections::HashSet;

/// Prefix of the element id given to each series group.
pub const ELEMENT_ID_PREFIX: &str = "whip";

/// Strip everything but letters and digits from a series identifier.
pub fn sanitize_key(id: &str) -> String {
    id.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Hands out unique keys for series identifiers.
///
/// The first identifier keeps its sanitized form; later identifiers that
/// sanitize to the same key get `-2`, `-3`, ... appended. Sanitized keys never
/// contain `-`, so suffixed keys cannot collide with bare ones.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    used: HashSet<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, id: &str) -> String {
        let mut base = sanitize_key(id);
        if base.is_empty() {
            base = String::from("series");
        }

        let mut key = base.clone();
        let mut n = 2;
        while self.used.contains(&key) {
            key = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(key.clone());
        key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub id: String,
    pub key: String,
    pub visible: bool,
}

impl LegendEntry {
    pub fn element_id(&self) -> String {
        format!("{ELEMENT_ID_PREFIX}{}", self.key)
    }

    pub fn opacity(&self) -> f64 {
        if self.visible {
            1.0
        } else {
            0.0
        }
    }
}

/// Visibility of every series in one chart. All series start visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegendState {
    entries: Vec<LegendEntry>,
}

impl LegendState {
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys = KeyRegistry::new();
        let entries = ids
            .into_iter()
            .map(|id| LegendEntry {
                id: id.to_string(),
                key: keys.assign(id),
                visible: true,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&LegendEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entry_by_id(&self, id: &str) -> Option<&LegendEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.entry(key).map_or(false, |e| e.visible)
    }

    /// Flip a series' visibility, returning the new state.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.key == key)?;
        entry.visible = !entry.visible;
        Some(entry.visible)
    }

    /// Set visibility by series identifier.
    pub fn set_visible_by_id(&mut self, id: &str, visible: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_spaces_and_punctuation() {
        assert_eq!(sanitize_key("PDU 1/A.2"), "PDU1A2");
        assert_eq!(sanitize_key("rack-07_b"), "rack07b");
    }

    #[test]
    fn test_colliding_keys_are_disambiguated() {
        let mut keys = KeyRegistry::new();
        assert_eq!(keys.assign("A 1"), "A1");
        assert_eq!(keys.assign("A/1"), "A1-2");
        assert_eq!(keys.assign("A.1"), "A1-3");
        assert_eq!(keys.assign("A12"), "A12");
        assert_eq!(keys.assign("..."), "series");
        assert_eq!(keys.assign("//"), "series-2");
    }

    #[test]
    fn test_legend_keys_are_unique() {
        let legend = LegendState::new(["Whip 1", "Whip/1", "Whip 2"]);
        let keys: Vec<&str> = legend.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Whip1", "Whip1-2", "Whip2"]);
        assert_eq!(legend.entries()[1].element_id(), "whipWhip1-2");
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut legend = LegendState::new(["A 1", "B 2"]);
        let before = legend.clone();

        assert_eq!(legend.toggle("A1"), Some(false));
        assert_eq!(legend.entry("A1").unwrap().opacity(), 0.0);
        assert!(legend.is_visible("B2"));

        assert_eq!(legend.toggle("A1"), Some(true));
        assert_eq!(legend.entry("A1").unwrap().opacity(), 1.0);
        assert_eq!(legend, before);
    }

    #[test]
    fn test_toggle_unknown_key() {
        let mut legend = LegendState::new(["A"]);
        assert_eq!(legend.toggle("nope"), None);
        assert!(!legend.is_visible("nope"));
    }

    #[test]
    fn test_set_visible_by_id() {
        let mut legend = LegendState::new(["A 1"]);
        assert!(legend.set_visible_by_id("A 1", false));
        assert!(!legend.is_visible("A1"));
        assert!(!legend.set_visible_by_id("missing", false));
    }
}
