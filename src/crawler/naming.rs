//! Facility directory names and collision-free document filenames

use std::collections::HashMap;

/// Makes a facility name safe to use as a directory name
///
/// `/` and `:` become `-` and `"` is removed.
pub fn sanitize_home(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"')
        .map(|c| if c == '/' || c == ':' { '-' } else { c })
        .collect()
}

/// Makes a document title usable as a single path component
///
/// Like [`sanitize_home`], with `\` also mapped to `-` and leading dots
/// dropped. The result never leaves the facility directory.
pub fn sanitize_title(title: &str) -> String {
    let mapped: String = title
        .chars()
        .filter(|c| *c != '"' && *c != '\0')
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    mapped.trim_start_matches('.').to_string()
}

/// Filename for the `instance`-th document titled `title`
///
/// The first one keeps the bare (sanitized) title, later ones get `-<instance>`.
pub fn document_filename(title: &str, instance: u32, extension: &str) -> String {
    let stem = sanitize_title(title);
    if instance == 0 {
        format!("{}.{}", stem, extension)
    } else {
        format!("{}-{}.{}", stem, instance, extension)
    }
}

/// Counts documents already seen this run per (home, title)
#[derive(Debug, Default)]
pub struct InstanceCounter {
    seen: HashMap<(String, String), u32>,
}

impl InstanceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents already recorded under `home` with `title`
    pub fn instance_of(&self, home: &str, title: &str) -> u32 {
        self.seen
            .get(&(home.to_string(), title.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Counts one more document under `(home, title)`
    pub fn count(&mut self, home: &str, title: &str) {
        *self
            .seen
            .entry((home.to_string(), title.to_string()))
            .or_insert(0) += 1;
    }
}
