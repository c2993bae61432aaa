/*
 * filter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Input file selection.
 */

//! Input file selection.
//!
//! Import partials are left out of the bundle entirely; files from excluded
//! packages are bundled but skip the plugin chain.

use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_PARTIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.import\.css$|(?:^|/)imports/").expect("valid regex"));

/// Whether a stylesheet URL names an import partial.
///
/// Partials end in `.import.css` or live under an `imports/` directory; they
/// are only reachable through an explicit `@import`.
///
/// # Example
///
/// ```
/// use stylemerge_core::filter::is_import_partial;
///
/// assert!(is_import_partial("/client/theme.import.css"));
/// assert!(is_import_partial("imports/ui/button.css"));
/// assert!(!is_import_partial("/client/myimports/x.css"));
/// ```
pub fn is_import_partial(url: &str) -> bool {
    IMPORT_PARTIAL.is_match(url)
}

/// Packages whose stylesheets bypass the plugin chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedPackages {
    /// `packages/<name>` with `:` in the name replaced by `_`
    needles: Vec<String>,
}

impl ExcludedPackages {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = names
            .into_iter()
            .filter(|name| !name.as_ref().is_empty())
            .map(|name| format!("packages/{}", name.as_ref().replace(':', "_")))
            .collect();
        Self { needles }
    }

    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }

    /// Whether the file at `path_in_bundle` belongs to an excluded package
    pub fn contains(&self, path_in_bundle: &str) -> bool {
        self.needles
            .iter()
            .any(|needle| path_in_bundle.contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_partials() {
        assert!(is_import_partial("a.import.css"));
        assert!(is_import_partial("/imports/a.css"));
        assert!(is_import_partial("client/imports/deep/a.css"));
        assert!(!is_import_partial("a.import.css.map"));
        assert!(!is_import_partial("client/a.css"));
        assert!(!is_import_partial("client/notimports/a.css"));
    }

    #[test]
    fn test_excluded_packages_normalize_colons() {
        let excluded = ExcludedPackages::new(["foo:bar"]);
        assert!(excluded.contains("packages/foo_bar/client/style.css"));
        assert!(!excluded.contains("packages/foo:bar/client/style.css"));
        assert!(!excluded.contains("client/style.css"));
    }

    #[test]
    fn test_excluded_packages_match_anywhere_in_path() {
        let excluded = ExcludedPackages::new(["theme"]);
        assert!(excluded.contains("node_modules/packages/theme/a.css"));
        assert!(excluded.contains("packages/theme-extra/a.css"));
    }

    #[test]
    fn test_empty_names_are_ignored() {
        let excluded = ExcludedPackages::new([""]);
        assert!(excluded.is_empty());
        assert!(!excluded.contains("packages/a.css"));
    }
}
