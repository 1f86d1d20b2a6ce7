//! Image reference resolution.
//!
//! Product images come back from the API in whatever shape the upload path
//! happened to store: absolute URLs, `/uploads/...` paths, bare relative paths,
//! inline `data:image/...` payloads, JSON-encoded arrays of any of those, and a
//! handful of corrupted schemes. [`ImageResolver::resolve`] turns all of them
//! into a [`ResolvedImage`].
//!
//! # Resolution Order
//!
//! First match wins:
//!
//! 1. `[...]` is parsed as a JSON array and its first element is used
//! 2. Known typos are substituted from the [`TypoTable`]
//! 3. `data:image/` payloads are returned verbatim as [`ResolvedImage::Inline`]
//! 4. `http://` and `https://` URLs are returned verbatim
//! 5. `/uploads/...` paths are appended to the API base URL
//! 6. Anything else is joined to the API base URL with a single slash
//!
//! Absent, empty, `"null"` and `"undefined"` values resolve to
//! [`ResolvedImage::Unresolved`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

const INLINE_PREFIX: &str = "data:image/";
const UPLOADS_PREFIX: &str = "/uploads/";

/// Corrupted fragments observed in stored image references, paired with their
/// repaired form. Applied in order.
const DEFAULT_TYPO_FIXES: &[(&str, &str)] = &[
    ("http://https://", "https://"),
    ("http://http://", "http://"),
    ("https//", "https://"),
    ("http//", "http://"),
    ("htttp://", "http://"),
    (":3000uploads/", ":3000/uploads/"),
    ("\\", "/"),
    ("/uploads//", "/uploads/"),
];

/// The outcome of resolving an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedImage {
    /// A fetchable absolute URL.
    Absolute(String),
    /// An inline `data:image/...` payload.
    Inline(String),
    /// No usable reference; render a placeholder.
    #[default]
    Unresolved,
}

impl ResolvedImage {
    /// The displayable source, or `None` when a placeholder should be shown.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Absolute(url) | Self::Inline(url) => Some(url),
            Self::Unresolved => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A single substring replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoFix {
    pub from: String,
    pub to: String,
}

/// Ordered table of known corrupted fragments.
///
/// This is configuration, not sanitization: only the listed fragments are
/// touched. Load a replacement table from YAML with [`TypoTable::from_yaml`]:
///
/// ```yaml
/// - from: "http//"
///   to: "http://"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypoTable(Vec<TypoFix>);

impl TypoTable {
    /// A table with no substitutions.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a table from explicit fixes.
    #[must_use]
    pub const fn new(fixes: Vec<TypoFix>) -> Self {
        Self(fixes)
    }

    /// Parse a table from a YAML sequence of `{ from, to }` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or has the wrong shape.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[must_use]
    pub fn fixes(&self) -> &[TypoFix] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let mut fixed = Cow::Borrowed(value);
        for fix in self.0.iter().filter(|fix| !fix.from.is_empty()) {
            if fixed.contains(fix.from.as_str()) {
                fixed = Cow::Owned(fixed.replace(fix.from.as_str(), &fix.to));
            }
        }
        fixed
    }
}

impl Default for TypoTable {
    fn default() -> Self {
        Self(
            DEFAULT_TYPO_FIXES
                .iter()
                .map(|(from, to)| TypoFix {
                    from: (*from).to_string(),
                    to: (*to).to_string(),
                })
                .collect(),
        )
    }
}

/// Resolves raw image references against the API base URL.
///
/// Resolution is a pure function of the raw value, the base URL and the typo
/// table: no I/O and no caching.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    typo_table: TypoTable,
}

impl ImageResolver {
    /// Create a resolver with the default typo table.
    ///
    /// Trailing slashes on `base_url` are dropped.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            typo_table: TypoTable::default(),
        }
    }

    /// Replace the typo table.
    #[must_use]
    pub fn with_typo_table(mut self, typo_table: TypoTable) -> Self {
        self.typo_table = typo_table;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn typo_table(&self) -> &TypoTable {
        &self.typo_table
    }

    /// Resolve a single raw reference.
    ///
    /// ```
    /// use vetmart_checkout::image::{ImageResolver, ResolvedImage};
    ///
    /// let resolver = ImageResolver::new("http://h:3000");
    /// assert_eq!(
    ///     resolver.resolve(Some(r#"["/uploads/x.png"]"#)),
    ///     ResolvedImage::Absolute("http://h:3000/uploads/x.png".to_string())
    /// );
    /// assert_eq!(resolver.resolve(None), ResolvedImage::Unresolved);
    /// ```
    #[must_use]
    pub fn resolve(&self, raw: Option<&str>) -> ResolvedImage {
        let Some(raw) = raw.map(str::trim).filter(|raw| !is_absent(raw)) else {
            return ResolvedImage::Unresolved;
        };

        let value = if raw.starts_with('[') {
            match first_array_element(raw) {
                Some(first) => Cow::Owned(first),
                None => return ResolvedImage::Unresolved,
            }
        } else {
            Cow::Borrowed(raw)
        };

        let value = value.trim();
        if is_absent(value) {
            return ResolvedImage::Unresolved;
        }

        let fixed = self.typo_table.apply(value);
        if fixed.starts_with(INLINE_PREFIX) {
            return ResolvedImage::Inline(fixed.into_owned());
        }
        if fixed.starts_with("http://") || fixed.starts_with("https://") {
            return ResolvedImage::Absolute(fixed.into_owned());
        }
        if fixed.starts_with(UPLOADS_PREFIX) {
            return ResolvedImage::Absolute(format!("{}{fixed}", self.base_url));
        }
        ResolvedImage::Absolute(format!(
            "{}/{}",
            self.base_url,
            fixed.trim_start_matches('/')
        ))
    }

    /// Resolve the first usable reference in a list.
    ///
    /// Catalog entries carry several images; cards and cart lines show the
    /// first one that resolves.
    #[must_use]
    pub fn resolve_first<S: AsRef<str>>(&self, refs: &[S]) -> ResolvedImage {
        refs.iter()
            .map(|raw| self.resolve(Some(raw.as_ref())))
            .find(ResolvedImage::is_resolved)
            .unwrap_or_default()
    }
}

fn is_absent(value: &str) -> bool {
    value.is_empty() || value == "null" || value == "undefined"
}

fn first_array_element(raw: &str) -> Option<String> {
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => match values.into_iter().next() {
            Some(serde_json::Value::String(first)) => Some(first),
            other => {
                debug!(first = ?other, "Image array has no string first element");
                None
            }
        },
        Err(e) => {
            debug!(error = %e, "Image reference is not a valid JSON array");
            None
        }
    }
}
