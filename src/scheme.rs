use regex::Regex;
use semver::Version;

/// Strategy for deciding which of two version strings is newer.
///
/// `first` is the locally installed version and `second` the one reported by
/// the release API. Implementations return whichever argument is newer, or
/// `None` when the two cannot be compared under the scheme.
///
/// Any `fn(&str, &str) -> Option<&str>` is also a scheme:
///
/// ```
/// use update_checker::VersionScheme;
///
/// fn always_remote<'a>(_local: &'a str, remote: &'a str) -> Option<&'a str> {
///     Some(remote)
/// }
///
/// assert_eq!(always_remote.compare("1.0", "0.9"), Some("0.9"));
/// ```
pub trait VersionScheme: Send + Sync {
    /// Returns the newer of `first` and `second`, or `None` if incomparable.
    fn compare<'a>(&self, first: &'a str, second: &'a str) -> Option<&'a str>;
}

impl<F> VersionScheme for F
where
    F: for<'a> Fn(&'a str, &'a str) -> Option<&'a str> + Send + Sync,
{
    fn compare<'a>(&self, first: &'a str, second: &'a str) -> Option<&'a str> {
        self(first, second)
    }
}

/// Dot-separated numeric versions, e.g. `1.10.2`.
///
/// Only the first run of ASCII `digits(.digits)*` in each string is considered,
/// so `v1.2-SNAPSHOT` compares as `1.2`. Segments are compared pairwise as
/// `i32` (a segment beyond `i32::MAX` counts as 0); when all shared segments
/// are equal the version with more segments is newer, and a complete tie
/// returns `second`.
#[derive(Debug, Clone)]
pub struct DecimalScheme {
    pattern: Regex,
}

impl DecimalScheme {
    /// Creates the scheme, compiling its version pattern.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"[0-9]+(?:\.[0-9]+)*")
                .expect("decimal version pattern is valid"),
        }
    }

    fn segments(&self, version: &str) -> Option<Vec<i32>> {
        let run = self.pattern.find(version)?;
        Some(
            run.as_str()
                .split('.')
                .map(|segment| segment.parse().unwrap_or(0))
                .collect(),
        )
    }
}

impl Default for DecimalScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionScheme for DecimalScheme {
    fn compare<'a>(&self, first: &'a str, second: &'a str) -> Option<&'a str> {
        let first_split = self.segments(first)?;
        let second_split = self.segments(second)?;

        for (current, newest) in first_split.iter().zip(&second_split) {
            if newest > current {
                return Some(second);
            }
            if newest < current {
                return Some(first);
            }
        }

        if first_split.len() > second_split.len() {
            Some(first)
        } else {
            Some(second)
        }
    }
}

/// Semantic versioning precedence (build metadata ignored).
///
/// A leading `v` is stripped and partial versions are padded, so `v2` and
/// `2.0.0` compare equal. Equal precedence returns `second`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverScheme;

impl SemverScheme {
    fn parse(version: &str) -> Option<Version> {
        let trimmed = version.trim();
        let version = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

        // Pad only the numeric core, leaving any pre-release/build suffix intact.
        let core_end = version.find(['-', '+']).unwrap_or(version.len());
        let (core, suffix) = version.split_at(core_end);
        let normalized = match core.split('.').count() {
            1 => format!("{core}.0.0{suffix}"),
            2 => format!("{core}.0{suffix}"),
            _ => version.to_string(),
        };

        Version::parse(&normalized).ok()
    }
}

impl VersionScheme for SemverScheme {
    fn compare<'a>(&self, first: &'a str, second: &'a str) -> Option<&'a str> {
        let current = Self::parse(first)?;
        let newest = Self::parse(second)?;

        if current.cmp_precedence(&newest).is_gt() {
            Some(first)
        } else {
            Some(second)
        }
    }
}
