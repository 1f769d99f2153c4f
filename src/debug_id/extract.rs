//! Debug id extraction from bundle text.

use regex::Regex;
use std::sync::LazyLock;

/// Marker left in the bundle by the build step that injected the debug id.
static DEBUG_ID_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"sentry-dbid-([0-9a-fA-F]{8}\b-[0-9a-fA-F]{4}\b-[0-9a-fA-F]{4}\b-[0-9a-fA-F]{4}\b-[0-9a-fA-F]{12}\b)",
    )
    .unwrap()
});

/// Returns the uuid following the first `sentry-dbid-` marker in `source`.
///
/// The id is returned exactly as written (case preserved). `None` is a normal
/// outcome for bundles built without the marker injection step.
pub fn debug_id_from_source(source: &str) -> Option<&str> {
    DEBUG_ID_MARKER
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
