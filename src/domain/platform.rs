//! Platform tagging for tracking links based on the destination host.

use url::Url;

/// Platform tag used when no known marketplace matches.
pub const OTHER_PLATFORM: &str = "other";

/// Known platforms and the host fragments that identify them.
const PLATFORM_HOST_MARKERS: &[(&str, &[&str])] =
    &[("amazon", &["amazon", "amzn"]), ("temu", &["temu"])];

/// Detects the platform tag from a destination URL's hostname.
///
/// Unparseable URLs and unknown hosts map to [`OTHER_PLATFORM`].
pub fn detect_platform(destination: &str) -> &'static str {
    let Some(host) = Url::parse(destination)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return OTHER_PLATFORM;
    };

    PLATFORM_HOST_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| host.contains(m)))
        .map(|(platform, _)| *platform)
        .unwrap_or(OTHER_PLATFORM)
}
