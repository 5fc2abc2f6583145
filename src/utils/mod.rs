use chrono::{DateTime, NaiveDate, NaiveDateTime};
use url::Url;

use crate::ProviderError;

/// Canonical watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// YouTube ids are 11 characters from the URL-safe base64 alphabet
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Normalize a command line argument to a bare video id.
///
/// Accepts a bare id or any of the common YouTube URL shapes
/// (`watch?v=`, `youtu.be/`, `shorts/`, `embed/`, `live/`, `v/`).
pub fn normalize_video_id(input: &str) -> Result<String, ProviderError> {
    let input = input.trim();

    if is_valid_video_id(input) {
        return Ok(input.to_string());
    }

    let candidate = if input.contains("://") {
        Url::parse(input).ok().and_then(|url| id_from_url(&url))
    } else if input.starts_with("youtu") || input.starts_with("www.") || input.starts_with("m.") {
        Url::parse(&format!("https://{}", input))
            .ok()
            .and_then(|url| id_from_url(&url))
    } else {
        None
    };

    candidate
        .filter(|id| is_valid_video_id(id))
        .ok_or_else(|| ProviderError::InvalidVideoId(input.to_string()))
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(host.as_str());
    let host = host.strip_prefix("m.").unwrap_or(host);

    if host == "youtu.be" {
        return url
            .path_segments()?
            .next()
            .map(|s| s.to_string());
    }

    if host != "youtube.com" && host != "music.youtube.com" && host != "youtube-nocookie.com" {
        return None;
    }

    let mut segments = url.path_segments()?;
    match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "shorts" | "embed" | "live" | "v" => segments.next().map(|s| s.to_string()),
        _ => None,
    }
}

/// Normalize an upstream publish date to `YYYY-MM-DD HH:MM:SS`.
///
/// Accepts RFC 3339 timestamps and plain dates. Anything else is
/// returned unchanged; `None` or empty input becomes an empty string.
pub fn normalize_publish_date(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return String::new(),
    };

    let parsed: Option<NaiveDateTime> = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    match parsed {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

/// Parse an ISO-8601 duration such as `PT1H2M3S` or `P1DT2S` into seconds
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut total = 0u64;
    let mut seen = false;

    let date_units: &[(char, u64)] = &[('W', 604_800), ('D', 86_400)];
    let time_units: &[(char, u64)] = &[('H', 3_600), ('M', 60), ('S', 1)];

    for (part, units) in [(date_part, date_units), (time_part, time_units)] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let factor = units.iter().find(|(unit, _)| *unit == c)?.1;
            let value: f64 = number.parse().ok()?;
            let seconds = value * factor as f64;
            // `as u64` saturates, so reject anything it cannot represent
            if !seconds.is_finite() || seconds < 0.0 || seconds >= u64::MAX as f64 {
                return None;
            }
            total = total.checked_add(seconds as u64)?;
            number.clear();
            seen = true;
        }
        if !number.is_empty() {
            return None;
        }
    }

    seen.then_some(total)
}

/// Parse a non-negative integer that upstream may send as a JSON string or number
pub fn parse_count(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
