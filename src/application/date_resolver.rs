use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;

pub type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A UTC instant plus how much we trust it. `Resolved` means the source
/// carried enough timezone information to pin the instant down; `Fallback`
/// means a documented last-resort interpretation was applied (naive string
/// read as UTC, or "now" for unparseable input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInstant {
    Resolved(DateTime<Utc>),
    Fallback(DateTime<Utc>),
}

impl ResolvedInstant {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            ResolvedInstant::Resolved(instant) | ResolvedInstant::Fallback(instant) => *instant,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolvedInstant::Fallback(_))
    }
}

/// Turns location-local timestamps into UTC instants.
///
/// The airport table is injected as an immutable mapping so tests can
/// substitute fixtures and data updates never touch call sites. Resolution
/// never fails: the chain bottoms out at "treat as UTC" and finally "now".
pub struct DateResolver {
    airport_zones: HashMap<String, Tz>,
    now_provider: NowProvider,
}

impl DateResolver {
    pub fn new(airport_zones: HashMap<String, Tz>) -> Self {
        Self {
            airport_zones,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now_provider)()
    }

    /// Resolve a location-local timestamp to a UTC instant.
    ///
    /// Priority order: a definitive UTC marker inside the string (zulu
    /// suffix or numeric offset), then the explicit signed `HH:MM` offset,
    /// then the location-code timezone lookup, then the naive string read
    /// as UTC, and for unparseable input the current instant.
    pub fn resolve_utc(
        &self,
        local_timestamp: &str,
        explicit_offset: Option<&str>,
        location_code: Option<&str>,
    ) -> ResolvedInstant {
        let normalized = normalize_timestamp(local_timestamp);

        if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
            return ResolvedInstant::Resolved(parsed.with_timezone(&Utc));
        }

        let Some(naive) = parse_naive(&normalized) else {
            return ResolvedInstant::Fallback(self.now());
        };

        if let Some(minutes) = explicit_offset.and_then(parse_offset_minutes) {
            let instant = Utc.from_utc_datetime(&(naive - Duration::minutes(i64::from(minutes))));
            return ResolvedInstant::Resolved(instant);
        }

        if let Some(zone) = location_code.and_then(|code| self.zone_for(code)) {
            // Earliest mapping on DST-ambiguous wall times; for wall times
            // inside a spring-forward gap fall back to the zone's offset at
            // that instant read as UTC.
            if let Some(local) = zone.from_local_datetime(&naive).earliest() {
                return ResolvedInstant::Resolved(local.with_timezone(&Utc));
            }
            let offset_seconds = zone.offset_from_utc_datetime(&naive).fix().local_minus_utc();
            let instant =
                Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset_seconds))));
            return ResolvedInstant::Resolved(instant);
        }

        ResolvedInstant::Fallback(Utc.from_utc_datetime(&naive))
    }

    /// The UTC-offset minutes in effect for a reservation's location at the
    /// given instant, or `None` when no timezone can be resolved.
    pub fn offset_minutes(
        &self,
        explicit_offset: Option<&str>,
        location_code: Option<&str>,
        at: DateTime<Utc>,
    ) -> Option<i32> {
        if let Some(minutes) = explicit_offset.and_then(parse_offset_minutes) {
            return Some(minutes);
        }
        let zone = location_code.and_then(|code| self.zone_for(code))?;
        Some(at.with_timezone(&zone).offset().fix().local_minus_utc() / 60)
    }

    fn zone_for(&self, code: &str) -> Option<Tz> {
        self.airport_zones
            .get(&code.trim().to_ascii_uppercase())
            .copied()
    }
}

/// Wall-clock reading of a location-local timestamp, never its UTC form.
/// Strings carrying their own offset contribute their local wall clock.
pub fn local_datetime(local_timestamp: &str) -> Option<NaiveDateTime> {
    let normalized = normalize_timestamp(local_timestamp);
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.naive_local());
    }
    parse_naive(&normalized)
}

/// Calendar-date portion of a location-local timestamp.
pub fn local_date(local_timestamp: &str) -> Option<NaiveDate> {
    local_datetime(local_timestamp).map(|naive| naive.date())
}

/// Parse a signed `HH:MM` UTC-offset string into minutes. Malformed input
/// yields `None` so the resolution chain can continue to the next priority.
pub fn parse_offset_minutes(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else {
        return None;
    };

    let mut split = rest.split(':');
    let (Some(hour_str), Some(minute_str), None) = (split.next(), split.next(), split.next())
    else {
        return None;
    };
    let hours = hour_str.parse::<i32>().ok()?;
    let minutes = minute_str.parse::<i32>().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Tolerate the malformations seen in real itinerary data: surrounding
/// whitespace, a space instead of the `T` separator, and sub-second digits
/// past microsecond precision.
fn normalize_timestamp(value: &str) -> String {
    let mut normalized = value.trim().replacen(' ', "T", 1);
    normalized.retain(|c| c != ' ');

    if let Some(dot) = normalized.find('.') {
        let fraction_start = dot + 1;
        let fraction_len = normalized[fraction_start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count();
        if fraction_len > 6 {
            normalized.replace_range(fraction_start + 6..fraction_start + fraction_len, "");
        }
    }
    normalized
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
