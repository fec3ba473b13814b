//! Maps provider-shaped JSON into [`AnalysisRecord`].
//!
//! This is the single place where missing fields get their defaults. The live
//! path feeds it Apify dataset items and the synthesizer feeds it objects it
//! generated, so both kinds of record come out with the same shape.

use crate::errors::ProviderError;
use crate::models::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2})(?::(\d{1,2}))?(?:\.\d+)?$").unwrap());
static HMS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2,}:[0-5]\d:[0-5]\d$").unwrap());

pub const ZERO_DURATION: &str = "00:00:00";

/// Normalizes a raw provider payload. Anything but a JSON object is malformed.
pub fn normalize_payload(fallback_name: &str, payload: &Value) -> Result<AnalysisRecord, ProviderError> {
    match payload {
        Value::Object(obj) => Ok(normalize_object(fallback_name, obj, RecordOrigin::Live)),
        other => Err(ProviderError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(other)
        ))),
    }
}

/// Infallible field-by-field mapping with defaults for everything absent.
pub fn normalize_object(
    fallback_name: &str,
    obj: &Map<String, Value>,
    origin: RecordOrigin,
) -> AnalysisRecord {
    let traffic_sources = traffic_sources(obj.get("trafficSources"));
    let total_visits = count(obj.get("totalVisits"));

    let organic_traffic = explicit_count(obj.get("organicTraffic")).unwrap_or_else(|| {
        apportion(total_visits, traffic_sources.organic_search_visits_share)
    });
    let paid_traffic = explicit_count(obj.get("paidTraffic")).unwrap_or_else(|| {
        apportion(
            total_visits,
            traffic_sources.paid_search_visits_share + traffic_sources.ads_visits_share,
        )
    });

    let gender_scale =
        percent_scale([obj.get("maleDistribution"), obj.get("femaleDistribution")]);

    AnalysisRecord {
        name: record_name(obj, fallback_name),
        global_rank: Rank::from_raw(number(obj.get("globalRank"))),
        country_rank: Rank::from_raw(number(obj.get("countryRank"))),
        category_rank: Rank::from_raw(number(obj.get("categoryRank"))),
        company_name: text(obj.get("companyName")).unwrap_or_default(),
        company_year_founded: count(obj.get("companyYearFounded")).min(u32::MAX as u64) as u32,
        company_employees_min: count(obj.get("companyEmployeesMin")),
        company_employees_max: count(obj.get("companyEmployeesMax")),
        total_visits,
        avg_visit_duration: duration(obj.get("avgVisitDuration")),
        pages_per_visit: number(obj.get("pagesPerVisit")).map_or(0.0, |v| v.max(0.0)),
        bounce_rate: share(obj.get("bounceRate"), percent_scale([obj.get("bounceRate")])),
        traffic_sources,
        top_countries: top_countries(obj.get("topCountries")),
        top_keywords: objects(obj.get("topKeywords"))
            .map(|k| TopKeyword {
                name: text(k.get("name")).unwrap_or_default(),
                volume: count(k.get("volume")),
                estimated_value: count(k.get("estimatedValue")),
                cpc: number(k.get("cpc")).map_or(0.0, |v| v.max(0.0)),
            })
            .collect(),
        social_network_distribution: social_networks(obj.get("socialNetworkDistribution")),
        top_similarity_competitors: competitors(obj.get("topSimilarityCompetitors")),
        age_distribution: age_buckets(obj.get("ageDistribution")),
        male_distribution: share(obj.get("maleDistribution"), gender_scale),
        female_distribution: share(obj.get("femaleDistribution"), gender_scale),
        organic_traffic,
        paid_traffic,
        origin,
    }
}

/// `organic = totalVisits × share`, with the share capped at 1.
pub fn apportion(total_visits: u64, share: f64) -> u64 {
    let share = if share.is_finite() { share.clamp(0.0, 1.0) } else { 0.0 };
    (total_visits as f64 * share).round() as u64
}

/// True for zero-padded `HH:MM:SS`.
pub fn is_hms(value: &str) -> bool {
    HMS_RE.is_match(value)
}

fn record_name(obj: &Map<String, Value>, fallback_name: &str) -> String {
    if let Some(name) = text(obj.get("name")) {
        return name;
    }
    // Similarweb item URLs look like https://www.similarweb.com/website/github.com
    text(obj.get("url"))
        .and_then(|url| {
            url.split("website/")
                .nth(1)
                .map(|rest| rest.trim_end_matches('/').replace("www.", ""))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_name.to_string())
}

const SOURCE_KEYS: [&str; 7] = [
    "directVisitsShare",
    "organicSearchVisitsShare",
    "referralVisitsShare",
    "socialNetworksVisitsShare",
    "mailVisitsShare",
    "paidSearchVisitsShare",
    "adsVisitsShare",
];

fn traffic_sources(value: Option<&Value>) -> TrafficSources {
    let Some(Value::Object(ts)) = value else {
        return TrafficSources::default();
    };
    let scale = percent_scale(SOURCE_KEYS.iter().map(|key| ts.get(*key)));
    let [direct, organic, referral, social, mail, paid, ads] =
        SOURCE_KEYS.map(|key| share(ts.get(key), scale));
    TrafficSources {
        direct_visits_share: direct,
        organic_search_visits_share: organic,
        referral_visits_share: referral,
        social_networks_visits_share: social,
        mail_visits_share: mail,
        paid_search_visits_share: paid,
        ads_visits_share: ads,
    }
}

fn top_countries(value: Option<&Value>) -> Vec<TopCountry> {
    let entries: Vec<_> = objects(value).collect();
    let share_scale = percent_scale(entries.iter().map(|c| c.get("visitsShare")));
    let change_scale = percent_scale(entries.iter().map(|c| c.get("visitsShareChange")));
    entries
        .into_iter()
        .map(|c| TopCountry {
            country_code: text(c.get("countryAlpha2Code"))
                .or_else(|| text(c.get("countryCode")))
                .unwrap_or_default(),
            visits_share: share(c.get("visitsShare"), share_scale),
            visits_share_change: share_change(c.get("visitsShareChange"), change_scale),
        })
        .collect()
}

fn social_networks(value: Option<&Value>) -> Vec<SocialNetworkShare> {
    let entries: Vec<_> = objects(value).collect();
    let scale = percent_scale(entries.iter().map(|s| s.get("visitsShare")));
    entries
        .into_iter()
        .map(|s| SocialNetworkShare {
            name: text(s.get("name")).unwrap_or_default(),
            visits_share: share(s.get("visitsShare"), scale),
        })
        .collect()
}

fn competitors(value: Option<&Value>) -> Vec<Competitor> {
    let entries: Vec<_> = objects(value).collect();
    let scale = percent_scale(entries.iter().map(|c| c.get("affinity")));
    entries
        .into_iter()
        .map(|c| Competitor {
            domain: text(c.get("domain")).unwrap_or_default(),
            visits_total_count: count(c.get("visitsTotalCount")),
            affinity: share(c.get("affinity"), scale),
            category_rank: Rank::from_raw(number(c.get("categoryRank"))),
        })
        .collect()
}

fn age_buckets(value: Option<&Value>) -> Vec<AgeBucket> {
    let entries: Vec<_> = objects(value).collect();
    let scale = percent_scale(entries.iter().map(|a| a.get("value")));
    entries
        .into_iter()
        .map(|a| AgeBucket {
            min_age: count(a.get("minAge")).min(u32::MAX as u64) as u32,
            max_age: count(a.get("maxAge")).min(u32::MAX as u64) as u32,
            value: share(a.get("value"), scale),
        })
        .collect()
}

fn objects<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Finite number from a JSON number or numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: Option<&Value>) -> u64 {
    explicit_count(value).unwrap_or(0)
}

fn explicit_count(value: Option<&Value>) -> Option<u64> {
    number(value).filter(|v| *v >= 0.0).map(|v| v.round() as u64)
}

/// Divisor for a group of sibling shares. Providers use one unit per group,
/// so a single member in (1, 100] marks the whole group as percentages.
fn percent_scale<'a>(values: impl IntoIterator<Item = Option<&'a Value>>) -> f64 {
    let percent = values
        .into_iter()
        .filter_map(number)
        .any(|v| v.abs() > 1.0 && v.abs() <= 100.0);
    if percent {
        100.0
    } else {
        1.0
    }
}

/// Fraction in [0, 1] after applying the group's `scale`.
fn share(value: Option<&Value>, scale: f64) -> f64 {
    number(value).map_or(0.0, |v| (v / scale).clamp(0.0, 1.0))
}

/// Signed fraction in [-1, 1]; same scaling as [`share`].
fn share_change(value: Option<&Value>, scale: f64) -> f64 {
    number(value).map_or(0.0, |v| (v / scale).clamp(-1.0, 1.0))
}

fn duration(value: Option<&Value>) -> String {
    let seconds = match value {
        Some(Value::String(s)) => clock_seconds(s.trim()).or_else(|| number(value)),
        other => number(other),
    };
    match seconds {
        Some(secs) if secs >= 0.0 => format_hms(secs.round() as u64),
        _ => ZERO_DURATION.to_string(),
    }
}

fn clock_seconds(clock: &str) -> Option<f64> {
    let caps = CLOCK_RE.captures(clock)?;
    let first: u64 = caps.get(1)?.as_str().parse().ok()?;
    let second: u64 = caps.get(2)?.as_str().parse().ok()?;
    // digit runs are unbounded; overflow falls through to the default
    let total = match caps.get(3) {
        Some(third) => {
            let seconds: u64 = third.as_str().parse().ok()?;
            first
                .checked_mul(3600)?
                .checked_add(second * 60)?
                .checked_add(seconds)?
        }
        None => first.checked_mul(60)?.checked_add(second)?,
    };
    Some(total as f64)
}

pub(crate) fn format_hms(total_seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
