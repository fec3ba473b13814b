//! Substitute analysis data for when the live provider is unavailable.
//!
//! Values are derived from SHA-256 digests of the domain, so a domain always
//! gets the same record, and every record passes through the same
//! normalisation as live data.

use crate::models::{AnalysisRecord, RecordOrigin};
use crate::normalize::normalize_object;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

const COUNTRY_POOL: [&str; 10] = ["US", "IN", "GB", "DE", "BR", "CA", "FR", "JP", "CN", "AU"];
const SOCIAL_POOL: [&str; 6] = ["YouTube", "Facebook", "LinkedIn", "Reddit", "Twitter", "Instagram"];
const EMPLOYEE_TIERS: [u64; 7] = [10, 50, 200, 1_000, 5_000, 10_000, 50_000];
const AGE_BUCKETS: [(u32, u32); 6] = [(18, 24), (25, 34), (35, 44), (45, 54), (55, 64), (65, 0)];

/// Builds a fully populated record for `domain`. Never fails; the input is
/// used verbatim as the record name.
pub fn synthesize(domain: &str) -> AnalysisRecord {
    let payload = synthetic_payload(domain);
    normalize_object(domain, &payload, RecordOrigin::Synthesized)
}

/// Deterministic pseudo-random draws keyed by field label.
struct Seeded<'a> {
    domain: &'a str,
}

impl Seeded<'_> {
    fn raw(&self, label: &str) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.domain.as_bytes());
        hasher.update([0u8]);
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }

    /// Uniform in [0, 1).
    fn unit(&self, label: &str) -> f64 {
        (self.raw(label) >> 11) as f64 / (1u64 << 53) as f64
    }

    fn between(&self, label: &str, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit(label)
    }

    /// Uniform integer in [lo, hi].
    fn int(&self, label: &str, lo: u64, hi: u64) -> u64 {
        lo + self.raw(label) % (hi - lo + 1)
    }

    /// `n` positive weights scaled to sum to `total`, largest first.
    fn weights(&self, label: &str, n: usize, total: f64) -> Vec<f64> {
        let raw: Vec<f64> = (0..n)
            .map(|i| 0.05 + self.unit(&format!("{label}:{i}")))
            .collect();
        let sum: f64 = raw.iter().sum();
        let mut scaled: Vec<f64> = raw.iter().map(|w| round4(w / sum * total)).collect();
        scaled.sort_by(|a, b| b.total_cmp(a));
        scaled
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Lowercase first label of the host, e.g. `github` for `https://www.github.com`.
fn brand_of(domain: &str) -> String {
    let lowered = domain.trim().to_ascii_lowercase();
    let host = lowered
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let brand: String = host
        .split(|c: char| c == '.' || c == '/')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if brand.is_empty() {
        "site".to_string()
    } else {
        brand
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn synthetic_payload(domain: &str) -> Map<String, Value> {
    let seed = Seeded { domain };
    let brand = brand_of(domain);

    let global_rank = seed.int("globalRank", 1, 1_000_000);
    let tier = seed.int("employees", 0, (EMPLOYEE_TIERS.len() - 2) as u64) as usize;
    // log-uniform between 10k and ~2.5B monthly visits
    let total_visits = 10f64.powf(seed.between("totalVisits", 4.0, 9.4)).round() as u64;

    let sources = seed.weights("trafficSources", 7, 1.0);
    let country_offset = seed.int("countryOffset", 0, COUNTRY_POOL.len() as u64 - 1) as usize;
    let country_shares = seed.weights("countryShares", 5, seed.between("countryTotal", 0.6, 0.9));
    let top_countries: Vec<Value> = country_shares
        .iter()
        .enumerate()
        .map(|(i, share)| {
            json!({
                "countryAlpha2Code": COUNTRY_POOL[(country_offset + i) % COUNTRY_POOL.len()],
                "visitsShare": share,
                "visitsShareChange": round4(seed.between(&format!("countryChange:{i}"), -0.1, 0.1)),
            })
        })
        .collect();

    let keyword_names = [
        brand.clone(),
        format!("{brand} login"),
        format!("{brand} app"),
        format!("{brand} pricing"),
        format!("{brand} alternatives"),
    ];
    let mut keyword_volume = seed.int("keywordVolume", 50_000, 50_000_000);
    let top_keywords: Vec<Value> = keyword_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let volume = keyword_volume;
            keyword_volume = (keyword_volume as f64 * seed.between(&format!("kwDecay:{i}"), 0.3, 0.8)) as u64;
            let cpc = round2(seed.between(&format!("kwCpc:{i}"), 0.2, 5.0));
            json!({
                "name": name,
                "volume": volume,
                "estimatedValue": (volume as f64 * cpc * 0.35).round() as u64,
                "cpc": cpc,
            })
        })
        .collect();

    let social_offset = seed.int("socialOffset", 0, SOCIAL_POOL.len() as u64 - 1) as usize;
    let social: Vec<Value> = seed
        .weights("socialShares", 4, 1.0)
        .iter()
        .enumerate()
        .map(|(i, share)| {
            json!({
                "name": SOCIAL_POOL[(social_offset + i) % SOCIAL_POOL.len()],
                "visitsShare": share,
            })
        })
        .collect();

    let competitor_domains = [
        format!("{brand}hub.com"),
        format!("get{brand}.com"),
        format!("{brand}ly.io"),
        format!("{brand}-alternative.com"),
    ];
    let mut affinity = seed.between("affinity", 0.7, 0.95);
    let competitors: Vec<Value> = competitor_domains
        .iter()
        .enumerate()
        .map(|(i, competitor)| {
            let entry = json!({
                "domain": competitor,
                "visitsTotalCount": (total_visits as f64 * seed.between(&format!("compVisits:{i}"), 0.05, 1.5)).round() as u64,
                "affinity": round2(affinity),
                "categoryRank": seed.int(&format!("compRank:{i}"), 1, 5_000),
            });
            affinity *= 0.9;
            entry
        })
        .collect();

    let ages: Vec<Value> = seed
        .weights("ages", AGE_BUCKETS.len(), 1.0)
        .iter()
        .zip(AGE_BUCKETS)
        .map(|(value, (min_age, max_age))| {
            json!({"minAge": min_age, "maxAge": max_age, "value": value})
        })
        .collect();
    let male = round4(seed.between("male", 0.4, 0.65));

    let payload = json!({
        "globalRank": global_rank,
        "countryRank": seed.int("countryRank", 1, global_rank.max(1)),
        "categoryRank": seed.int("categoryRank", 1, 5_000),
        "companyName": format!("{} Inc.", capitalize(&brand)),
        "companyYearFounded": seed.int("founded", 1995, 2020),
        "companyEmployeesMin": EMPLOYEE_TIERS[tier],
        "companyEmployeesMax": EMPLOYEE_TIERS[tier + 1],
        "totalVisits": total_visits,
        "avgVisitDuration": seed.int("duration", 30, 900),
        "pagesPerVisit": round2(seed.between("pagesPerVisit", 1.2, 8.0)),
        "bounceRate": round4(seed.between("bounceRate", 0.25, 0.75)),
        "trafficSources": {
            "directVisitsShare": sources[0],
            "organicSearchVisitsShare": sources[1],
            "referralVisitsShare": sources[2],
            "socialNetworksVisitsShare": sources[3],
            "mailVisitsShare": sources[4],
            "paidSearchVisitsShare": sources[5],
            "adsVisitsShare": sources[6],
        },
        "topCountries": top_countries,
        "topKeywords": top_keywords,
        "socialNetworkDistribution": social,
        "topSimilarityCompetitors": competitors,
        "ageDistribution": ages,
        "maleDistribution": male,
        "femaleDistribution": round4(1.0 - male),
    });

    match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
