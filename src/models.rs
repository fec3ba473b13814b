use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============ Canonical Analysis Record ============

/// Ranking position, or the `"unknown"` sentinel when the provider has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rank {
    /// 1-based position.
    Position(u64),
    #[default]
    Unknown,
}

impl Rank {
    /// Builds a rank from a raw provider number; non-positive values are unknown.
    pub fn from_raw(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() && v >= 1.0 => Rank::Position(v.round() as u64),
            _ => Rank::Unknown,
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rank::Position(n) => serializer.serialize_u64(*n),
            Rank::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRank {
            Number(u64),
            Text(String),
        }

        match RawRank::deserialize(deserializer)? {
            RawRank::Number(0) => Ok(Rank::Unknown),
            RawRank::Number(n) => Ok(Rank::Position(n)),
            RawRank::Text(s) if s == "unknown" => Ok(Rank::Unknown),
            RawRank::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid rank '{}', expected positive integer or \"unknown\"",
                s
            ))),
        }
    }
}

/// Where a record's values came from. Internal only, never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrigin {
    Live,
    #[default]
    Synthesized,
}

/// Traffic source shares, each an independent measured fraction in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSources {
    pub direct_visits_share: f64,
    pub organic_search_visits_share: f64,
    pub referral_visits_share: f64,
    pub social_networks_visits_share: f64,
    pub mail_visits_share: f64,
    pub paid_search_visits_share: f64,
    pub ads_visits_share: f64,
}

impl TrafficSources {
    /// All seven shares in display order.
    pub fn shares(&self) -> [f64; 7] {
        [
            self.direct_visits_share,
            self.organic_search_visits_share,
            self.referral_visits_share,
            self.social_networks_visits_share,
            self.mail_visits_share,
            self.paid_search_visits_share,
            self.ads_visits_share,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCountry {
    /// ISO 3166-1 alpha-2 code.
    pub country_code: String,
    pub visits_share: f64,
    /// Period-over-period change, in [-1, 1].
    pub visits_share_change: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopKeyword {
    pub name: String,
    pub volume: u64,
    pub estimated_value: u64,
    pub cpc: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialNetworkShare {
    pub name: String,
    pub visits_share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub domain: String,
    pub visits_total_count: u64,
    pub affinity: f64,
    pub category_rank: Rank,
}

/// Visitor share for one age bucket. `max_age` is 0 for the open-ended bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    pub min_age: u32,
    pub max_age: u32,
    pub value: f64,
}

/// Canonical, provider-agnostic analysis of one domain.
///
/// Every field is always populated; missing provider data is replaced with
/// zero, an empty list or the `"unknown"` rank sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub name: String,
    pub global_rank: Rank,
    pub country_rank: Rank,
    pub category_rank: Rank,
    pub company_name: String,
    pub company_year_founded: u32,
    pub company_employees_min: u64,
    pub company_employees_max: u64,
    pub total_visits: u64,
    /// `HH:MM:SS`.
    pub avg_visit_duration: String,
    pub pages_per_visit: f64,
    pub bounce_rate: f64,
    pub traffic_sources: TrafficSources,
    pub top_countries: Vec<TopCountry>,
    pub top_keywords: Vec<TopKeyword>,
    pub social_network_distribution: Vec<SocialNetworkShare>,
    pub top_similarity_competitors: Vec<Competitor>,
    pub age_distribution: Vec<AgeBucket>,
    pub male_distribution: f64,
    pub female_distribution: f64,
    pub organic_traffic: u64,
    pub paid_traffic: u64,
    #[serde(skip)]
    pub origin: RecordOrigin,
}

impl AnalysisRecord {
    /// Checks the range invariants every record in a response must satisfy.
    ///
    /// Returns the name of the first offending field.
    pub fn validate_ranges(&self) -> Result<(), String> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);

        if !unit(self.bounce_rate) {
            return Err("bounceRate".into());
        }
        if !self.pages_per_visit.is_finite() || self.pages_per_visit < 0.0 {
            return Err("pagesPerVisit".into());
        }
        if !crate::normalize::is_hms(&self.avg_visit_duration) {
            return Err("avgVisitDuration".into());
        }
        if !self.traffic_sources.shares().iter().all(|s| unit(*s)) {
            return Err("trafficSources".into());
        }
        for country in &self.top_countries {
            if !unit(country.visits_share)
                || !country.visits_share_change.is_finite()
                || !(-1.0..=1.0).contains(&country.visits_share_change)
            {
                return Err("topCountries".into());
            }
        }
        if !self
            .top_keywords
            .iter()
            .all(|k| k.cpc.is_finite() && k.cpc >= 0.0)
        {
            return Err("topKeywords".into());
        }
        if !self
            .social_network_distribution
            .iter()
            .all(|s| unit(s.visits_share))
        {
            return Err("socialNetworkDistribution".into());
        }
        if !self
            .top_similarity_competitors
            .iter()
            .all(|c| unit(c.affinity))
        {
            return Err("topSimilarityCompetitors".into());
        }
        if !self.age_distribution.iter().all(|a| unit(a.value)) {
            return Err("ageDistribution".into());
        }
        if !unit(self.male_distribution) || !unit(self.female_distribution) {
            return Err("genderDistribution".into());
        }
        Ok(())
    }
}

// ============ API Request/Response Models ============

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteAnalysisRequest {
    #[serde(default)]
    pub websites: Vec<String>,
    /// Opaque caller id, forwarded to the provider for attribution.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Uniform batch response consumed by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub data: Vec<AnalysisRecord>,
    pub count: usize,
    /// Present whenever any record was synthesized or a domain failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BatchResponse {
    pub fn new(data: Vec<AnalysisRecord>, note: Option<String>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            note,
        }
    }

    /// Whole-batch failure: no records, reason carried in `note`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            count: 0,
            note: Some(reason.into()),
        }
    }
}
