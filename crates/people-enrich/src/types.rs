//! Response shapes of the lookup services and the merged result.
//!
//! Fields use `#[serde(default)]` so that `null` or absent values decode to
//! the zero value instead of failing the lookup. Unknown fields (`count`,
//! `name`, `probability`) are ignored.

use serde::{Deserialize, Serialize};

/// `GET {age_url}?name=` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AgeResponse {
    #[serde(default)]
    pub age: Option<i32>,
}

/// `GET {gender_url}?name=` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderResponse {
    #[serde(default)]
    pub gender: Option<String>,
}

/// One ranked country guess.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryGuess {
    pub country_id: String,
    #[serde(default)]
    pub probability: f64,
}

/// `GET {nationality_url}?name=` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalityResponse {
    #[serde(default)]
    pub country: Vec<CountryGuess>,
}

impl NationalityResponse {
    /// Country code of the highest-probability guess. Ties go to the
    /// earliest entry, so an already-ranked list yields its head.
    pub fn top_country(&self) -> Option<&str> {
        let mut best: Option<&CountryGuess> = None;
        for guess in &self.country {
            match best {
                Some(b) if guess.probability <= b.probability => {}
                _ => best = Some(guess),
            }
        }
        best.map(|g| g.country_id.as_str())
    }
}

/// Result of one enrichment run.
///
/// Each attribute is `Some` only if its own lookup succeeded; the three
/// are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
}
