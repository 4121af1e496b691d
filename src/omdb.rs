use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{LookupOutcome, MovieFacts},
};

/// Title-based movie metadata source. Implementations answer with a
/// normalized outcome; a miss is an outcome, not an error, so handlers can
/// message it without special-casing.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, title: &str, year: Option<&str>) -> AppResult<LookupOutcome>;
}

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no OMDB_API_KEY provided, movie lookups will fail until one is set");
        }
        Self { client, api_key, base_url }
    }
}

#[async_trait]
impl MetadataLookup for OmdbClient {
    /// One request per call, no retries. Transient upstream trouble surfaces
    /// as `UpstreamUnavailable` and the caller decides what to tell the user.
    async fn lookup(&self, title: &str, year: Option<&str>) -> AppResult<LookupOutcome> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "movie lookups are not configured on this server".to_string(),
            ));
        }

        tracing::debug!(title = %title, year = ?year, "looking up movie");

        let url = self.base_url.trim_end_matches('/').to_string();
        let mut req =
            self.client.get(url).query(&[("apikey", self.api_key.as_str()), ("t", title)]);
        if let Some(year) = year {
            req = req.query(&[("y", year)]);
        }

        let payload: OmdbPayload = req.send().await?.error_for_status()?.json().await?;
        Ok(normalize(payload, title))
    }
}

fn normalize(payload: OmdbPayload, queried_title: &str) -> LookupOutcome {
    if !payload.response.eq_ignore_ascii_case("true") {
        return LookupOutcome::NoMatch { title: queried_title.to_string() };
    }

    let rating = match payload.imdb_rating.as_deref() {
        None | Some("N/A") => 0.0,
        Some(raw) => raw.parse().unwrap_or(0.0),
    };
    let poster_url = payload.poster.filter(|p| p != "N/A" && !p.is_empty());

    LookupOutcome::Found(MovieFacts {
        title: payload.title.unwrap_or_else(|| queried_title.to_string()),
        director: payload.director.unwrap_or_default(),
        year: payload.year.unwrap_or_default(),
        rating,
        poster_url,
    })
}

#[derive(Debug, Deserialize)]
struct OmdbPayload {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: serde_json::Value) -> OmdbPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn found_payload_passes_fields_through() {
        let out = normalize(
            payload(json!({
                "Title": "Inception",
                "Director": "Christopher Nolan",
                "Year": "2010",
                "imdbRating": "8.8",
                "Poster": "http://x/p.jpg",
                "Response": "True",
            })),
            "inception",
        );

        assert_eq!(
            out,
            LookupOutcome::Found(MovieFacts {
                title: "Inception".to_string(),
                director: "Christopher Nolan".to_string(),
                year: "2010".to_string(),
                rating: 8.8,
                poster_url: Some("http://x/p.jpg".to_string()),
            })
        );
    }

    #[test]
    fn upstream_miss_is_an_outcome_not_an_error() {
        let out = normalize(
            payload(json!({ "Response": "False", "Error": "Movie not found!" })),
            "definitely not a movie",
        );
        assert_eq!(out, LookupOutcome::NoMatch { title: "definitely not a movie".to_string() });
    }

    #[test]
    fn absent_rating_and_poster_normalize_to_sentinels() {
        let out = normalize(
            payload(json!({
                "Title": "Obscure",
                "Director": "N/A",
                "Year": "1931",
                "imdbRating": "N/A",
                "Poster": "N/A",
                "Response": "True",
            })),
            "obscure",
        );

        let LookupOutcome::Found(facts) = out else { panic!("expected a match") };
        assert_eq!(facts.rating, 0.0);
        assert_eq!(facts.poster_url, None);
        // Director passes through verbatim, unlike rating and poster.
        assert_eq!(facts.director, "N/A");
        assert_eq!(facts.year, "1931");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = OmdbClient::new(
            reqwest::Client::new(),
            String::new(),
            // Unroutable on purpose: the call must not get that far.
            "http://127.0.0.1:9".to_string(),
        );

        let err = client.lookup("Inception", None).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
