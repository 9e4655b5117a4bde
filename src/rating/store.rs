use super::RatingRecord;
use crate::config::RatingConfig;
use crate::error::AppError;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the ratings table of a PostgREST-style endpoint
pub struct RatingStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl RatingStore {
    pub fn new(config: &RatingConfig) -> Result<Self, AppError> {
        if config.store_url.trim().is_empty() {
            return Err(AppError::Rating("No rating store configured".to_string()));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            table_url: table_url(&config.store_url, &config.table),
            api_key: config.api_key.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// True when a rating from `ip_address` already exists
    pub fn has_rated(&self, ip_address: &str) -> Result<bool, AppError> {
        let rows: Vec<Value> = self
            .authorized(self.client.get(&self.table_url))
            .query(&[
                ("select", "*".to_string()),
                ("ip_address", format!("eq.{}", ip_address)),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        debug!("Found {} previous ratings for {}", rows.len(), ip_address);
        Ok(!rows.is_empty())
    }

    pub fn submit(&self, record: &RatingRecord) -> Result<(), AppError> {
        self.authorized(self.client.post(&self.table_url))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()?
            .error_for_status()?;

        info!("Submitted {} star rating", record.rating);
        Ok(())
    }
}

fn table_url(store_url: &str, table: &str) -> String {
    format!("{}/{}", store_url.trim().trim_end_matches('/'), table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_joins_cleanly() {
        assert_eq!(
            table_url("https://x.supabase.co/rest/v1/", "ratings"),
            "https://x.supabase.co/rest/v1/ratings"
        );
        assert_eq!(
            table_url(" https://x.supabase.co/rest/v1 ", "ratings"),
            "https://x.supabase.co/rest/v1/ratings"
        );
    }

    #[test]
    fn test_unconfigured_store_is_rejected() {
        let config = RatingConfig::default();
        assert!(matches!(
            RatingStore::new(&config),
            Err(AppError::Rating(_))
        ));
    }
}
