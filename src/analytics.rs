//! Site traffic figures from the Cloudflare GraphQL analytics API.
//!
//! Without credentials the client answers with a fixed two-day sample so the admin
//! dashboard renders during development.

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AnalyticsConfig;

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analytics API reported errors: {0}")]
    Graphql(Value),
    #[error("analytics response carried no data")]
    MissingData,
}

#[derive(Clone)]
pub struct AnalyticsClient {
    config: AnalyticsConfig,
    client: reqwest::Client,
}

impl AnalyticsClient {
    pub fn new(config: AnalyticsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    /// Daily page views and unique visitors for the last week, shaped as
    /// `{"viewer": {"zones": [{"httpRequests1dGroups": [...]}]}}`.
    pub async fn daily_traffic(&self) -> Result<Value, AnalyticsError> {
        let Some((token, zone_id)) = self.config.credentials() else {
            return Ok(mock_traffic());
        };

        #[derive(Serialize)]
        struct GraphqlRequest {
            query: String,
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&GraphqlRequest { query: traffic_query(zone_id) })
            .send()
            .await?;

        let status = response.status();
        let mut body: Value = response.json().await?;

        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(AnalyticsError::Graphql(errors.clone()));
        }
        if !status.is_success() {
            tracing::warn!(%status, "Analytics API answered without GraphQL errors");
        }
        match body.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(AnalyticsError::MissingData),
        }
    }
}

pub fn traffic_query(zone_id: &str) -> String {
    format!(
        r#"query {{
  viewer {{
    zones(filter: {{ zoneTag: "{}" }}) {{
      httpRequests1dGroups(limit: 7, orderBy: [date_ASC]) {{
        date {{ date }}
        sum {{
          pageViews
          uniqueVisitors
        }}
      }}
    }}
  }}
}}"#,
        zone_id.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

pub fn mock_traffic() -> Value {
    json!({
        "viewer": {
            "zones": [{
                "httpRequests1dGroups": [
                    { "date": { "date": "2023-10-26" }, "sum": { "pageViews": 120, "uniqueVisitors": 80 } },
                    { "date": { "date": "2023-10-27" }, "sum": { "pageViews": 150, "uniqueVisitors": 90 } }
                ]
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, zone: Option<&str>) -> AnalyticsConfig {
        AnalyticsConfig {
            endpoint: "http://127.0.0.1:9/graphql".to_string(),
            timeout_secs: 1,
            api_token: token.map(str::to_string),
            zone_id: zone.map(str::to_string),
        }
    }

    #[test]
    fn query_embeds_zone_filter() {
        let q = traffic_query("abc123");
        assert!(q.contains(r#"zoneTag: "abc123""#));
        assert!(q.contains("httpRequests1dGroups(limit: 7, orderBy: [date_ASC])"));
        assert!(q.contains("uniqueVisitors"));
    }

    #[test]
    fn query_escapes_quotes_in_zone() {
        let q = traffic_query(r#"x" } evil {"#);
        assert!(q.contains(r#"zoneTag: "x\" } evil {""#));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        assert!(!AnalyticsClient::new(config(None, None)).unwrap().is_configured());
        assert!(!AnalyticsClient::new(config(Some("  "), Some("zone"))).unwrap().is_configured());
        assert!(!AnalyticsClient::new(config(Some("tok"), None)).unwrap().is_configured());
        assert!(AnalyticsClient::new(config(Some(" tok "), Some(" zone "))).unwrap().is_configured());
    }

    #[tokio::test]
    async fn unconfigured_client_returns_two_day_sample() {
        let client = AnalyticsClient::new(config(None, None)).unwrap();
        let data = client.daily_traffic().await.unwrap();
        let groups = data["viewer"]["zones"][0]["httpRequests1dGroups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["sum"]["pageViews"], 120);
        assert_eq!(groups[1]["date"]["date"], "2023-10-27");
    }
}
