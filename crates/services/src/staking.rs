//! Staking-rewards GraphQL client.
//!
//! Sends one `rewardOptions` query per lookup, ordered by reward rate, and
//! returns the options with their first output asset, first provider and up
//! to six metrics.

use async_trait::async_trait;
use chainpilot_config::StakingConfig;
use chainpilot_core::staking::{RewardOption, StakingQuery, StakingRewards};
use chainpilot_core::ServiceError;
use serde::Deserialize;
use tracing::debug;

const METRIC_KEYS: [&str; 6] = [
    "commission",
    "staking_wallets",
    "staked_tokens",
    "reward_rate",
    "staking_share",
    "net_staking_flow_7d",
];

pub struct StakingRewardsClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl StakingRewardsClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            client: crate::http_client(30),
        }
    }

    pub fn from_config(config: &StakingConfig) -> Self {
        Self::new(&config.endpoint, config.api_key.clone())
    }

    /// Render the GraphQL document for `query`.
    pub fn build_query(query: &StakingQuery) -> String {
        // JSON string arrays are valid GraphQL list literals.
        let symbols = serde_json::to_string(&query.symbols).unwrap_or_else(|_| "[]".into());
        let type_keys = serde_json::to_string(&query.type_keys).unwrap_or_else(|_| "[]".into());
        let metric_keys = METRIC_KEYS
            .iter()
            .map(|k| format!("\"{k}\""))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            r#"query GetBestLiquidStaking {{
    rewardOptions(
        where: {{
            inputAsset: {{ symbols: {symbols} }}
            typeKeys: {type_keys}
        }}
        limit: {limit}
        order: {{ metricKey_desc: "reward_rate" }}
    ) {{
        outputAssets(limit: 1) {{ symbol name logoUrl }}
        providers(limit: 1) {{ name slug isVerified }}
        metrics(where: {{ metricKeys: [{metric_keys}] }}, limit: 6) {{
            label
            metricKey
            defaultValue
        }}
    }}
}}"#,
            limit = query.limit,
        )
    }

    fn into_options(response: GraphqlResponse) -> Result<Vec<RewardOption>, ServiceError> {
        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let joined = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ServiceError::Api(joined));
        }

        response
            .data
            .map(|d| d.reward_options)
            .ok_or_else(|| ServiceError::Decode("response has neither data nor errors".into()))
    }
}

#[async_trait]
impl StakingRewards for StakingRewardsClient {
    async fn reward_options(&self, query: &StakingQuery) -> Result<Vec<RewardOption>, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ServiceError::NotConfigured("staking.api_key / STAKING_REWARDS_API_KEY is not set".into())
        })?;

        debug!(
            symbols = ?query.symbols,
            type_keys = ?query.type_keys,
            limit = query.limit,
            "Querying staking rewards"
        );

        let body = serde_json::json!({ "query": Self::build_query(query) });
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-API-KEY", api_key)
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let response = crate::ensure_success(response).await?;
        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        let options = Self::into_options(parsed)?;
        debug!(count = options.len(), "Staking rewards received");
        Ok(options)
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<RewardOptionsData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RewardOptionsData {
    #[serde(default)]
    reward_options: Vec<RewardOption>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_embeds_filters_as_lists() {
        let query = StakingQuery {
            symbols: vec!["ETH".into()],
            type_keys: vec!["Lido".into()],
            limit: 5,
        };
        let doc = StakingRewardsClient::build_query(&query);
        assert!(doc.contains(r#"symbols: ["ETH"]"#));
        assert!(doc.contains(r#"typeKeys: ["Lido"]"#));
        assert!(doc.contains("limit: 5"));
        assert!(doc.contains(r#"metricKey_desc: "reward_rate""#));
        assert!(doc.contains(r#""net_staking_flow_7d""#));
    }

    #[test]
    fn parses_reward_options() {
        let body = serde_json::json!({
            "data": { "rewardOptions": [{
                "outputAssets": [{ "symbol": "stETH", "name": "Lido Staked ETH", "logoUrl": "https://x/steth.png" }],
                "providers": [{ "name": "Lido", "slug": "lido", "isVerified": true }],
                "metrics": [{ "label": "Reward Rate", "metricKey": "reward_rate", "defaultValue": 2.9 }]
            }]}
        });
        let parsed: GraphqlResponse = serde_json::from_value(body).unwrap();
        let options = StakingRewardsClient::into_options(parsed).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].provider().unwrap().name, "Lido");
        assert_eq!(options[0].reward_rate(), Some(2.9));
    }

    #[test]
    fn graphql_errors_become_api_error() {
        let body = serde_json::json!({
            "data": null,
            "errors": [{ "message": "invalid API key" }, { "message": "quota exceeded" }]
        });
        let parsed: GraphqlResponse = serde_json::from_value(body).unwrap();
        let err = StakingRewardsClient::into_options(parsed).unwrap_err();
        assert!(matches!(err, ServiceError::Api(ref m) if m == "invalid API key; quota exceeded"));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = StakingRewardsClient::new("https://api.stakingrewards.com/public/query", None);
        let err = client.reward_options(&StakingQuery::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }
}
