//! Wormholescan explorer client.
//!
//! Read-only queries against the public API: guardian observations for a
//! transaction, top cross-chain activity and the latest transactions.
//! Numeric chain ids in responses can be annotated with chain names.

use chainpilot_config::ExplorerConfig;
use chainpilot_core::ServiceError;
use chainpilot_core::chain::wormhole_chain_name;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservationQuery {
    pub tx_hash: String,
    pub page: u32,
    pub page_size: u32,
    pub sort_order: SortOrder,
}

impl ObservationQuery {
    pub fn for_tx(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            page: 1,
            page_size: 10,
            sort_order: SortOrder::Desc,
        }
    }
}

/// A guardian observation of a Wormhole message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub emitter_chain: u16,
    #[serde(default)]
    pub emitter_address: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sequence: String,
    #[serde(default)]
    pub guardian_address: String,
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Observation {
    pub fn emitter_chain_name(&self) -> Option<&'static str> {
        wormhole_chain_name(self.emitter_chain)
    }

    /// First ten characters of the signature, for compact display.
    pub fn short_signature(&self) -> Option<String> {
        self.signature.as_ref().map(|s| {
            let head: String = s.chars().take(10).collect();
            format!("{head}...")
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationPage {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Clone)]
pub struct ActivityQuery {
    /// e.g. "1d", "7d"
    pub timespan: String,
    /// RFC 3339 start time
    pub from: String,
    /// RFC 3339 end time
    pub to: String,
    pub app_id: Option<String>,
}

pub struct WormholescanClient {
    base_url: String,
    client: reqwest::Client,
}

impl WormholescanClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: crate::http_client(30),
        }
    }

    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::new(&config.base_url)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, params = query.len(), "Wormholescan request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(crate::transport_error)?;

        crate::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Guardian observations for one transaction hash.
    pub async fn observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>, ServiceError> {
        let params = [
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("txHash", query.tx_hash.clone()),
            ("sortOrder", query.sort_order.as_str().to_string()),
        ];
        let body = self.get_json("observations", &params).await?;
        let page: ObservationPage =
            serde_json::from_value(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        Ok(page.observations)
    }

    /// Top cross-chain activity in a time window, chain ids annotated.
    pub async fn cross_chain_activity(&self, query: &ActivityQuery) -> Result<Value, ServiceError> {
        let mut params = vec![
            ("timespan", query.timespan.clone()),
            ("from", query.from.clone()),
            ("to", query.to.clone()),
        ];
        if let Some(app_id) = &query.app_id {
            params.push(("appId", app_id.clone()));
        }
        let mut body = self.get_json("x-chain-activity/tops", &params).await?;
        annotate_chain_ids(&mut body);
        Ok(body)
    }

    /// Latest transactions, optionally sampled.
    pub async fn last_transactions(
        &self,
        timespan: Option<&str>,
        sample_rate: Option<u32>,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut params = Vec::new();
        if let Some(timespan) = timespan {
            params.push(("timespan", timespan.to_string()));
        }
        if let Some(rate) = sample_rate {
            params.push(("sampleRate", rate.to_string()));
        }
        let body = self.get_json("last-txs", &params).await?;
        Ok(unwrap_list(body))
    }
}

/// Accept either a bare array or `{"data": [...]}`.
fn unwrap_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

/// For every numeric field whose key mentions "chain" and whose value is a
/// known Wormhole chain id, add a sibling `<key>Name` with the chain name.
pub fn annotate_chain_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let names: Vec<(String, &'static str)> = map
                .iter()
                .filter(|(key, _)| key.to_ascii_lowercase().contains("chain"))
                .filter_map(|(key, v)| {
                    let id = v.as_u64().and_then(|n| u16::try_from(n).ok())?;
                    wormhole_chain_name(id).map(|name| (format!("{key}Name"), name))
                })
                .collect();
            for v in map.values_mut() {
                annotate_chain_ids(v);
            }
            for (key, name) in names {
                map.insert(key, Value::String(name.to_string()));
            }
        }
        Value::Array(items) => items.iter_mut().for_each(annotate_chain_ids),
        _ => {}
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
