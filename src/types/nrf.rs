use serde::{Deserialize, Serialize};
use super::{NfProfile, NfType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfRegistrationData {
    pub nf_profile: NfProfile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfRegistrationResponse {
    pub nf_instance_id: String,
    pub heartbeat_timer: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfDiscoveryRequest {
    pub target_nf_type: NfType,
    pub requester_nf_type: NfType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_load: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_service_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl NfDiscoveryRequest {
    pub fn new(target_nf_type: NfType, requester_nf_type: NfType) -> Self {
        Self {
            target_nf_type,
            requester_nf_type,
            preferred_locality: None,
            min_capacity: None,
            max_load: None,
            required_service_names: Vec::new(),
            limit: None,
        }
    }

    /// Query parameters for `GET /nf-instances`. Unset filters are left out.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("target-nf-type", self.target_nf_type.to_string()),
            ("requester-nf-type", self.requester_nf_type.to_string()),
        ];

        if let Some(ref locality) = self.preferred_locality {
            pairs.push(("preferred-locality", locality.clone()));
        }
        if let Some(min_capacity) = self.min_capacity {
            pairs.push(("min-capacity", min_capacity.to_string()));
        }
        if let Some(max_load) = self.max_load {
            pairs.push(("max-load", max_load.to_string()));
        }
        if !self.required_service_names.is_empty() {
            pairs.push(("service-names", self.required_service_names.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfDiscoveryResponse {
    /// Seconds the result may be cached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<u32>,
    #[serde(default)]
    pub nf_instances: Vec<NfProfile>,
}
