use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

// Unknown strings are kept as `Other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NfType {
    Amf,
    Smf,
    Upf,
    Pcf,
    Udm,
    Ausf,
    Nrf,
    Nssf,
    Other(String),
}

impl NfType {
    pub fn as_str(&self) -> &str {
        match self {
            NfType::Amf => "AMF",
            NfType::Smf => "SMF",
            NfType::Upf => "UPF",
            NfType::Pcf => "PCF",
            NfType::Udm => "UDM",
            NfType::Ausf => "AUSF",
            NfType::Nrf => "NRF",
            NfType::Nssf => "NSSF",
            NfType::Other(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NfType::Other(_))
    }
}

impl From<String> for NfType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "AMF" => NfType::Amf,
            "SMF" => NfType::Smf,
            "UPF" => NfType::Upf,
            "PCF" => NfType::Pcf,
            "UDM" => NfType::Udm,
            "AUSF" => NfType::Ausf,
            "NRF" => NfType::Nrf,
            "NSSF" => NfType::Nssf,
            _ => NfType::Other(value),
        }
    }
}

impl From<&str> for NfType {
    fn from(value: &str) -> Self {
        NfType::from(value.to_string())
    }
}

impl From<NfType> for String {
    fn from(value: NfType) -> Self {
        match value {
            NfType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NfStatus {
    Registered,
    Deregistered,
    Suspended,
    Other(String),
}

impl NfStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NfStatus::Registered => "REGISTERED",
            NfStatus::Deregistered => "DEREGISTERED",
            NfStatus::Suspended => "SUSPENDED",
            NfStatus::Other(value) => value,
        }
    }
}

impl From<String> for NfStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "REGISTERED" => NfStatus::Registered,
            "DEREGISTERED" => NfStatus::Deregistered,
            "SUSPENDED" => NfStatus::Suspended,
            _ => NfStatus::Other(value),
        }
    }
}

impl From<NfStatus> for String {
    fn from(value: NfStatus) -> Self {
        match value {
            NfStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfServiceVersion {
    pub api_version: String,
    pub api_full_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_prefix: Option<String>,
}

impl NfServiceVersion {
    pub fn new(api_version: impl Into<String>, api_full_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            api_full_version: api_full_version.into(),
            uri_prefix: None,
        }
    }
}

// service_instance_id must be unique within the owning profile; not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfService {
    pub service_instance_id: String,
    pub service_name: String,
    pub versions: Vec<NfServiceVersion>,
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfProfile {
    pub nf_instance_id: String,
    pub nf_type: NfType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nf_instance_name: Option<String>,
    pub nf_status: NfStatus,
    /// Seconds. Absent means the NRF default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4_addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nf_services: Vec<NfService>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_nf_types: Vec<NfType>,
    #[serde(default, deserialize_with = "unset_if_zero", skip_serializing_if = "is_unset")]
    pub register_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "unset_if_zero", skip_serializing_if = "is_unset")]
    pub last_heartbeat_time: Option<DateTime<Utc>>,
}

// 0001-01-01T00:00:00Z, the zero time some peers send for an unset timestamp.
const ZERO_TIME_UNIX: i64 = -62_135_596_800;

fn is_zero_time(time: &DateTime<Utc>) -> bool {
    time.timestamp() == ZERO_TIME_UNIX && time.timestamp_subsec_nanos() == 0
}

fn is_unset(time: &Option<DateTime<Utc>>) -> bool {
    time.as_ref().map_or(true, is_zero_time)
}

fn unset_if_zero<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let time = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(time.filter(|t| !is_zero_time(t)))
}

impl NfProfile {
    pub fn new(nf_instance_id: impl Into<String>, nf_type: NfType, nf_status: NfStatus) -> Self {
        Self {
            nf_instance_id: nf_instance_id.into(),
            nf_type,
            nf_instance_name: None,
            nf_status,
            heartbeat_timer: None,
            ipv4_addresses: Vec::new(),
            ipv6_addresses: Vec::new(),
            fqdn: None,
            priority: None,
            capacity: None,
            load: None,
            locality: None,
            nf_services: Vec::new(),
            allowed_nf_types: Vec::new(),
            register_time: None,
            last_heartbeat_time: None,
        }
    }

    pub fn service(&self, service_instance_id: &str) -> Option<&NfService> {
        self.nf_services
            .iter()
            .find(|s| s.service_instance_id == service_instance_id)
    }

    /// Whether `requester` may discover this profile. An empty allow-list admits every type.
    pub fn allows(&self, requester: &NfType) -> bool {
        self.allowed_nf_types.is_empty() || self.allowed_nf_types.contains(requester)
    }

    pub fn has_address(&self) -> bool {
        !self.ipv4_addresses.is_empty() || !self.ipv6_addresses.is_empty() || self.fqdn.is_some()
    }

    /// Service instance ids that occur more than once, in first-repeat order.
    pub fn duplicate_service_instance_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for service in &self.nf_services {
            let id = service.service_instance_id.as_str();
            if !seen.insert(id) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }
}
