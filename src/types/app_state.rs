use std::sync::Arc;

use super::NfProfile;
use crate::clients::NrfClient;
use crate::metrics::RequestMetrics;

#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub profile: Arc<NfProfile>,
    pub nrf_client: Option<Arc<NrfClient>>,
    pub metrics: Arc<RequestMetrics>,
}
