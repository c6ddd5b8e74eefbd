use reqwest::Url;

use super::context::RequestContext;
use super::sbi::SbiClient;
use crate::types::{
    AppError, AppResult, NfDiscoveryRequest, NfDiscoveryResponse, NfProfile,
    NfRegistrationData, NfRegistrationResponse,
};

/// NF management and discovery calls against an NRF.
pub struct NrfClient {
    sbi: SbiClient,
    nrf_uri: String,
}

impl NrfClient {
    pub fn new(nrf_uri: impl Into<String>, sbi: SbiClient) -> Self {
        let nrf_uri = nrf_uri.into().trim_end_matches('/').to_string();
        Self { sbi, nrf_uri }
    }

    pub fn nrf_uri(&self) -> &str {
        &self.nrf_uri
    }

    fn instance_url(&self, nf_instance_id: &str) -> String {
        format!("{}/nf-instances/{}", self.nrf_uri, nf_instance_id)
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        profile: &NfProfile,
    ) -> AppResult<NfRegistrationResponse> {
        let url = self.instance_url(&profile.nf_instance_id);
        let data = NfRegistrationData {
            nf_profile: profile.clone(),
        };

        let result = self
            .sbi
            .post::<_, NfRegistrationResponse>(ctx, &url, &data)
            .await
            .and_then(|response| {
                response.ok_or_else(|| {
                    AppError::internal("NRF returned no registration response body")
                })
            });

        let outcome = if result.is_ok() { "success" } else { "failure" };
        self.sbi
            .metrics()
            .record_registration(self.sbi.service_name(), outcome);

        match result {
            Ok(response) => {
                tracing::info!(
                    "Successfully registered NF instance {} with NRF (heartbeat timer {}s)",
                    response.nf_instance_id,
                    response.heartbeat_timer
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    "NRF registration of {} failed: {}",
                    profile.nf_instance_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Replaces the stored profile. `None` when the NRF answers 204.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        profile: &NfProfile,
    ) -> AppResult<Option<NfProfile>> {
        let url = self.instance_url(&profile.nf_instance_id);
        self.sbi.put(ctx, &url, profile).await
    }

    pub async fn profile(
        &self,
        ctx: &RequestContext,
        nf_instance_id: &str,
    ) -> AppResult<Option<NfProfile>> {
        self.sbi.get(ctx, &self.instance_url(nf_instance_id)).await
    }

    pub async fn discover(
        &self,
        ctx: &RequestContext,
        request: &NfDiscoveryRequest,
    ) -> AppResult<NfDiscoveryResponse> {
        let base = format!("{}/nf-instances", self.nrf_uri);
        let url = Url::parse_with_params(&base, request.query_pairs())
            .map_err(|e| AppError::internal("Failed to build discovery URL").with_cause(e))?;

        let result = self
            .sbi
            .get::<NfDiscoveryResponse>(ctx, url.as_str())
            .await
            .map(Option::unwrap_or_default);

        let outcome = if result.is_ok() { "success" } else { "failure" };
        self.sbi.metrics().record_discovery(
            self.sbi.service_name(),
            request.target_nf_type.as_str(),
            outcome,
        );

        if let Ok(ref response) = result {
            tracing::debug!(
                "Discovered {} {} instance(s)",
                response.nf_instances.len(),
                request.target_nf_type
            );
        }

        result
    }

    pub async fn deregister(&self, ctx: &RequestContext, nf_instance_id: &str) -> AppResult<()> {
        self.sbi.delete(ctx, &self.instance_url(nf_instance_id)).await?;
        tracing::info!("Successfully deregistered NF instance {} from NRF", nf_instance_id);
        Ok(())
    }
}
