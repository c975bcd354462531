use std::future::Future;

use serde_json::Value;

use cyclegraph_api::SessionReport;
use cyclegraph_api_client::ApiClient;

use crate::error::Result;

/// The live backend as seen by the sync layer.
///
/// Implemented by [`ApiClient`]; tests substitute a scripted fake.
pub trait SessionBackend: Send + Sync + 'static {
    /// Raw directory payload, not yet normalized.
    fn list_sessions(&self) -> impl Future<Output = Result<Value>> + Send;

    /// Analysis report for one session. Triggers backend compute.
    fn session_report(&self, id: &str) -> impl Future<Output = Result<SessionReport>> + Send;

    /// Current profile version token, if the backend reports one.
    fn profile_version(&self) -> impl Future<Output = Result<Option<String>>> + Send;
}

impl SessionBackend for ApiClient {
    async fn list_sessions(&self) -> Result<Value> {
        Ok(self.list_sessions_raw().await?)
    }

    async fn session_report(&self, id: &str) -> Result<SessionReport> {
        Ok(self.analyze_session(id).await?)
    }

    async fn profile_version(&self) -> Result<Option<String>> {
        let profile = self.profile().await?;
        Ok(profile.version_token().map(str::to_string))
    }
}
