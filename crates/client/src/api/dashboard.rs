//! `/dashboard` endpoints.

use reelgen_core::models::dashboard::{AdminOverview, DashboardStats};

use super::validated_all;
use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthedClient};
use crate::session::SessionProvider;

pub struct DashboardApi;

impl DashboardApi {
    /// `GET /dashboard/stats`
    pub async fn stats<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
    ) -> ClientResult<DashboardStats> {
        client.request(&ApiRequest::get("/dashboard/stats")).await
    }

    /// `GET /dashboard/admin/overview` (admin)
    pub async fn admin_overview<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
    ) -> ClientResult<AdminOverview> {
        let mut overview: AdminOverview = client
            .request(&ApiRequest::get("/dashboard/admin/overview"))
            .await?;
        overview.recent_users = validated_all(overview.recent_users)?;
        overview.recent_videos = validated_all(overview.recent_videos)?;
        Ok(overview)
    }
}
