//! Social account linking endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthedClient};
use crate::session::SessionProvider;

/// Result of linking a TikTok account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokLink {
    pub tiktok_username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokStatus {
    pub linked: bool,
    #[serde(default)]
    pub tiktok_username: Option<String>,
}

pub struct OAuthApi;

impl OAuthApi {
    /// `POST /users/tiktok/link` -- exchange a TikTok authorization code.
    pub async fn link_tiktok<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        code: &str,
        redirect_uri: &str,
    ) -> ClientResult<TikTokLink> {
        client
            .request(
                &ApiRequest::post("/users/tiktok/link")
                    .json(&json!({ "code": code, "redirectUri": redirect_uri }))?,
            )
            .await
    }

    /// `GET /users/tiktok/status`
    pub async fn tiktok_status<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
    ) -> ClientResult<TikTokStatus> {
        client
            .request(&ApiRequest::get("/users/tiktok/status"))
            .await
    }

    /// `DELETE /users/tiktok`
    pub async fn unlink_tiktok<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
    ) -> ClientResult<()> {
        client
            .request_unit(&ApiRequest::delete("/users/tiktok"))
            .await
    }
}
