//! Public `/auth` endpoints. These never carry a bearer token.

use reelgen_core::models::user::{AuthPayload, AuthTokens, LoginInput, RegisterInput, User};
use serde_json::json;
use validator::Validate;

use super::validated;
use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct AuthApi;

impl AuthApi {
    /// `POST /auth/login`
    pub async fn login(api: &ApiClient, input: &LoginInput) -> ClientResult<AuthPayload> {
        input.validate()?;
        let payload: AuthPayload = api
            .request(&ApiRequest::post("/auth/login").json(input)?)
            .await?;
        validated(payload)
    }

    /// `POST /auth/register`
    pub async fn register(api: &ApiClient, input: &RegisterInput) -> ClientResult<User> {
        input.validate()?;
        let user = api
            .request(&ApiRequest::post("/auth/register").json(input)?)
            .await?;
        validated(user)
    }

    /// `POST /auth/refresh-token`
    pub async fn refresh(api: &ApiClient, refresh_token: &str) -> ClientResult<AuthTokens> {
        let tokens = api
            .request(
                &ApiRequest::post("/auth/refresh-token")
                    .json(&json!({ "refreshToken": refresh_token }))?,
            )
            .await?;
        validated(tokens)
    }

    /// `POST /auth/google` -- exchange a Google authorization code.
    pub async fn google(api: &ApiClient, code: &str, redirect_uri: &str) -> ClientResult<AuthPayload> {
        let payload: AuthPayload = api
            .request(
                &ApiRequest::post("/auth/google")
                    .json(&json!({ "code": code, "redirectUri": redirect_uri }))?,
            )
            .await?;
        validated(payload)
    }

    /// `POST /auth/forgot-password`
    pub async fn forgot_password(api: &ApiClient, email: &str) -> ClientResult<()> {
        api.request_unit(&ApiRequest::post("/auth/forgot-password").json(&json!({ "email": email }))?)
            .await
    }

    /// `POST /auth/reset-password`
    pub async fn reset_password(api: &ApiClient, token: &str, password: &str) -> ClientResult<()> {
        api.request_unit(
            &ApiRequest::post("/auth/reset-password")
                .json(&json!({ "token": token, "password": password }))?,
        )
        .await
    }
}
