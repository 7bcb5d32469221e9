//! `/users` endpoints, including the admin-only ones.

use reelgen_core::models::pagination::{PageParams, Paginated};
use reelgen_core::models::user::{SetRoleInput, UpdateProfileInput, User};
use validator::Validate;

use super::{validated, validated_page};
use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthedClient};
use crate::session::SessionProvider;

pub struct UserApi;

impl UserApi {
    /// `GET /users/me`
    pub async fn me<P: SessionProvider + ?Sized>(client: &AuthedClient<P>) -> ClientResult<User> {
        let user = client.request(&ApiRequest::get("/users/me")).await?;
        validated(user)
    }

    /// `PUT /users/me`
    pub async fn update_profile<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        input: &UpdateProfileInput,
    ) -> ClientResult<User> {
        input.validate()?;
        let user = client
            .request(&ApiRequest::put("/users/me").json(input)?)
            .await?;
        validated(user)
    }

    /// `GET /users/{id}`
    pub async fn get<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<User> {
        let user = client.request(&ApiRequest::get(format!("/users/{id}"))).await?;
        validated(user)
    }

    /// `GET /users` (admin)
    pub async fn list<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        page: PageParams,
    ) -> ClientResult<Paginated<User>> {
        let users = client
            .request(&ApiRequest::get("/users").query(&page)?)
            .await?;
        validated_page(users)
    }

    /// `PATCH /users/{id}/role` (admin)
    pub async fn set_role<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
        role: &str,
    ) -> ClientResult<User> {
        let input = SetRoleInput {
            role: role.to_string(),
        };
        let user = client
            .request(&ApiRequest::patch(format!("/users/{id}/role")).json(&input)?)
            .await?;
        validated(user)
    }

    /// `DELETE /users/{id}` (admin)
    pub async fn delete<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<()> {
        client
            .request_unit(&ApiRequest::delete(format!("/users/{id}")))
            .await
    }
}
