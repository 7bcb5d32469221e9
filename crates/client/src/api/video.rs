//! `/video` endpoints.

use reelgen_core::models::pagination::{PageParams, Paginated};
use reelgen_core::models::video::{CreateVideoInput, FeedQuery, ReactionCounts, Tag, Video};
use validator::Validate;

use super::{validated, validated_all, validated_page};
use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthedClient};
use crate::session::SessionProvider;

pub struct VideoApi;

impl VideoApi {
    /// `GET /video` -- the public feed.
    pub async fn feed<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        query: &FeedQuery,
    ) -> ClientResult<Paginated<Video>> {
        let page = client
            .request(&ApiRequest::get("/video").query(query)?)
            .await?;
        validated_page(page)
    }

    /// `GET /video/{id}`
    pub async fn get<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<Video> {
        let video = client.request(&ApiRequest::get(format!("/video/{id}"))).await?;
        validated(video)
    }

    /// `GET /video/user/{user_id}`
    pub async fn by_user<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        user_id: &str,
        page: PageParams,
    ) -> ClientResult<Paginated<Video>> {
        let page = client
            .request(&ApiRequest::get(format!("/video/user/{user_id}")).query(&page)?)
            .await?;
        validated_page(page)
    }

    /// `POST /video` -- queue a new generation.
    pub async fn create<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        input: &CreateVideoInput,
    ) -> ClientResult<Video> {
        input.validate()?;
        let video = client
            .request(&ApiRequest::post("/video").json(input)?)
            .await?;
        validated(video)
    }

    /// `POST /video/{id}/like`
    pub async fn like<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<ReactionCounts> {
        client
            .request(&ApiRequest::post(format!("/video/{id}/like")))
            .await
    }

    /// `POST /video/{id}/dislike`
    pub async fn dislike<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<ReactionCounts> {
        client
            .request(&ApiRequest::post(format!("/video/{id}/dislike")))
            .await
    }

    /// `POST /video/{id}/view`
    pub async fn record_view<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<()> {
        client
            .request_unit(&ApiRequest::post(format!("/video/{id}/view")))
            .await
    }

    /// `DELETE /video/{id}`
    pub async fn delete<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<()> {
        client
            .request_unit(&ApiRequest::delete(format!("/video/{id}")))
            .await
    }

    /// `GET /video/{id}/tags`
    pub async fn tags<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<Vec<Tag>> {
        let tags = client
            .request(&ApiRequest::get(format!("/video/{id}/tags")))
            .await?;
        validated_all(tags)
    }
}
