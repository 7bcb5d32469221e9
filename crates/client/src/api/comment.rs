//! Comment endpoints.

use reelgen_core::models::comment::{Comment, CreateCommentInput};
use validator::Validate;

use super::{validated, validated_all};
use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthedClient};
use crate::session::SessionProvider;

pub struct CommentApi;

impl CommentApi {
    /// `GET /video/{video_id}/comments`
    pub async fn list<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        video_id: &str,
    ) -> ClientResult<Vec<Comment>> {
        let comments = client
            .request(&ApiRequest::get(format!("/video/{video_id}/comments")))
            .await?;
        validated_all(comments)
    }

    /// `POST /video/{video_id}/comments`
    pub async fn create<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        video_id: &str,
        input: &CreateCommentInput,
    ) -> ClientResult<Comment> {
        input.validate()?;
        let comment = client
            .request(&ApiRequest::post(format!("/video/{video_id}/comments")).json(input)?)
            .await?;
        validated(comment)
    }

    /// `DELETE /comments/{id}`
    pub async fn delete<P: SessionProvider + ?Sized>(
        client: &AuthedClient<P>,
        id: &str,
    ) -> ClientResult<()> {
        client
            .request_unit(&ApiRequest::delete(format!("/comments/{id}")))
            .await
    }
}
