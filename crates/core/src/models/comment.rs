use serde::{Deserialize, Serialize};
use validator::Validate;

use super::video::OwnerSummary;
use crate::types::{EntityId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub video_id: EntityId,
    pub user_id: EntityId,
    #[validate(nested)]
    #[serde(default)]
    pub user: Option<OwnerSummary>,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_length_limits() {
        let empty = CreateCommentInput { content: String::new() };
        assert!(empty.validate().is_err());

        let long = CreateCommentInput { content: "x".repeat(1001) };
        assert!(long.validate().is_err());

        let ok = CreateCommentInput { content: "great video".into() };
        assert!(ok.validate().is_ok());
    }
}
