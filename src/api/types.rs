//! Wire types for the DocBase API v2.
//!
//! Timestamps stay as the ISO 8601 strings the API returns; the pipeline
//! only ever passes them through (`published_at` on the destination is the
//! source's `created_at` verbatim).

use serde::{Deserialize, Serialize};

/// The memo's author on its owning tenant.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_image_url: String,
}

/// A sharing group on one tenant.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

/// A binary file attached to a memo. `name` is the correlation key between
/// an upload request and its response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub created_at: String,
}

/// A comment on a memo. Write-only on the destination, so no id is carried.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub body: String,
    pub created_at: String,
}

/// A tag on a memo. Plain strings from the pipeline's perspective; the
/// sentinels `exported` and `imported-<timestamp>` are layered onto the
/// user's own tags.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: u64,
    pub name: String,
}

/// A published memo with everything the migration needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Memo {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub user: User,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub sharing_url: String,
}

/// One page of a memo listing.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoPage {
    #[serde(default)]
    pub posts: Vec<Memo>,
    pub meta: PageMeta,
}

/// Listing metadata. `total` is the server-reported count of all matches,
/// read once per page and used only as a decreasing-progress signal.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageMeta {
    pub total: u64,
}

/// Visibility of a created memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Everyone,
    Group,
    Private,
}

/// Request body for creating a memo on the destination tenant.
#[derive(Debug, Clone, Serialize)]
pub struct NewMemo {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
}

/// Partial update of an existing memo. The id goes into the request path,
/// not the body.
#[derive(Debug, Clone, Serialize)]
pub struct MemoUpdate {
    #[serde(skip)]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
}

impl MemoUpdate {
    /// An update that changes nothing, ready for struct-update syntax.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            body: None,
            tags: None,
            groups: None,
            published_at: None,
            author_id: None,
        }
    }
}

/// One entry of a batch attachment upload. `content` is the base64-encoded
/// payload.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentUpload {
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
}

/// One entry of a batch upload response. Order is not guaranteed to match
/// the request; callers correlate by `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAttachment {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Request body for creating a comment on a destination memo.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Group).unwrap(), "\"group\"");
        assert_eq!(
            serde_json::to_string(&Scope::Everyone).unwrap(),
            "\"everyone\""
        );
    }

    #[test]
    fn new_memo_omits_unset_fields() {
        let memo = NewMemo {
            title: "t".into(),
            body: "b".into(),
            tags: vec!["k".into()],
            scope: None,
            groups: None,
            published_at: None,
            author_id: None,
        };
        let json = serde_json::to_value(&memo).unwrap();
        assert!(json.get("scope").is_none());
        assert!(json.get("groups").is_none());
        assert!(json.get("author_id").is_none());
    }

    #[test]
    fn memo_update_id_stays_out_of_body() {
        let update = MemoUpdate {
            tags: Some(vec!["exported".into()]),
            ..MemoUpdate::new(42)
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["tags"][0], "exported");
    }

    #[test]
    fn memo_page_tolerates_missing_posts() {
        let page: MemoPage = serde_json::from_str(r#"{"meta":{"total":0}}"#).unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.meta.total, 0);
    }

    #[test]
    fn memo_deserializes_listing_shape() {
        let json = r#"{
            "id": 1,
            "title": "T",
            "body": "see https://x/a.png",
            "created_at": "2020-01-01T00:00:00+09:00",
            "updated_at": "2020-01-02T00:00:00+09:00",
            "comments": [{"body": "c1", "created_at": "2020-01-03T00:00:00+09:00"}],
            "attachments": [{"id": 9, "name": "a.png", "url": "https://x/a.png", "created_at": ""}],
            "tags": [{"id": 3, "name": "k"}],
            "user": {"id": 7, "name": "alice", "profile_image_url": ""},
            "groups": [{"id": 5, "name": "g"}],
            "sharing_url": "https://x/share/1"
        }"#;
        let memo: Memo = serde_json::from_str(json).unwrap();
        assert_eq!(memo.id, 1);
        assert_eq!(memo.attachments[0].name, "a.png");
        assert_eq!(memo.comments[0].body, "c1");
        assert_eq!(memo.tags[0].name, "k");
        assert_eq!(memo.user.name, "alice");
    }
}
