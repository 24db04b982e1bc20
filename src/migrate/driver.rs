//! Top-level migration control loop.
//!
//! Pages through source memos that lack the `exported` sentinel tag,
//! migrates each one (attachments → memo → comments), then tags the source
//! memo so re-runs skip it. Memos migrate strictly one at a time; the only
//! fan-out is comment creation within a single memo.

use futures_util::future::try_join_all;

use super::attachments::migrate_attachments;
use super::rewrite::{order_for_rewrite, rewrite_attachment_urls};
use crate::api::client::DocbaseClient;
use crate::api::types::{Memo, MemoUpdate, NewComment, NewMemo, Scope};
use crate::error::{MigrationError, Result};

/// Sentinel tag marking a source memo as already migrated. Listing queries
/// exclude it, which is what makes repeated runs idempotent.
pub const EXPORTED_TAG: &str = "exported";

/// Destination-side knobs for a migration run.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Destination group ids the migrated memos are shared with.
    pub groups: Vec<u64>,
    /// Destination author the migrated memos and comments are attributed to.
    pub author_id: u64,
    /// Listing page size.
    pub page_size: u64,
}

/// Drives one migration run between two explicitly injected tenant clients.
pub struct MigrationDriver {
    source: DocbaseClient,
    destination: DocbaseClient,
    options: MigrationOptions,
    imported_tag: String,
}

impl MigrationDriver {
    /// Create a driver for one run.
    ///
    /// The imported sentinel embeds the run's start time
    /// (`imported-YYYYMMDD-HHMM`) so repeated runs stay distinguishable on
    /// the destination.
    pub fn new(
        source: DocbaseClient,
        destination: DocbaseClient,
        options: MigrationOptions,
    ) -> Self {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M");
        Self::with_imported_tag(source, destination, options, format!("imported-{stamp}"))
    }

    /// Create a driver with a pinned imported tag (tests need it
    /// deterministic).
    pub fn with_imported_tag(
        source: DocbaseClient,
        destination: DocbaseClient,
        options: MigrationOptions,
        imported_tag: String,
    ) -> Self {
        Self {
            source,
            destination,
            options,
            imported_tag,
        }
    }

    /// The sentinel tag this run stamps onto every migrated memo.
    pub fn imported_tag(&self) -> &str {
        &self.imported_tag
    }

    /// Run the migration to completion, returning the number of memos
    /// copied.
    ///
    /// Terminates on the first empty page, or once the count of migrated
    /// memos reaches the server-reported total for the exclusion query.
    pub async fn run(&self) -> Result<u64> {
        let query = format!("-tag:{EXPORTED_TAG}");
        let mut imported: u64 = 0;
        let mut page: u64 = 0;

        loop {
            let listing = self
                .source
                .list_memos(&query, page, self.options.page_size)
                .await?;
            if listing.posts.is_empty() {
                break;
            }
            let total = listing.meta.total;

            for memo in &listing.posts {
                tracing::info!("({imported}/{total}) [{}]: importing {}", memo.id, memo.title);
                self.copy_memo(memo).await?;
                self.tag_source(memo).await?;
                tracing::info!("({imported}/{total}) [{}]: imported", memo.id);
                imported += 1;
            }

            page += 1;
            if total <= imported {
                break;
            }
        }

        Ok(imported)
    }

    /// Copy one memo to the destination: attachments first (the body needs
    /// the rewritten URLs), then the memo, then its comments fanned out
    /// concurrently (they need the new memo id).
    async fn copy_memo(&self, memo: &Memo) -> Result<()> {
        let maps = migrate_attachments(
            &self.source,
            &self.destination,
            &memo.attachments,
            Some(self.options.author_id),
        )
        .await?;
        let maps = order_for_rewrite(maps);

        let mut tags: Vec<String> = memo.tags.iter().map(|t| t.name.clone()).collect();
        tags.push(self.imported_tag.clone());

        let new_memo = NewMemo {
            title: memo.title.clone(),
            body: provenance_body(
                self.source.domain(),
                memo,
                &rewrite_attachment_urls(&memo.body, &maps),
            ),
            tags,
            scope: Some(Scope::Group),
            groups: Some(self.options.groups.clone()),
            published_at: Some(memo.created_at.clone()),
            author_id: Some(self.options.author_id),
        };
        let created_id = self.destination.create_memo(&new_memo).await?.id;
        tracing::info!("[done] created memo {created_id}");

        try_join_all(memo.comments.iter().map(|comment| {
            let comment = NewComment {
                body: rewrite_attachment_urls(&comment.body, &maps),
                author_id: Some(self.options.author_id),
                published_at: Some(comment.created_at.clone()),
            };
            async move {
                self.destination.create_comment(created_id, &comment).await?;
                tracing::info!("[done] created comment on memo {created_id}");
                Ok::<(), MigrationError>(())
            }
        }))
        .await?;

        Ok(())
    }

    /// Mark the source memo as handled, preserving its pre-existing tags.
    async fn tag_source(&self, memo: &Memo) -> Result<()> {
        let mut tags = vec![EXPORTED_TAG.to_owned()];
        tags.extend(memo.tags.iter().map(|t| t.name.clone()));
        let update = MemoUpdate {
            tags: Some(tags),
            ..MemoUpdate::new(memo.id)
        };
        self.source.update_memo(&update).await?;
        Ok(())
    }
}

/// Prefix the rewritten body with a provenance header naming the original
/// memo, author and publication date.
fn provenance_body(source_domain: &str, memo: &Memo, rewritten: &str) -> String {
    format!(
        "original-id: {source_domain}-{}\noriginal author: {}, original published: {}\n\n{rewritten}",
        memo.id, memo.user.name, memo.created_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::User;

    fn memo() -> Memo {
        Memo {
            id: 12,
            title: "T".into(),
            body: "body".into(),
            created_at: "2020-01-01T00:00:00+09:00".into(),
            updated_at: String::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            tags: Vec::new(),
            user: User {
                id: 1,
                name: "alice".into(),
                profile_image_url: String::new(),
            },
            groups: Vec::new(),
            sharing_url: String::new(),
        }
    }

    #[test]
    fn provenance_header_names_origin() {
        let body = provenance_body("acme", &memo(), "rewritten body");
        assert!(body.starts_with("original-id: acme-12\n"));
        assert!(body.contains("original author: alice"));
        assert!(body.contains("original published: 2020-01-01T00:00:00+09:00"));
        assert!(body.ends_with("\n\nrewritten body"));
    }
}
