//! Batch deletion of memos matching a query.
//!
//! Destructive and deliberately separate from the migration pipeline. The
//! CLI requires an explicit confirmation phrase before calling
//! [`remove_memos`]; this module only finds and deletes.

use futures_util::future::try_join_all;

use crate::api::DocbaseClient;
use crate::api::types::Memo;
use crate::error::{MigrationError, Result};

/// One listing page is the blast radius cap for a single removal run.
pub const REMOVE_PAGE_SIZE: u64 = 100;

/// Find up to one page of memos matching `query`.
pub async fn find_memos(client: &DocbaseClient, query: &str) -> Result<Vec<Memo>> {
    let page = client.list_memos(query, 0, REMOVE_PAGE_SIZE).await?;
    Ok(page.posts)
}

/// Delete all given memos, fanned out concurrently.
pub async fn remove_memos(client: &DocbaseClient, memos: &[Memo]) -> Result<()> {
    try_join_all(memos.iter().map(|memo| async move {
        client.delete_memo(memo.id).await?;
        tracing::info!("deleted {}: {}", memo.id, memo.title);
        Ok::<(), MigrationError>(())
    }))
    .await?;
    Ok(())
}
