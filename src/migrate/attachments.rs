//! Re-uploads one memo's attachments to the destination tenant.

use crate::api::client::{AttachmentFile, DocbaseClient};
use crate::api::types::{Attachment, UploadedAttachment};
use crate::error::{MigrationError, Result};

/// Correlates one attachment's name with its old and new retrieval URLs.
///
/// Scoped to a single memo and a single run; discarded once the memo and
/// its comments have been written to the destination. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMap {
    /// Attachment display name; the correlation key.
    pub name: String,
    /// Retrieval URL on the source tenant.
    pub source_url: String,
    /// Retrieval URL on the destination tenant. Empty until the upload
    /// response has been matched by name.
    pub dest_url: String,
}

/// Download every attachment of one memo from the source tenant, upload the
/// whole batch to the destination in a single call, and return the completed
/// name → URL mapping.
///
/// Batching keeps the name-correlation problem bounded to one memo at a
/// time. A memo with no attachments short-circuits without an upload call.
///
/// # Errors
///
/// Returns [`MigrationError::Correlation`] when an uploaded entry has no
/// pending map entry with its name, or when a map entry is left without a
/// destination URL after the whole response has been applied. Either way the
/// memo body could not be rewritten safely.
pub async fn migrate_attachments(
    source: &DocbaseClient,
    destination: &DocbaseClient,
    attachments: &[Attachment],
    author_id: Option<u64>,
) -> Result<Vec<AttachmentMap>> {
    if attachments.is_empty() {
        return Ok(Vec::new());
    }

    let mut uploads = Vec::with_capacity(attachments.len());
    let mut maps = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let content = source.get_attachment(attachment.id).await?;
        uploads.push(AttachmentFile {
            name: attachment.name.clone(),
            content,
        });
        maps.push(AttachmentMap {
            name: attachment.name.clone(),
            source_url: attachment.url.clone(),
            dest_url: String::new(),
        });
    }

    let uploaded = destination.upload_attachments(&uploads, author_id).await?;
    apply_uploads(&mut maps, &uploaded)?;
    tracing::debug!(?maps, "attachment map completed");
    Ok(maps)
}

/// Fill destination URLs from an upload response, matching by name.
///
/// The response may arrive in any order. Duplicate names within one memo
/// pair up first-pending-entry-wins; the API does not guarantee global name
/// uniqueness, only per-memo practice.
fn apply_uploads(maps: &mut [AttachmentMap], uploaded: &[UploadedAttachment]) -> Result<()> {
    for entry in uploaded {
        let map = maps
            .iter_mut()
            .find(|m| m.name == entry.name && m.dest_url.is_empty())
            .ok_or_else(|| {
                MigrationError::Correlation(format!(
                    "uploaded attachment {:?} has no pending map entry",
                    entry.name
                ))
            })?;
        map.dest_url = entry.url.clone();
    }

    if let Some(unmatched) = maps.iter().find(|m| m.dest_url.is_empty()) {
        return Err(MigrationError::Correlation(format!(
            "attachment {:?} missing from upload response",
            unmatched.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(name: &str, source_url: &str) -> AttachmentMap {
        AttachmentMap {
            name: name.to_owned(),
            source_url: source_url.to_owned(),
            dest_url: String::new(),
        }
    }

    fn uploaded(name: &str, url: &str) -> UploadedAttachment {
        UploadedAttachment {
            id: format!("id-{name}"),
            name: name.to_owned(),
            url: url.to_owned(),
        }
    }

    #[test]
    fn permuted_response_fills_every_entry() {
        let mut maps = vec![
            pending("a.png", "https://x/a.png"),
            pending("b.png", "https://x/b.png"),
            pending("c.png", "https://x/c.png"),
        ];
        let response = vec![
            uploaded("c.png", "https://y/c.png"),
            uploaded("a.png", "https://y/a.png"),
            uploaded("b.png", "https://y/b.png"),
        ];
        apply_uploads(&mut maps, &response).unwrap();
        assert_eq!(maps[0].dest_url, "https://y/a.png");
        assert_eq!(maps[1].dest_url, "https://y/b.png");
        assert_eq!(maps[2].dest_url, "https://y/c.png");
    }

    #[test]
    fn unknown_name_in_response_is_a_correlation_error() {
        let mut maps = vec![pending("a.png", "https://x/a.png")];
        let response = vec![uploaded("other.png", "https://y/other.png")];
        let err = apply_uploads(&mut maps, &response).unwrap_err();
        assert!(matches!(err, MigrationError::Correlation(_)));
    }

    #[test]
    fn name_missing_from_response_is_a_correlation_error() {
        let mut maps = vec![
            pending("a.png", "https://x/a.png"),
            pending("b.png", "https://x/b.png"),
        ];
        let response = vec![uploaded("a.png", "https://y/a.png")];
        let err = apply_uploads(&mut maps, &response).unwrap_err();
        match err {
            MigrationError::Correlation(msg) => assert!(msg.contains("b.png")),
            other => panic!("expected correlation error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_pair_up_in_order() {
        let mut maps = vec![
            pending("a.png", "https://x/1/a.png"),
            pending("a.png", "https://x/2/a.png"),
        ];
        let response = vec![
            uploaded("a.png", "https://y/1/a.png"),
            uploaded("a.png", "https://y/2/a.png"),
        ];
        apply_uploads(&mut maps, &response).unwrap();
        assert_eq!(maps[0].dest_url, "https://y/1/a.png");
        assert_eq!(maps[1].dest_url, "https://y/2/a.png");
    }
}
