//! File transfer commands.
//!
//! Files are announced by metadata only: name and size come from the file
//! system, the bytes are read by the transport when it uploads them.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use parley_engine::{Draft, DraftFile};
use parley_shared::types::{AttachmentId, MessageId};
use parley_shared::validation::validate_file_size;

use crate::commands::messaging::submit;
use crate::error::Result;
use crate::state::{lock, SharedState};
use crate::transport::{dispatch, SendKind, TransportCommand};

/// Read the metadata of a file picked for upload and check its size.
pub async fn draft_file(path: impl AsRef<Path>, max_size: u64) -> Result<DraftFile> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a regular file: {}", path.display()),
        )
        .into());
    }
    validate_file_size(metadata.len(), max_size)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(DraftFile {
        file_name,
        size_bytes: Some(metadata.len()),
        path: path.to_path_buf(),
    })
}

async fn draft_files(state: &SharedState, paths: &[PathBuf]) -> Result<Vec<DraftFile>> {
    let max_size = lock(state)?.config.max_file_size;
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(draft_file(path, max_size).await?);
    }
    Ok(files)
}

/// Send a message together with one or more files.
///
/// Every file is checked before anything is appended, so a bad path leaves
/// the timeline untouched.
pub async fn send_message_with_files(
    state: &SharedState,
    mut draft: Draft,
    paths: &[PathBuf],
) -> Result<MessageId> {
    draft.files.extend(draft_files(state, paths).await?);
    debug!(files = draft.files.len(), "Sending message with files");
    submit(state, draft, SendKind::MessageWithFiles).await
}

/// Send a single file, optionally captioned.
pub async fn send_file(
    state: &SharedState,
    path: impl AsRef<Path>,
    caption: Option<String>,
) -> Result<MessageId> {
    let max_size = lock(state)?.config.max_file_size;
    let file = draft_file(path, max_size).await?;
    let draft = Draft::text(caption.unwrap_or_default()).with_file(file);
    submit(state, draft, SendKind::File).await
}

/// Abort an upload. The attachment is Aborted as soon as this returns; the
/// cancellation request to the transport is best effort.
pub async fn abort_upload(state: &SharedState, id: &AttachmentId) -> Result<AttachmentId> {
    let (aborted, tx) = {
        let mut guard = lock(state)?;
        let aborted = guard.chat.abort_upload(id);
        if aborted {
            guard.publish();
        }
        (aborted, guard.command_tx.clone())
    };

    if let (true, Some(tx)) = (aborted, tx) {
        if let Err(e) = dispatch(&tx, TransportCommand::AbortUpload(id.clone())).await {
            warn!(attachment_id = %id, error = %e, "Could not forward cancellation");
        }
        info!(attachment_id = %id, "Upload cancelled");
    }
    Ok(id.clone())
}
