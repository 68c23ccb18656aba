/// Ingestion pipeline: turns paste/drop input events into normalized items
/// for the holding area.
///
/// Per event: filter out non-image payloads (MIME prefix check) and
/// board-internal rearrange drops, normalize each accepted entry through
/// the image codec, and commit the results. Entries in one event are
/// processed concurrently; each gets a distinct id from a shared batch
/// timestamp plus its offset, so commit order across entries is
/// unspecified but ids never collide.

use std::path::{Path, PathBuf};
use tokio::task::JoinSet;

use crate::board::item::{batch_id, batch_stamp, Item};
use crate::codec;

/// One clipboard entry from a paste event
#[derive(Debug, Clone)]
pub struct ClipboardEntry {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// One file from a drop event
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PasteEvent {
    pub entries: Vec<ClipboardEntry>,
}

#[derive(Debug, Clone)]
pub struct DropEvent {
    /// Set when the drop is an item being rearranged within the board
    /// (the drag coordinator's business, not the pipeline's)
    pub internal_move: bool,
    pub files: Vec<DroppedFile>,
}

/// A document-level input event the pipeline listens for
#[derive(Debug, Clone)]
pub enum InputEvent {
    Paste(PasteEvent),
    Drop(DropEvent),
}

/// The ingestion pipeline. Cheap to copy; carries only the codec's target
/// height (derived from the board context at construction).
#[derive(Debug, Clone, Copy)]
pub struct IngestionPipeline {
    target_height: u32,
}

impl IngestionPipeline {
    pub fn new(target_height: u32) -> Self {
        IngestionPipeline { target_height }
    }

    /// Process one input event into items ready for the holding area.
    ///
    /// Accepted entries decode concurrently and the returned order is
    /// completion order. Entries that fail to decode are dropped silently
    /// without aborting the rest of the batch.
    pub async fn ingest(self, event: InputEvent) -> Vec<Item> {
        let payloads: Vec<(String, Vec<u8>)> = match event {
            InputEvent::Drop(drop) if drop.internal_move => Vec::new(),
            InputEvent::Drop(drop) => drop
                .files
                .into_iter()
                .map(|file| (file.mime, file.bytes))
                .collect(),
            InputEvent::Paste(paste) => paste
                .entries
                .into_iter()
                .map(|entry| (entry.mime, entry.bytes))
                .collect(),
        };

        let stamp = batch_stamp();
        let mut decodes = JoinSet::new();
        for (offset, (mime, bytes)) in payloads.into_iter().enumerate() {
            if !mime.starts_with("image/") {
                continue;
            }
            let target_height = self.target_height;
            decodes.spawn(async move {
                match codec::encode_image(bytes, target_height).await {
                    Ok(image_data) => Some(Item::new(batch_id(stamp, offset), image_data)),
                    Err(_) => None,
                }
            });
        }

        let mut items = Vec::new();
        while let Some(finished) = decodes.join_next().await {
            match finished {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(e) => eprintln!("Ingestion task failed: {}", e),
            }
        }
        items
    }
}

/// Read a file dropped on the window into a pipeline payload, with the
/// MIME type guessed from the extension
pub async fn read_dropped_file(path: PathBuf) -> std::io::Result<DroppedFile> {
    let bytes = tokio::fs::read(&path).await?;
    Ok(DroppedFile {
        mime: mime_for_path(&path).to_string(),
        bytes,
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
