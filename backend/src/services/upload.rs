//! Receives the spreadsheet part of a multipart upload.
//!
//! The `file` field is streamed into a temporary file inside the upload directory while its
//! md5 is computed. The temporary file is deleted when the returned `UploadedSheet` is dropped,
//! i.e. once the handler has finished with it.

use crate::error::UploadError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use md5::Context;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

const ACCEPTED_EXTENSIONS: [&str; 3] = [".csv", ".tsv", ".txt"];

pub(crate) struct UploadedSheet {
    pub file: NamedTempFile,
    pub filename: String,
    pub md5: String,
    pub size: usize,
}

pub(crate) async fn receive_spreadsheet(
    mut payload: Multipart,
    upload_dir: &Path,
) -> Result<UploadedSheet, UploadError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            // Drain parts we do not use so the stream can advance.
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let lower = filename.to_lowercase();
        if !ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(UploadError::UnsupportedType(filename));
        }

        let file = Builder::new()
            .prefix("sheet-")
            .suffix(".csv")
            .tempfile_in(upload_dir)?;
        let mut writer = BufWriter::new(file.as_file());
        let mut hasher = Context::new();
        let mut size = 0usize;

        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            hasher.consume(&chunk);
            size += chunk.len();
            writer.write_all(&chunk)?;
        }
        writer.flush()?;
        drop(writer);

        return Ok(UploadedSheet {
            file,
            filename,
            md5: format!("{:x}", hasher.finalize()),
            size,
        });
    }

    Err(UploadError::MissingFile)
}
