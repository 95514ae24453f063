//! Recipe image uploads.
//!
//! A file is accepted when it has a name whose extension (the text after the last
//! `.`, compared case-insensitively) is whitelisted. Anything else is treated as if
//! no file had been sent. Accepted files are stored as
//! `<YYYYmmdd_HHMMSS>_<sanitized original name>`. File contents are never inspected.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use std::io;

use crate::storage::StorageService;

/// A file part taken from a multipart form.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// The extension after the final `.`, if the name has one.
pub fn extension_of(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

pub fn extension_allowed(file_name: &str, allowed: &[String]) -> bool {
    extension_of(file_name)
        .map(|ext| allowed.iter().any(|ok| ok.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// secure_filename
///
/// Reduces a client-supplied name to ASCII letters, digits, `_`, `-` and `.`.
/// Path separators and whitespace become `_`; leading and trailing `.`/`_` are
/// stripped, so the result can never name a parent or hidden path.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '-' | '.'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Builds the stored name for an accepted upload.
pub fn stored_name(original: &str, now: DateTime<Utc>) -> String {
    let (stem, ext) = original.rsplit_once('.').unwrap_or((original, ""));
    let stem = match secure_filename(stem) {
        s if s.is_empty() => "upload".to_string(),
        s => s,
    };
    let ext = secure_filename(ext);

    let timestamp = now.format("%Y%m%d_%H%M%S");
    if ext.is_empty() {
        format!("{timestamp}_{stem}")
    } else {
        format!("{timestamp}_{stem}.{ext}")
    }
}

/// accept_upload
///
/// Filters, renames and persists an optional upload. Returns the name to store in
/// `Recipe.image`, or `None` when there was nothing acceptable to store.
pub async fn accept_upload(
    storage: &dyn StorageService,
    allowed: &[String],
    file: Option<IncomingFile>,
) -> io::Result<Option<String>> {
    let Some(file) = file else {
        return Ok(None);
    };
    let Some(original) = file.file_name.filter(|name| !name.is_empty()) else {
        return Ok(None);
    };
    if !extension_allowed(&original, allowed) {
        tracing::info!(file = %original, "upload ignored: extension not allowed");
        return Ok(None);
    }

    let name = stored_name(&original, Utc::now());
    let stored = storage.store(&name, &file.data).await?;
    Ok(Some(stored))
}

/// Best-effort removal of an upload whose recipe write failed, so no file is left
/// behind that nothing references.
pub async fn discard_upload(storage: &dyn StorageService, name: Option<&str>) {
    let Some(name) = name else {
        return;
    };
    match storage.remove(name).await {
        Ok(()) => tracing::debug!(file = %name, "discarded upload of a failed write"),
        Err(e) => tracing::warn!(file = %name, "orphaned upload could not be removed: {}", e),
    }
}
