//! Import/Export Commands
//!
//! Export hands the caller's items to the codec. Import detects the format,
//! decodes, then adds items one by one through the regular add path. The
//! first failing item stops the import; items added before it stay.

use thiserror::Error;

use crate::codec::{self, CodecError, Format};
use crate::domain::{DomainError, DomainResult, TodoDraft, TodoItem, UserIdentity};
use crate::repository::Repository;
use crate::AppState;
use super::todo_cmd::add_todo;

pub const MISSING_FORMAT: &str = "Missing format";

/// A rendered export, ready to be sent as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: &'static str,
}

/// Result of a completed import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub format: Format,
    pub imported: usize,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import failed: unrecognized import format")]
    UnrecognizedFormat,

    #[error("Import failed: {0}")]
    Decode(#[from] CodecError),

    #[error("Import failed: item {index} of {total}: {msg}", msg = .source.message())]
    Item {
        /// 1-based position of the failing item
        index: usize,
        total: usize,
        source: DomainError,
    },
}

impl ImportError {
    /// Items that were stored before the import stopped
    pub fn committed(&self) -> usize {
        match self {
            ImportError::Item { index, .. } => index - 1,
            _ => 0,
        }
    }
}

/// Encode `items` in the requested format. Anything but `json`/`xml` is a
/// client error.
pub fn export_items(items: &[TodoItem], format: Option<&str>) -> DomainResult<ExportFile> {
    let format = format
        .and_then(Format::from_param)
        .ok_or_else(|| DomainError::Validation(MISSING_FORMAT.to_string()))?;

    let bytes = match format {
        Format::Json => codec::encode_json(items),
        Format::Xml => codec::encode_xml(items).map_err(|e| DomainError::Internal(e.to_string()))?,
    };

    Ok(ExportFile {
        bytes,
        content_type: format.content_type(),
        file_name: format.file_name(),
    })
}

/// Export all of the caller's items
pub async fn export_todos(
    state: &AppState,
    user: &UserIdentity,
    format: Option<&str>,
) -> DomainResult<ExportFile> {
    log::info!("Export for {} as {:?}", user.name, format);
    let items = state.todo_repo.list_by_owner(&user.name).await?;
    export_items(&items, format)
}

/// Import a JSON or XML document of items for the caller
pub async fn import_todos(
    state: &AppState,
    user: &UserIdentity,
    text: &str,
) -> Result<ImportReport, ImportError> {
    let text = codec::strip_bom(text);
    let format = codec::detect_format(text).ok_or(ImportError::UnrecognizedFormat)?;
    let candidates: Vec<TodoItem> = match format {
        Format::Xml => codec::decode_xml(text)?,
        Format::Json => codec::decode_json(text)?,
    };

    let total = candidates.len();
    log::info!("Importing {} items for {} from {:?}", total, user.name, format);

    for (position, candidate) in candidates.into_iter().enumerate() {
        let draft = TodoDraft::from(candidate);
        if let Err(source) = add_todo(state, user, &draft).await {
            let err = ImportError::Item {
                index: position + 1,
                total,
                source,
            };
            log::warn!("{} ({} items kept)", err, err.committed());
            return Err(err);
        }
    }

    Ok(ImportReport {
        format,
        imported: total,
    })
}
