//! Local validation, run before any network call.

use mime::Mime;
use thiserror::Error;

use super::types::{DocumentCategory, UploadTask};

/// Problems detected locally. Never sent over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{file_name} is empty")]
    EmptyFile { file_name: String },

    #[error("{file_name} is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("{file_name} has an invalid content type: {content_type}")]
    InvalidContentType {
        file_name: String,
        content_type: String,
    },

    #[error("{file_name} ({content_type}) is not accepted for {category} documents")]
    UnsupportedContentType {
        file_name: String,
        content_type: String,
        category: DocumentCategory,
    },

    #[error("{codes} access codes given for {urls} documents")]
    AccessCodeMismatch { urls: usize, codes: usize },
}

/// Checks one task against the size limit and its category's content types.
pub fn validate_task(task: &UploadTask, max_file_bytes: u64) -> Result<(), ValidationError> {
    let file = &task.file;

    if file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile {
            file_name: file.file_name.clone(),
        });
    }

    if file.size() > max_file_bytes {
        return Err(ValidationError::FileTooLarge {
            file_name: file.file_name.clone(),
            size: file.size(),
            limit: max_file_bytes,
        });
    }

    let mime: Mime = file
        .content_type
        .parse()
        .map_err(|_| ValidationError::InvalidContentType {
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
        })?;

    let essence = mime.essence_str().to_ascii_lowercase();
    if !task
        .category
        .accepted_content_types()
        .iter()
        .any(|accepted| *accepted == essence)
    {
        return Err(ValidationError::UnsupportedContentType {
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            category: task.category,
        });
    }

    Ok(())
}

/// Pairs access codes with URLs by position; missing codes become "".
pub fn pair_access_codes(
    url_count: usize,
    access_codes: &[Option<String>],
) -> Result<Vec<String>, ValidationError> {
    if access_codes.len() > url_count {
        return Err(ValidationError::AccessCodeMismatch {
            urls: url_count,
            codes: access_codes.len(),
        });
    }

    Ok((0..url_count)
        .map(|i| access_codes.get(i).cloned().flatten().unwrap_or_default())
        .collect())
}
