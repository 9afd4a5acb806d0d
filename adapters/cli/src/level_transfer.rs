use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use contagion_core::{Adjacency, LevelTemplate, TemplateError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CODE_DOMAIN: &str = "level";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "level:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Debug, Serialize, Deserialize)]
struct LevelPayload {
    title: String,
    #[serde(default)]
    adjacency: Adjacency,
    layout: Vec<String>,
}

/// Errors that can occur while encoding or decoding level codes.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("level code was empty")]
    EmptyPayload,
    /// The encoded level did not contain all of its segments.
    #[error("level code is missing the {0}")]
    MissingSegment(&'static str),
    /// The encoded level used an unexpected prefix segment.
    #[error("level code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("level code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process level payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The decoded layout is not a valid level.
    #[error("level payload describes an invalid layout: {0}")]
    InvalidLayout(#[from] TemplateError),
    /// The header dimensions disagree with the decoded layout.
    #[error("level code declares {declared:?} but the layout is {actual:?}")]
    DimensionMismatch {
        /// Columns and rows stated in the header.
        declared: (u32, u32),
        /// Columns and rows of the decoded layout.
        actual: (u32, u32),
    },
}

/// Encodes a level template into a single-line sharing string.
pub(crate) fn encode(template: &LevelTemplate) -> Result<String, LevelTransferError> {
    let payload = LevelPayload {
        title: template.title().to_owned(),
        adjacency: template.adjacency(),
        layout: template.to_ascii(),
    };
    let json = serde_json::to_vec(&payload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_HEADER}:{}x{}:{encoded}",
        template.columns(),
        template.rows()
    ))
}

/// Decodes a level template from its sharing string.
pub(crate) fn decode(value: &str) -> Result<LevelTemplate, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts
        .next()
        .ok_or(LevelTransferError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(LevelTransferError::MissingSegment("version"))?;
    let dimensions = parts
        .next()
        .ok_or(LevelTransferError::MissingSegment("grid dimensions"))?;
    let payload = parts
        .next()
        .ok_or(LevelTransferError::MissingSegment("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let declared = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let decoded: LevelPayload = serde_json::from_slice(&bytes)?;
    let template =
        LevelTemplate::from_ascii(decoded.title, decoded.adjacency, &decoded.layout.join("\n"))?;

    let actual = (template.columns(), template.rows());
    if actual != declared {
        return Err(LevelTransferError::DimensionMismatch { declared, actual });
    }
    Ok(template)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LevelTransferError> {
    let invalid = || LevelTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}
