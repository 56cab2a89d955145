use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use life_board_core::CellCoord;
use life_board_state::BoardState;
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "life";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "life:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Board captured as its dimensions and the coordinates of its live cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoardSnapshot {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) live: Vec<CellCoord>,
}

impl BoardSnapshot {
    pub(crate) fn capture(state: &BoardState) -> Self {
        Self {
            width: state.width(),
            height: state.height(),
            live: state.cells().live_cells().collect(),
        }
    }

    /// Encodes the snapshot into a single-line string suitable for copy and paste.
    pub(crate) fn encode(&self) -> Result<String, TransferError> {
        let payload = SerializablePayload {
            live: self.live.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(TransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.width, self.height
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, TransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
        let version = parts.next().ok_or(TransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(TransferError::MissingPayload)?;
        if let Some(extra) = parts.next() {
            return Err(TransferError::TrailingSegment(extra.to_owned()));
        }

        if domain != SNAPSHOT_DOMAIN {
            return Err(TransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(TransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(TransferError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

        let mut seen = HashSet::with_capacity(decoded.live.len());
        for cell in &decoded.live {
            if cell.x() >= width || cell.y() >= height {
                return Err(TransferError::CellOutOfBounds(*cell));
            }
            if !seen.insert(*cell) {
                return Err(TransferError::DuplicateCell(*cell));
            }
        }

        Ok(Self {
            width,
            height,
            live: decoded.live,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct SerializablePayload {
    live: Vec<CellCoord>,
}

/// Errors that can occur while decoding board transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransferError {
    #[error("board string was empty")]
    EmptyPayload,
    #[error("board string is missing the prefix")]
    MissingPrefix,
    #[error("board string is missing the version")]
    MissingVersion,
    #[error("board string is missing the board dimensions")]
    MissingDimensions,
    #[error("board string is missing the payload")]
    MissingPayload,
    #[error("board string has an unexpected trailing segment '{0}'")]
    TrailingSegment(String),
    #[error("board prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("board version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    #[error("could not decode board payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    #[error("could not parse board payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("live cell {0} lies outside the board")]
    CellOutOfBounds(CellCoord),
    #[error("live cell {0} is listed twice")]
    DuplicateCell(CellCoord),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let invalid = || TransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
