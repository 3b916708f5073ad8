//! Run-length encoding of binary masks in the Kaggle submission format.
//!
//! The format lists `start length` pairs separated by spaces, where `start` is the
//! 1-based position of a run of foreground pixels in row-major order.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RleError {
    #[error("invalid run-length token: '{token}'")]
    InvalidToken { token: String },

    #[error("run-length encoding has an odd number of values")]
    OddTokenCount,

    #[error("run starting at {start} with length {length} exceeds mask of {len} pixels")]
    OutOfBounds {
        start: usize,
        length: usize,
        len: usize,
    },
}

pub type RleResult<T> = Result<T, RleError>;

/// Encode the foreground pixels (value >= 0.5) of a flattened mask.
pub fn rle_encode(mask: &[f32]) -> String {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (index, &value) in mask.iter().enumerate() {
        if value >= 0.5 {
            current = match current {
                Some((start, length)) => Some((start, length + 1)),
                None => Some((index + 1, 1)),
            };
        } else if let Some(run) = current.take() {
            runs.push(run);
        }
    }
    runs.extend(current);

    runs.iter()
        .map(|(start, length)| format!("{start} {length}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a run-length string into a flattened mask of `len` pixels.
pub fn rle_decode(rle: &str, len: usize) -> RleResult<Vec<f32>> {
    let values = rle
        .split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| RleError::InvalidToken {
                token: token.to_owned(),
            })
        })
        .collect::<RleResult<Vec<_>>>()?;

    if values.len() % 2 != 0 {
        return Err(RleError::OddTokenCount);
    }

    let mut mask = vec![0.0; len];
    for pair in values.chunks_exact(2) {
        let (start, length) = (pair[0], pair[1]);
        let end = start
            .checked_sub(1)
            .and_then(|offset| offset.checked_add(length))
            .filter(|&end| end <= len)
            .ok_or(RleError::OutOfBounds { start, length, len })?;
        mask[start - 1..end].fill(1.0);
    }

    Ok(mask)
}
