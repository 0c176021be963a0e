//! Error types for the Huffman codec.

use std::io;

/// Result type alias using [`HuffmanError`].
pub type Result<T> = std::result::Result<T, HuffmanError>;

/// Errors raised while building, encoding, packing or decoding.
#[derive(Debug, thiserror::Error)]
pub enum HuffmanError {
    /// No symbols to build a tree from.
    #[error("cannot build a Huffman tree from empty input")]
    EmptyInput,

    /// A symbol to encode has no entry in the code table.
    #[error("symbol {0:#04x} has no code in the code table")]
    UnknownSymbol(u8),

    /// A bit sequence, code table or frame could not be decoded.
    #[error("malformed code: {0}")]
    MalformedCode(String),

    /// Underlying storage failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HuffmanError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        HuffmanError::MalformedCode(msg.into())
    }
}
