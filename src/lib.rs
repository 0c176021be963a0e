//! # static_huffman
//!
//! Static Huffman compression of text: count byte frequencies, build the
//! prefix-code tree, derive the code table, and pack the encoded bits.
//!
//! ## Quick Start
//!
//! ```rust
//! use static_huffman::{bit_packer, HuffmanCodec};
//!
//! let text = b"aaabbc";
//! let codec = HuffmanCodec::from_bytes(text)?;
//!
//! // Raw payload, no framing
//! let bits = codec.encode(text)?;
//! assert_eq!(bit_packer::to_digits(&bits), "000111110");
//! assert_eq!(bit_packer::pack(&bits), vec![0b0001_1111, 0]);
//!
//! // Framed container that records the bit count, and back
//! let compressed = codec.compress(text)?;
//! assert_eq!(HuffmanCodec::decode(&compressed)?, text);
//! # Ok::<(), static_huffman::HuffmanError>(())
//! ```

pub mod bit_packer;
pub mod code_table;
pub mod compressed_data;
pub mod corpus;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod stats;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use code_table::CodeTable;
pub use compressed_data::CompressedData;
pub use error::{HuffmanError, Result};
pub use frequency::{CountWindow, FrequencyTable};
pub use huffman_codec::{CodecConfig, HuffmanCodec};
pub use hufftree::{HuffNode, HuffmanTree};
pub use stats::CompressionStats;
