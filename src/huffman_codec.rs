use std::io::{Read, Write};

use bitvec::prelude::*;
use tracing::{debug, info};

use crate::bit_packer::{self, Bits};
use crate::code_table::CodeTable;
use crate::compressed_data::{self, CompressedData};
use crate::error::{HuffmanError, Result};
use crate::frequency::{CountWindow, FrequencyTable};
use crate::hufftree::{HuffNode, HuffmanTree};

/// Knobs for building a codec from a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecConfig {
    pub count_window: CountWindow,
}

impl CodecConfig {
    /// Counts frequencies over `[0, len - 1)`, reproducing the legacy
    /// compressor byte for byte. Encoding the same corpus then fails with
    /// `UnknownSymbol` whenever its last byte occurs nowhere else.
    pub fn legacy() -> Self {
        CodecConfig {
            count_window: CountWindow::ExcludeLast,
        }
    }
}

pub struct HuffmanCodec {
    tree: HuffmanTree,
    encode_table: CodeTable,
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(tree: HuffmanTree) -> Self {
        Self::with_config(tree, CodecConfig::default())
    }

    fn with_config(tree: HuffmanTree, config: CodecConfig) -> Self {
        let encode_table = tree.generate_table();
        HuffmanCodec {
            tree,
            encode_table,
            config,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, CodecConfig::default())
    }

    pub fn from_bytes_with(data: &[u8], config: CodecConfig) -> Result<Self> {
        let frequencies = FrequencyTable::from_bytes_with(data, config.count_window);
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        Ok(Self::with_config(tree, config))
    }

    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        Ok(Self::new(HuffmanTree::from_frequencies(frequencies)?))
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.encode_table
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// The logical bitstream, before packing.
    pub fn encode(&self, data: &[u8]) -> Result<Bits> {
        self.encode_table.encode(data)
    }

    /// Encoded and packed, with no framing.
    pub fn encode_packed(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(bit_packer::pack(&self.encode(data)?))
    }

    pub fn compress(&self, data: &[u8]) -> Result<CompressedData> {
        let bits = self.encode(data)?;
        let compressed = CompressedData {
            compressed_bits: bit_packer::pack(&bits),
            bit_count: bits.len(),
            tree_data: self.tree.serialize()?,
            original_length: data.len(),
        };
        info!(
            original = data.len(),
            bits = compressed.bit_count,
            packed = compressed.compressed_bits.len(),
            "compressed"
        );
        Ok(compressed)
    }

    /// Rebuilds the tree stored in the frame and decodes its payload.
    pub fn decode(compressed: &CompressedData) -> Result<Vec<u8>> {
        compressed_data::check_lengths(compressed.original_length, compressed.bit_count)?;
        let codec = HuffmanCodec::new(HuffmanTree::deserialize(&compressed.tree_data)?);
        let bits = bit_packer::unpack(&compressed.compressed_bits, compressed.bit_count)?;
        codec.decode_bits(&bits, compressed.original_length)
    }

    /// Walks the tree once per symbol, taking one bit per edge. All of
    /// `bits` must be consumed by exactly `symbol_count` symbols.
    pub fn decode_bits(&self, bits: &BitSlice<u8, Msb0>, symbol_count: usize) -> Result<Vec<u8>> {
        let mut result = Vec::with_capacity(symbol_count.min(bits.len()));
        let mut bit_index = 0;

        while result.len() < symbol_count {
            let mut current_node = &self.tree.root;

            if let HuffNode::Leaf { byte, .. } = current_node {
                // A lone leaf is coded as a single 0 bit.
                match bits.get(bit_index).map(|bit| *bit) {
                    Some(false) => {}
                    Some(true) => {
                        return Err(HuffmanError::malformed(format!(
                            "bit {bit_index} is not a valid code"
                        )))
                    }
                    None => return Err(ran_out(result.len(), symbol_count)),
                }
                bit_index += 1;
                result.push(*byte);
                continue;
            }

            loop {
                match current_node {
                    HuffNode::Leaf { byte, .. } => {
                        result.push(*byte);
                        break;
                    }
                    HuffNode::Internal { left, right, .. } => {
                        let bit = match bits.get(bit_index) {
                            Some(bit) => *bit,
                            None => return Err(ran_out(result.len(), symbol_count)),
                        };
                        bit_index += 1;
                        current_node = if bit { right } else { left };
                    }
                }
            }
        }

        if bit_index != bits.len() {
            return Err(HuffmanError::malformed(format!(
                "{} trailing bits after {symbol_count} symbols",
                bits.len() - bit_index
            )));
        }

        debug!(symbols = result.len(), bits = bit_index, "decoded bitstream");
        Ok(result)
    }

    /// Reads all of `input`, builds a codec from it and writes a framed
    /// container to `output`.
    pub fn encode_from_file<R: Read, W: Write>(mut input: R, output: W) -> Result<CompressedData> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        let codec = HuffmanCodec::from_bytes(&data)?;
        let compressed = codec.compress(&data)?;
        compressed.write_to(output)?;
        Ok(compressed)
    }

    pub fn decode_from_file<R: Read, W: Write>(input: R, mut output: W) -> Result<usize> {
        let compressed = CompressedData::read_from(input)?;
        let decoded = Self::decode(&compressed)?;
        output.write_all(&decoded)?;
        output.flush()?;
        Ok(decoded.len())
    }
}

fn ran_out(decoded: usize, expected: usize) -> HuffmanError {
    HuffmanError::malformed(format!(
        "ran out of bits after {decoded} of {expected} symbols"
    ))
}
