//! Symbol to prefix-code mapping derived from a [`HuffmanTree`], plus the
//! plain-text code-table file format (`<symbol-byte>=<code-bits>\n`).

use std::collections::BTreeMap;
use std::io::{Read, Write};

use bitvec::prelude::*;
use tracing::debug;

use crate::bit_packer::{self, Bits};
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Bits>,
}

impl CodeTable {
    /// Left edges append `0`, right edges `1`. A tree that is a single leaf
    /// gives its symbol the code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        match &tree.root {
            HuffNode::Leaf { byte, .. } => {
                codes.insert(*byte, bitvec![u8, Msb0; 0]);
            }
            root => {
                let mut path = Bits::new();
                walk(root, &mut path, &mut codes);
            }
        }
        debug!(symbols = codes.len(), "derived code table");
        CodeTable { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|code| code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        self.codes.iter().map(|(&s, code)| (s, code.as_bitslice()))
    }

    /// Concatenates the code of every byte of `data`, in order.
    pub fn encode(&self, data: &[u8]) -> Result<Bits> {
        let mut bits = Bits::new();
        for &byte in data {
            let code = self
                .codes
                .get(&byte)
                .ok_or(HuffmanError::UnknownSymbol(byte))?;
            bits.extend_from_bitslice(code);
        }
        debug!(symbols = data.len(), bits = bits.len(), "encoded input");
        Ok(bits)
    }

    /// Σ count × code length over `frequencies`.
    pub fn weighted_length(&self, frequencies: &FrequencyTable) -> Result<usize> {
        frequencies.iter().try_fold(0usize, |acc, (symbol, count)| {
            let code = self
                .codes
                .get(&symbol)
                .ok_or(HuffmanError::UnknownSymbol(symbol))?;
            Ok(acc + count * code.len())
        })
    }

    /// True when no code is a prefix of another and none is empty.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&Bits> = self.codes.values().collect();
        codes.iter().all(|c| !c.is_empty())
            && codes.iter().enumerate().all(|(i, a)| {
                codes
                    .iter()
                    .enumerate()
                    .all(|(j, b)| i == j || !b.starts_with(a.as_bitslice()))
            })
    }

    /// Writes one `<symbol-byte>=<code-bits>\n` line per symbol in ascending
    /// symbol order.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (&symbol, code) in &self.codes {
            writer.write_all(&[symbol, b'='])?;
            writer.write_all(bit_packer::to_digits(code).as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Parses the format produced by [`CodeTable::write_to`].
    ///
    /// The symbol is always the single byte at the start of a line, so `=`
    /// and `\n` symbols read back unambiguously.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut codes = BTreeMap::new();
        let mut pos = 0;
        while pos < data.len() {
            let symbol = data[pos];
            if data.get(pos + 1) != Some(&b'=') {
                return Err(HuffmanError::malformed(format!(
                    "expected '=' after symbol {symbol:#04x} at offset {pos}"
                )));
            }
            let start = pos + 2;
            let end = data[start..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|n| start + n)
                .ok_or_else(|| {
                    HuffmanError::malformed(format!("unterminated code for symbol {symbol:#04x}"))
                })?;

            let code = bit_packer::parse_digits(&data[start..end])?;
            if code.is_empty() {
                return Err(HuffmanError::malformed(format!(
                    "empty code for symbol {symbol:#04x}"
                )));
            }
            if codes.insert(symbol, code).is_some() {
                return Err(HuffmanError::malformed(format!(
                    "symbol {symbol:#04x} listed twice"
                )));
            }
            pos = end + 1;
        }

        let table = CodeTable { codes };
        if !table.is_prefix_free() {
            return Err(HuffmanError::malformed("codes are not prefix free"));
        }
        Ok(table)
    }
}

fn walk(node: &HuffNode, path: &mut Bits, codes: &mut BTreeMap<u8, Bits>) {
    match node {
        HuffNode::Leaf { byte, .. } => {
            codes.insert(*byte, path.clone());
        }
        HuffNode::Internal { left, right, .. } => {
            path.push(false);
            walk(left, path, codes);
            path.pop();

            path.push(true);
            walk(right, path, codes);
            path.pop();
        }
    }
}
