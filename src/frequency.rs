use std::collections::btree_map;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use tracing::debug;

use crate::error::{HuffmanError, Result};

/// Which part of the input participates in counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountWindow {
    /// Every symbol, `[0, len)`.
    #[default]
    Full,
    /// Legacy quirk: `[0, len - 1)`, the final symbol is never counted.
    ExcludeLast,
}

impl CountWindow {
    fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        match self {
            CountWindow::Full => bytes,
            CountWindow::ExcludeLast => &bytes[..bytes.len().saturating_sub(1)],
        }
    }
}

/// Occurrence count of each distinct byte.
///
/// Entries are kept in ascending symbol order, which is also the order
/// leaves enter the tree builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bytes_with(bytes, CountWindow::Full)
    }

    pub fn from_bytes_with(bytes: &[u8], window: CountWindow) -> Self {
        let counted = window.slice(bytes);
        let counts = counted
            .iter()
            .copied()
            .fold(BTreeMap::new(), |mut acc, byte| {
                *acc.entry(byte).or_insert(0) += 1;
                acc
            });

        debug!(
            input_len = bytes.len(),
            counted = counted.len(),
            distinct = counts.len(),
            "counted symbol frequencies"
        );
        FrequencyTable { counts }
    }

    /// Adds `count` occurrences of `symbol`. Zero counts are ignored so
    /// every stored entry stays at least one.
    pub fn add(&mut self, symbol: u8, count: usize) {
        if count > 0 {
            *self.counts.entry(symbol).or_insert(0) += count;
        }
    }

    /// Folds another table's counts into this one, e.g. when counting was
    /// split across partitions of the input.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (&symbol, &count) in &other.counts {
            self.add(symbol, count);
        }
    }

    pub fn get(&self, symbol: u8) -> Option<usize> {
        self.counts.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }

    /// `u32` entry count, then per entry the symbol byte and a `u64` count,
    /// all little-endian.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(4 + self.counts.len() * 9);
        let unique_byte_count = self.counts.len() as u32;
        bytes.write_all(&unique_byte_count.to_le_bytes())?;

        for (&byte, &freq) in &self.counts {
            bytes.push(byte);
            bytes.write_all(&(freq as u64).to_le_bytes())?;
        }

        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut count_bytes = [0u8; 4];
        cursor.read_exact(&mut count_bytes)?;
        let count = u32::from_le_bytes(count_bytes) as usize;
        if count > 256 {
            return Err(HuffmanError::malformed(format!(
                "frequency table claims {count} distinct symbols"
            )));
        }

        let mut table = FrequencyTable::new();
        // Merged weights must stay representable while the tree is built.
        let mut total: usize = 0;
        for _ in 0..count {
            let mut byte_val = [0u8; 1];
            cursor.read_exact(&mut byte_val)?;
            let byte = byte_val[0];

            let mut freq_bytes = [0u8; 8];
            cursor.read_exact(&mut freq_bytes)?;
            let frequency = usize::try_from(u64::from_le_bytes(freq_bytes)).map_err(|_| {
                HuffmanError::malformed(format!("frequency of symbol {byte:#04x} is too large"))
            })?;

            if frequency == 0 {
                return Err(HuffmanError::malformed(format!(
                    "symbol {byte:#04x} stored with zero frequency"
                )));
            }
            total = total.checked_add(frequency).ok_or_else(|| {
                HuffmanError::malformed("stored frequencies overflow the total count")
            })?;
            if table.counts.insert(byte, frequency).is_some() {
                return Err(HuffmanError::malformed(format!(
                    "symbol {byte:#04x} stored twice"
                )));
            }
        }

        Ok(table)
    }
}

impl FromIterator<(u8, usize)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, usize)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        table.extend(iter);
        table
    }
}

impl Extend<(u8, usize)> for FrequencyTable {
    fn extend<I: IntoIterator<Item = (u8, usize)>>(&mut self, iter: I) {
        for (symbol, count) in iter {
            self.add(symbol, count);
        }
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = (&'a u8, &'a usize);
    type IntoIter = btree_map::Iter<'a, u8, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_every_symbol() {
        let table = FrequencyTable::from_bytes(b"aaabbc");
        assert_eq!(table.get(b'a'), Some(3));
        assert_eq!(table.get(b'b'), Some(2));
        assert_eq!(table.get(b'c'), Some(1));
        assert_eq!(table.get(b'd'), None);
        assert_eq!(table.len(), 3);
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = FrequencyTable::from_bytes(b"");
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);

        let legacy = FrequencyTable::from_bytes_with(b"", CountWindow::ExcludeLast);
        assert!(legacy.is_empty());
    }

    #[test]
    fn legacy_window_skips_last_symbol() {
        let table = FrequencyTable::from_bytes_with(b"aaabbc", CountWindow::ExcludeLast);
        assert_eq!(table.get(b'a'), Some(3));
        assert_eq!(table.get(b'b'), Some(2));
        assert_eq!(table.get(b'c'), None);
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn merge_sums_partitions() {
        let input = b"the quick brown fox jumps over the lazy dog";
        let (head, tail) = input.split_at(17);

        let mut merged = FrequencyTable::from_bytes(head);
        merged.merge(&FrequencyTable::from_bytes(tail));

        assert_eq!(merged, FrequencyTable::from_bytes(input));
    }

    #[test]
    fn zero_counts_are_not_stored() {
        let table: FrequencyTable = vec![(b'x', 0), (b'y', 2)].into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b'x'), None);
    }

    #[test]
    fn serialized_table_reads_back() {
        let table = FrequencyTable::from_bytes(b"mississippi");
        let bytes = table.serialize().unwrap();
        assert_eq!(bytes.len(), 4 + 4 * 9);
        assert_eq!(FrequencyTable::deserialize(&bytes).unwrap(), table);
    }

    #[test]
    fn truncated_table_is_io_error() {
        let bytes = FrequencyTable::from_bytes(b"abc").serialize().unwrap();
        let err = FrequencyTable::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, HuffmanError::Io(_)));
    }

    #[test]
    fn overflowing_frequencies_are_rejected() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        for symbol in [b'a', b'b'] {
            bytes.push(symbol);
            bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        }
        let err = FrequencyTable::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, HuffmanError::MalformedCode(_)));
    }

    #[test]
    fn zero_frequency_entry_is_rejected() {
        let mut bytes = 1u32.to_le_bytes().to_vec();
        bytes.push(b'z');
        bytes.extend_from_slice(&0u64.to_le_bytes());
        let err = FrequencyTable::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, HuffmanError::MalformedCode(_)));
    }
}
