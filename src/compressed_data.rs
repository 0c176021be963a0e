use std::io::{Read, Write};

use crate::error::{HuffmanError, Result};

/// Framed payload: everything the decoder needs besides the bytes
/// themselves, in particular how many bits the final byte holds.
///
/// Layout, all integers little-endian `u64`:
/// original length, bit count, tree-data length, tree data,
/// payload length, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    pub compressed_bits: Vec<u8>,
    pub bit_count: usize,
    pub tree_data: Vec<u8>,
    pub original_length: usize,
}

impl CompressedData {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.frame_len());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Size of the serialized frame in bytes.
    pub fn frame_len(&self) -> usize {
        4 * 8 + self.tree_data.len() + self.compressed_bits.len()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        write_u64(&mut writer, self.original_length)?;
        write_u64(&mut writer, self.bit_count)?;

        write_u64(&mut writer, self.tree_data.len())?;
        writer.write_all(&self.tree_data)?;

        write_u64(&mut writer, self.compressed_bits.len())?;
        writer.write_all(&self.compressed_bits)?;
        writer.flush()?;
        Ok(())
    }

    pub fn deserialize(data: &[u8]) -> Result<CompressedData> {
        Self::read_from(data)
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<CompressedData> {
        let original_length = read_u64(&mut reader)?;
        let bit_count = read_u64(&mut reader)?;
        check_lengths(original_length, bit_count)?;

        let tree_len = read_u64(&mut reader)?;
        let tree_data = read_exact_vec(&mut reader, tree_len)?;

        let data_len = read_u64(&mut reader)?;
        if data_len != bit_count.div_ceil(8) {
            return Err(HuffmanError::malformed(format!(
                "frame holds {data_len} payload bytes for {bit_count} bits"
            )));
        }
        let compressed_bits = read_exact_vec(&mut reader, data_len)?;

        Ok(CompressedData {
            compressed_bits,
            bit_count,
            tree_data,
            original_length,
        })
    }
}

/// Every code is at least one bit long, so a frame can never hold more
/// symbols than bits.
pub(crate) fn check_lengths(original_length: usize, bit_count: usize) -> Result<()> {
    if original_length > bit_count {
        return Err(HuffmanError::malformed(format!(
            "frame claims {original_length} symbols in only {bit_count} bits"
        )));
    }
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: usize) -> Result<()> {
    writer.write_all(&(value as u64).to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    usize::try_from(u64::from_le_bytes(buf))
        .map_err(|_| HuffmanError::malformed("length field exceeds address space"))
}

// Reads through `take` so a corrupt length cannot force a huge allocation
// up front.
fn read_exact_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes, found {}", buf.len()),
        )
        .into());
    }
    Ok(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> CompressedData {
        CompressedData {
            compressed_bits: vec![210, 3],
            bit_count: 10,
            tree_data: vec![1, 2, 3],
            original_length: 6,
        }
    }

    #[test]
    fn frame_layout() {
        let bytes = sample().serialize().unwrap();
        assert_eq!(bytes.len(), 8 * 4 + 3 + 2);
        assert_eq!(bytes.len(), sample().frame_len());
        assert_eq!(&bytes[0..8], &6u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &10u64.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 2..], &[210, 3]);
        assert_eq!(CompressedData::deserialize(&bytes).unwrap(), sample());
    }

    #[test]
    fn truncated_frame_is_io_error() {
        let bytes = sample().serialize().unwrap();
        let err = CompressedData::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        match err {
            HuffmanError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn symbol_count_beyond_bit_count_is_rejected() {
        let mut frame = sample();
        frame.original_length = usize::MAX >> 1;
        let bytes = frame.serialize().unwrap();
        assert!(matches!(
            CompressedData::deserialize(&bytes),
            Err(HuffmanError::MalformedCode(_))
        ));

        frame.original_length = 11;
        let bytes = frame.serialize().unwrap();
        assert!(matches!(
            CompressedData::deserialize(&bytes),
            Err(HuffmanError::MalformedCode(_))
        ));
    }

    #[test]
    fn payload_length_must_match_bit_count() {
        let mut frame = sample();
        frame.bit_count = 17;
        let bytes = frame.serialize().unwrap();
        assert!(matches!(
            CompressedData::deserialize(&bytes),
            Err(HuffmanError::MalformedCode(_))
        ));
    }
}
