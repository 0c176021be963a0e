use std::fmt;
use std::time::Duration;

/// Size and timing summary for one compression run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStats {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
}

impl CompressionStats {
    /// Compressed size over original size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }

    pub fn ratio_percent(&self) -> u64 {
        (self.ratio() * 100.0).round() as u64
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Huffman compression statistics")?;
        writeln!(f, "------------------------------")?;
        writeln!(f, "Original size:    {} bits", self.original_bytes * 8)?;
        writeln!(f, "Compressed size:  {} bits", self.compressed_bytes * 8)?;
        writeln!(f, "Compression ratio: {}%", self.ratio_percent())?;
        write!(f, "Elapsed time:     {:?}", self.elapsed)
    }
}
