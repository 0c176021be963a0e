use std::fs::File;

use static_huffman::{bit_packer, HuffmanCodec};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join("static_huffman_demo");
    std::fs::create_dir_all(&dir)?;
    let sample_path = dir.join("sample.txt");
    let compressed_path = dir.join("sample.huff");
    let codes_path = dir.join("codes.txt");
    let decompressed_path = dir.join("decompressed.txt");

    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";
    std::fs::write(&sample_path, sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    // Code table, as the external code-table file
    let codec = HuffmanCodec::from_bytes(sample_text.as_bytes())?;
    codec.code_table().write_to(File::create(&codes_path)?)?;
    for (symbol, code) in codec.code_table().iter().take(5) {
        println!("  {:?} -> {}", symbol as char, bit_packer::to_digits(code));
    }

    // Framed container
    let input = File::open(&sample_path)?;
    let output = File::create(&compressed_path)?;
    let compressed = HuffmanCodec::encode_from_file(input, output)?;

    let compressed_size = std::fs::metadata(&compressed_path)?.len();
    println!(
        "Compressed to: {} bytes ({} payload bits, {:.1}% of original)",
        compressed_size,
        compressed.bit_count,
        compressed_size as f64 / sample_text.len() as f64 * 100.0
    );

    let compressed = File::open(&compressed_path)?;
    let decompressed = File::create(&decompressed_path)?;
    HuffmanCodec::decode_from_file(compressed, decompressed)?;

    let decompressed_text = std::fs::read_to_string(&decompressed_path)?;
    if sample_text != decompressed_text {
        return Err("Decompression verification failed".into());
    }
    println!("Decompression successful, data matches exactly.");

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
