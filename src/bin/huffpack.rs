use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use static_huffman::{corpus, CodecConfig, CompressedData, CompressionStats, HuffmanCodec};

#[derive(Parser)]
#[clap(author, version, about = "Static Huffman compressor", long_about = None)]
struct Opts {
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the code table and the packed payload for INPUT
    Compress {
        input: PathBuf,
        #[clap(short, long, default_value = "codes.txt", help = "Code table file")]
        codes: PathBuf,
        #[clap(short, long, default_value = "compressed.bin", help = "Payload file")]
        output: PathBuf,
        #[clap(long, help = "Write a framed container that can be decompressed")]
        framed: bool,
        #[clap(long, help = "Count frequencies without the final byte, like the legacy tool")]
        legacy_window: bool,
        #[clap(long, help = "Read INPUT line by line and end every line with \\r, like the legacy tool")]
        cr_lines: bool,
    },
    /// Decode a framed container
    Decompress {
        input: PathBuf,
        #[clap(short, long, help = "Output file (default: stdout)")]
        output: Option<PathBuf>,
    },
    /// Print the Huffman tree built from INPUT
    Tree { input: PathBuf },
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    match opts.command {
        Command::Compress {
            input,
            codes,
            output,
            framed,
            legacy_window,
            cr_lines,
        } => {
            let config = if legacy_window {
                CodecConfig::legacy()
            } else {
                CodecConfig::default()
            };
            let stats = compress(&input, &codes, &output, framed, cr_lines, config)?;
            println!("{stats}");
        }
        Command::Decompress { input, output } => decompress(&input, output.as_deref())?,
        Command::Tree { input } => {
            let data = read_input(&input)?;
            let codec = HuffmanCodec::from_bytes(&data)
                .with_context(|| format!("building tree for {}", input.display()))?;
            print!("{}", codec.tree().render());
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(io::stderr)
        .init();
}

/// `RUST_LOG` wins; `-v` only sets the level it falls back to.
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn compress(
    input: &Path,
    codes: &Path,
    output: &Path,
    framed: bool,
    cr_lines: bool,
    config: CodecConfig,
) -> Result<CompressionStats> {
    let mut data = read_input(input)?;
    if cr_lines {
        data = corpus::cr_terminated_lines(&data);
        debug!(bytes = data.len(), "rewrote line endings to \\r");
    }
    let codec = HuffmanCodec::from_bytes_with(&data, config)
        .with_context(|| format!("building code table for {}", input.display()))?;

    let codes_file =
        File::create(codes).with_context(|| format!("creating {}", codes.display()))?;
    codec
        .code_table()
        .write_to(BufWriter::new(codes_file))
        .with_context(|| format!("writing {}", codes.display()))?;
    debug!(path = %codes.display(), symbols = codec.code_table().len(), "wrote code table");

    let start = Instant::now();
    let mut out = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );
    let written = if framed {
        let compressed = codec.compress(&data)?;
        compressed
            .write_to(&mut out)
            .with_context(|| format!("writing {}", output.display()))?;
        compressed.frame_len()
    } else {
        let packed = codec.encode_packed(&data)?;
        out.write_all(&packed)
            .with_context(|| format!("writing {}", output.display()))?;
        packed.len()
    };
    out.flush()?;

    let stats = CompressionStats {
        original_bytes: data.len() as u64,
        compressed_bytes: written as u64,
        elapsed: start.elapsed(),
    };
    info!(path = %output.display(), bytes = written, framed, "wrote payload");
    Ok(stats)
}

fn decompress(input: &Path, output: Option<&Path>) -> Result<()> {
    let framed = read_input(input)?;
    let compressed = CompressedData::deserialize(&framed)
        .with_context(|| format!("parsing container {}", input.display()))?;
    let decoded = HuffmanCodec::decode(&compressed)
        .with_context(|| format!("decoding {}", input.display()))?;

    match output {
        Some(path) => {
            fs::write(path, &decoded).with_context(|| format!("writing {}", path.display()))?
        }
        None => io::stdout().write_all(&decoded)?,
    }
    info!(bytes = decoded.len(), "decompressed");
    Ok(())
}
