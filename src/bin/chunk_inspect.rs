//! Chunk Inspector - dump header dari file chunk
//!
//! File di-mmap lalu header di-parse langsung dari mapped region,
//! tanpa copy payload.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin chunk_inspect -- --write sample.chunk
//! cargo run --release --bin chunk_inspect -- --file sample.chunk
//! ```
//!
//! # Options
//!
//! - `--file PATH` - Chunk file untuk di-inspect (default: sample.chunk)
//! - `--write PATH` - Tulis sample chunk ke PATH lalu inspect
//! - `--max-fields N` - Batas field count (default: 65536)

use serialize::config::DEFAULT_MAX_FIELDS;
use serialize::protocol::decode_header;
use serialize::{ChunkFile, Result, Serializer, SerializerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Inspector configuration
struct InspectConfig {
    path: String,
    write_sample: bool,
    limits: SerializerConfig,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            path: "sample.chunk".to_string(),
            write_sample: false,
            limits: SerializerConfig::default(),
        }
    }
}

fn parse_args() -> InspectConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = InspectConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    config.path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--write" | "-w" => {
                if i + 1 < args.len() {
                    config.path = args[i + 1].clone();
                    config.write_sample = true;
                    i += 1;
                }
            }
            "--max-fields" => {
                if i + 1 < args.len() {
                    config.limits.max_fields = args[i + 1].parse().unwrap_or(DEFAULT_MAX_FIELDS);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Chunk Inspector - dump serialized chunk headers\n");
                println!("Usage: chunk_inspect [OPTIONS]\n");
                println!("Options:");
                println!("  -f, --file <PATH>     Chunk file to inspect (default: sample.chunk)");
                println!("  -w, --write <PATH>    Write a sample chunk to PATH, then inspect it");
                println!("      --max-fields <N>  Field count limit (default: 65536)");
                println!("  -h, --help            Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn write_sample(path: &str) -> Result<()> {
    let mut ser = Serializer::new();
    ser.pack(&42i32)?
        .pack(&true)?
        .pack("hi")?
        .pack(&[0x01u8, 0x02, 0x03][..])?;

    let chunk = ser.to_binary()?;
    if let Some(chunk) = chunk.borrow() {
        ChunkFile::write(path, &chunk)?;
        info!(path, size = chunk.size(), "sample chunk written");
    }
    Ok(())
}

fn inspect(config: &InspectConfig) -> Result<()> {
    let file = ChunkFile::open(&config.path)?;
    let header = decode_header(file.as_bytes(), &config.limits)?;

    println!("📄 {}", config.path);
    println!("   File size:     {} bytes", file.len());
    println!("   Fields:        {}", header.fields.len());
    println!("   Header size:   {} bytes", header.payload_offset);
    println!("   Payload size:  {} bytes", header.payload_size);
    println!();
    println!("   {:>5}  {:<12} {:>10} {:>10}", "#", "TYPE", "OFFSET", "SIZE");

    let mut offset = header.payload_offset;
    for (index, md) in header.fields.iter().enumerate() {
        println!(
            "   {:>5}  {:<12} {:>10} {:>10}",
            index,
            format!("{:?}", md.data_type),
            offset,
            md.size
        );
        offset += md.size;
    }

    let trailing = file.len() - offset;
    if trailing > 0 {
        println!("\n   ⚠️  {} trailing bytes after payload", trailing);
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args();

    if config.write_sample {
        if let Err(e) = write_sample(&config.path) {
            error!(error = %e, "failed to write sample");
            std::process::exit(1);
        }
    }

    if let Err(e) = inspect(&config) {
        error!(error = %e, path = %config.path, "inspect failed");
        std::process::exit(1);
    }
}
