//! Serialize Demo - pack/unpack round trip + latency report
//!
//! Usage:
//!   cargo run --release --bin serialize_demo -- [--iterations N]

use std::time::Instant;

use serialize::{Plain, Result, Serializer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct MyStruct {
    d1: f64,
    l1: i64,
}

// SAFETY: repr(C), dua field 8 bytes tanpa padding, semua bit pattern valid
unsafe impl Plain for MyStruct {}

/// Demo configuration
struct DemoConfig {
    iterations: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000_000,
        }
    }
}

fn parse_args() -> DemoConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" | "-n" => {
                if i + 1 < args.len() {
                    config.iterations = args[i + 1].parse().unwrap_or(1_000_000);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Serialize Demo - type-tagged binary serialization\n");
                println!("Usage: serialize_demo [OPTIONS]\n");
                println!("Options:");
                println!("  -n, --iterations <N>  Benchmark iterations (default: 1000000)");
                println!("  -h, --help            Show this help");
                println!("\nSet RUST_LOG=debug to trace session events.");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args();

    println!("📦 Serialize - Type-Tagged Binary Serializer");
    println!("============================================\n");

    if let Err(e) = roundtrip_demo() {
        error!(error = %e, "round trip failed");
        std::process::exit(1);
    }

    if let Err(e) = benchmark_serializer(config.iterations) {
        error!(error = %e, "benchmark failed");
        std::process::exit(1);
    }

    println!("\n✅ Demo complete!");
}

fn roundtrip_demo() -> Result<()> {
    println!("🔁 Round Trip");
    println!("-------------");

    let mut ms = MyStruct {
        d1: 6.02214,
        l1: 1_048_576,
    };
    let mut i1: i32 = 255;
    let mut c1 = 'C';
    let mut s1 = String::from("Hello world");
    let mut b1 = true;

    let chunk = Serializer::new()
        .pack(&i1)?
        .pack(&c1)?
        .pack(&ms)?
        .pack(&s1)?
        .pack(&b1)?
        .to_binary()?;

    let size = chunk.borrow().map_or(0, |c| c.size());
    info!(size, "packed 5 fields");

    ms = MyStruct::default();
    i1 = 0;
    c1 = '\0';
    s1.clear();
    b1 = false;

    Serializer::new()
        .from_binary(&chunk)?
        .unpack_into(&mut i1)?
        .unpack_into(&mut c1)?
        .unpack_into(&mut ms)?
        .unpack_into(&mut s1)?
        .unpack_into(&mut b1)?;

    println!("  {}", i1);
    println!("  {}", c1);
    println!("  {}", ms.d1);
    println!("  {}", ms.l1);
    println!("  {}", s1);
    println!("  {}\n", b1);

    Ok(())
}

fn benchmark_serializer(iterations: usize) -> Result<()> {
    println!("📊 Serializer Benchmark");
    println!("-----------------------");

    let ms = MyStruct {
        d1: 2.5,
        l1: 42,
    };
    let text = "benchmark payload";

    // Benchmark pack + finalize
    let start = Instant::now();
    let mut last = None;
    for i in 0..iterations {
        let mut ser = Serializer::new();
        ser.pack(&(i as u64))?.pack(&ms)?.pack(text)?;
        last = Some(ser.to_binary()?);
    }
    let pack_duration = start.elapsed();

    let Some(chunk) = last else {
        println!("  No iterations requested");
        return Ok(());
    };

    // Benchmark unpack
    let start = Instant::now();
    for _ in 0..iterations {
        let mut de = Serializer::new();
        de.from_binary(&chunk)?;
        let _: u64 = de.unpack()?;
        let _: MyStruct = de.unpack()?;
        let _: String = de.unpack()?;
    }
    let unpack_duration = start.elapsed();

    let pack_ns = pack_duration.as_nanos() as f64 / iterations as f64;
    let unpack_ns = unpack_duration.as_nanos() as f64 / iterations as f64;

    println!("  Fields per message: 3");
    println!("  Operations: {}", iterations);
    println!(
        "  Pack latency:   {:.2} ns/op ({:.3} μs/op)",
        pack_ns,
        pack_ns / 1000.0
    );
    println!(
        "  Unpack latency: {:.2} ns/op ({:.3} μs/op)",
        unpack_ns,
        unpack_ns / 1000.0
    );
    println!(
        "  Throughput:     {:.2} M msgs/sec",
        iterations as f64 / pack_duration.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}
