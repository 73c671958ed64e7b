//! des-bench
//!
//! Times DES-ECB over a file: serial baseline, then each concurrency strategy,
//! for both encryption and decryption, and checks the results agree.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use des_parallel_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_WORKERS, DES_BLOCK_LEN};
use des_parallel_core::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "des-bench")]
#[command(about = "Benchmark chunked DES-ECB across concurrency strategies", long_about = None)]
struct Args {
    /// File to encrypt and decrypt
    #[arg(short, long)]
    input: PathBuf,

    /// Tasks running at once
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Bytes per task; should be a multiple of 8
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Give up on a call after this many milliseconds
    #[arg(long, default_value_t = 120_000)]
    deadline_ms: u64,

    /// 16 hex chars; a random key is generated when omitted
    #[arg(long)]
    key_hex: Option<String>,

    /// Print measurements as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    input: PathBuf,
    input_len: usize,
    config: EngineConfig,
    key_hex: String,
    measurements: Vec<Measurement>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Time `f` under `label`, log it, and keep the measurement for the report.
fn timed<T>(measurements: &mut Vec<Measurement>, label: &str, f: impl FnOnce() -> T) -> T {
    let (value, m) = measure(label, f);
    info!(label = %m.label, seconds = m.seconds(), "{}: {:.3}s", m.label, m.seconds());
    measurements.push(m);
    value
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = EngineConfig::default()
        .with_workers(args.workers)
        .with_chunk_size(args.chunk_size)
        .with_deadline(Duration::from_millis(args.deadline_ms));
    config.validate().context("invalid benchmark parameters")?;
    if config.chunk_size % DES_BLOCK_LEN != 0 {
        bail!("chunk size {} is not a multiple of {DES_BLOCK_LEN}", config.chunk_size);
    }

    let key = args
        .key_hex
        .as_deref()
        .map(SecretKey::from_hex)
        .transpose()
        .context("invalid --key-hex")?;
    let engine = DesEngine::new(key).context("building DES engine")?;

    let data = measure_and_log("read input", || fs::read(&args.input))
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(path = %args.input.display(), len = data.len(), "input loaded");

    let partition = Partition::new(data.len(), config.chunk_size)?;
    if partition.tail_len() > 0 {
        warn!(
            tail = partition.tail_len(),
            "input length is not a multiple of the chunk size; trailing bytes stay zero"
        );
    }
    let covered = partition.covered_len();
    let serial_ok = data.len() % DES_BLOCK_LEN == 0;
    if !serial_ok {
        warn!(len = data.len(), "input is not 8-byte aligned, skipping serial runs");
    }

    let pool = config.clone().with_strategy(StrategyKind::WorkerPool).build_strategy()?;
    let coop = config.clone().with_strategy(StrategyKind::Cooperative).build_strategy()?;
    let mut measurements = Vec::new();

    // 1️⃣ Encrypt
    let serial_ct = if serial_ok {
        let ct = timed(&mut measurements, "serial encrypt", || engine.encrypt_serial(&data))
            .context("serial encrypt")?;
        Some(ct)
    } else {
        None
    };
    let pool_ct = timed(&mut measurements, "worker_pool encrypt", || {
        engine.encrypt_parallel(data.clone(), config.worker_count, config.chunk_size, pool.as_ref())
    })
    .context("worker_pool encrypt")?;
    let coop_ct = timed(&mut measurements, "cooperative encrypt", || {
        engine.encrypt_parallel(data.clone(), config.worker_count, config.chunk_size, coop.as_ref())
    })
    .context("cooperative encrypt")?;

    // 2️⃣ Decrypt
    if let Some(ct) = &serial_ct {
        let pt = timed(&mut measurements, "serial decrypt", || engine.decrypt_serial(ct))
            .context("serial decrypt")?;
        ensure!(pt == data, "serial round trip does not recover the input");
    }
    let pool_pt = timed(&mut measurements, "worker_pool decrypt", || {
        engine.decrypt_parallel(pool_ct.clone(), config.worker_count, config.chunk_size, pool.as_ref())
    })
    .context("worker_pool decrypt")?;
    let coop_pt = timed(&mut measurements, "cooperative decrypt", || {
        engine.decrypt_parallel(coop_ct.clone(), config.worker_count, config.chunk_size, coop.as_ref())
    })
    .context("cooperative decrypt")?;

    // 3️⃣ Verify
    ensure!(pool_ct == coop_ct, "strategies produced different ciphertext");
    if let Some(ct) = &serial_ct {
        ensure!(
            pool_ct[..covered] == ct[..covered],
            "parallel ciphertext differs from serial over the covered prefix"
        );
    }
    ensure!(pool_pt[..covered] == data[..covered], "worker_pool decrypt does not recover the input");
    ensure!(coop_pt[..covered] == data[..covered], "cooperative decrypt does not recover the input");
    info!(covered, "all results agree");

    let report = Report {
        input: args.input.clone(),
        input_len: data.len(),
        config,
        key_hex: engine.secret_key().to_hex(),
        measurements,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("input: {} ({} bytes)", report.input.display(), report.input_len);
        println!("key:   {}", report.key_hex);
        for m in &report.measurements {
            println!("{:<22} {:>10.3}s", m.label, m.seconds());
        }
    }
    Ok(())
}
