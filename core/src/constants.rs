use std::time::Duration;

/// DES block length in bytes. Chunk sizes that are not a multiple of this
/// are not rejected by the partitioner; the transform reports them.
pub const DES_BLOCK_LEN: usize = 8;

/// DES key length in bytes (56 key bits + 8 parity bits).
pub const DES_KEY_LEN: usize = 8;

/// Defaults when the caller does not override them (reference benchmark run).
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024; // 1 MiB

/// How long a strategy waits for all chunk tasks before failing the call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Thread name prefixes, visible in debuggers and `tracing` output.
pub const POOL_THREAD_PREFIX: &str = "des-pool";
pub const COOP_THREAD_PREFIX: &str = "des-coop";
