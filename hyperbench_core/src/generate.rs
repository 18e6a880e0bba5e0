use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::schema::{Schema, HASH_WIDTH};

pub const DEFAULT_RECORD_COUNT: u64 = 1 << 20;

/// Writes `records` rows of the `block` shape: a header, then per row a
/// zero-padded hex counter key and 31 truncated SHA-256 columns. Output is
/// byte-identical across runs for the same count.
pub fn write_hash_csv(path: impl AsRef<Path>, records: u64) -> Result<(), io::Error> {
    let schema = Schema::block();
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", schema.header())?;

    for i in 0..records {
        let timestamp = format!("{:032x}", i);
        write!(out, "{}", timestamp)?;
        for column in 1..schema.arity() {
            write!(out, ",{}", hash_field(&timestamp, column))?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// First 32 hex characters of SHA-256(timestamp ++ column index).
pub fn hash_field(timestamp: &str, column: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(column.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..HASH_WIDTH / 2])
}
