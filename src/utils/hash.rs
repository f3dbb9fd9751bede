// Tue Jan 15 2026 - Alex

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Content digests for patched binaries.
pub struct HashComputer;

impl HashComputer {
    /// SHA-256 of a byte slice, lowercase hex.
    pub fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// SHA-256 of a file, streamed in chunks.
    pub fn sha256_file<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
        let _timer = super::logging::scoped_timer("sha256");
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            match reader.read(&mut buf)? {
                0 => break,
                size => hasher.update(&buf[..size]),
            }
        }

        Ok(hex::encode(hasher.finalize()))
    }
}
