use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use log::debug;
use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 8192;

/// Hash a file in fixed-size chunks and return the SHA-256 digest as uppercase hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
        total += read as u64;
    }
    debug!("checksum: hashed {total} bytes from {}", path.display());
    Ok(format!("{:X}", hasher.finalize()))
}
