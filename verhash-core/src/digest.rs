use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read size used while streaming a file through the hasher.
pub const CHUNK_SIZE: usize = 4096;
/// Number of hex characters kept from the 40-character SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 16;
/// Prefix of the in-manifest placeholder for files that could not be read.
pub const ERROR_PREFIX: &str = "Error: ";

/// Stream `path` through SHA-1 and return the first 16 lowercase hex chars.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match f.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(truncate(&hasher.finalize()))
}

/// Digest of an in-memory buffer, same truncation as [`file_digest`].
pub fn bytes_digest(data: &[u8]) -> String {
    truncate(&Sha1::digest(data))
}

/// Like [`file_digest`], but an unreadable file degrades to `"Error: <msg>"`.
pub fn digest_or_error(path: &Path) -> String {
    match file_digest(path) {
        Ok(d) => d,
        Err(e) => format!("{ERROR_PREFIX}{e}"),
    }
}

pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub fn is_error_digest(s: &str) -> bool {
    s.starts_with(ERROR_PREFIX)
}

fn truncate(raw: &[u8]) -> String {
    let mut s = hex::encode(raw);
    s.truncate(DIGEST_HEX_LEN);
    s
}
