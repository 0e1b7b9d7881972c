//! Command implementations.

pub mod fingerprint;
pub mod validate;

pub use fingerprint::run_fingerprint;
pub use validate::run_validate;

use std::io::Read;
use std::path::Path;

/// Reads a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> crate::CliResult<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read(path)?)
    }
}
