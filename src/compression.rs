use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Gzip-compress a finished request body
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;
    encoder.finish().map_err(Error::Compression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_compress() {
        let compressed = gzip_compress(br#"{"a":"1"}"#).unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);

        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, r#"{"a":"1"}"#);
    }
}
