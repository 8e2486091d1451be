//! Compressor factory for bundle responses.
//!
//! A bundle response is produced by wrapping the generated bundle bytes in
//! a reader that yields the encoded body: gzip via `flate2`, brotli via
//! `brotli`, or a passthrough for identity. Reading the source to the end
//! finalizes the codec stream, so the output always decodes back to the
//! input.

use std::io::{Cursor, Read};

use flate2::read::GzEncoder;
use flate2::Compression as GzLevel;

// Brotli tuning: 4KB internal buffer, quality 6, 4MB window.
const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_QUALITY: u32 = 6;
const BROTLI_LGWIN: u32 = 22;

/// A content encoding the service can apply to bundle bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Brotli,
    #[default]
    Identity,
}

impl Encoding {
    /// Parses an explicit `compression` parameter value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gzip" => Some(Encoding::Gzip),
            "br" => Some(Encoding::Brotli),
            "identity" => Some(Encoding::Identity),
            _ => None,
        }
    }

    /// Picks the best supported scheme from an `Accept-Encoding` header.
    ///
    /// Brotli is preferred over gzip; anything else degrades to identity.
    /// Quality values are ignored (the service never emits `q=0` schemes
    /// differently from unlisted ones worth distinguishing).
    pub fn negotiate(accept_encoding: &str) -> Self {
        let mut gzip = false;
        for token in accept_encoding.split(',') {
            let scheme = token.split(';').next().unwrap_or_default().trim();
            match scheme {
                "br" => return Encoding::Brotli,
                "gzip" => gzip = true,
                _ => {}
            }
        }
        if gzip {
            Encoding::Gzip
        } else {
            Encoding::Identity
        }
    }

    /// The `Content-Encoding` header token, or None for identity.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Encoding::Gzip => Some("gzip"),
            Encoding::Brotli => Some("br"),
            Encoding::Identity => None,
        }
    }
}

/// Wraps the bundle bytes in a reader producing the encoded response body.
pub fn create_compressor(encoding: Encoding, bundle: Vec<u8>) -> Box<dyn Read + Send> {
    match encoding {
        Encoding::Identity => Box::new(Cursor::new(bundle)),
        Encoding::Gzip => Box::new(GzEncoder::new(Cursor::new(bundle), GzLevel::default())),
        Encoding::Brotli => Box::new(brotli::CompressorReader::new(
            Cursor::new(bundle),
            BROTLI_BUFFER_SIZE,
            BROTLI_QUALITY,
            BROTLI_LGWIN,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &[u8] = b"(function (self) {\n/* fetch */\nself.fetch = function () {};\n}(self));\n";

    fn read_all(mut reader: Box<dyn Read + Send>) -> Vec<u8> {
        let mut output = Vec::new();
        reader.read_to_end(&mut output).unwrap();
        output
    }

    #[test]
    fn test_parse() {
        assert_eq!(Encoding::parse("gzip"), Some(Encoding::Gzip));
        assert_eq!(Encoding::parse("br"), Some(Encoding::Brotli));
        assert_eq!(Encoding::parse("identity"), Some(Encoding::Identity));
        assert_eq!(Encoding::parse("zstd"), None);
        assert_eq!(Encoding::parse(""), None);
    }

    #[test]
    fn test_negotiate_prefers_brotli() {
        assert_eq!(Encoding::negotiate("gzip, deflate, br"), Encoding::Brotli);
        assert_eq!(Encoding::negotiate("br;q=0.9, gzip"), Encoding::Brotli);
    }

    #[test]
    fn test_negotiate_falls_back_to_gzip() {
        assert_eq!(Encoding::negotiate("gzip, deflate"), Encoding::Gzip);
        assert_eq!(Encoding::negotiate("gzip;q=0.5"), Encoding::Gzip);
    }

    #[test]
    fn test_negotiate_identity_when_unsupported() {
        assert_eq!(Encoding::negotiate("deflate, zstd"), Encoding::Identity);
        assert_eq!(Encoding::negotiate(""), Encoding::Identity);
    }

    #[test]
    fn test_content_encoding_tokens() {
        assert_eq!(Encoding::Gzip.content_encoding(), Some("gzip"));
        assert_eq!(Encoding::Brotli.content_encoding(), Some("br"));
        assert_eq!(Encoding::Identity.content_encoding(), None);
    }

    #[test]
    fn test_identity_is_passthrough() {
        let output = read_all(create_compressor(Encoding::Identity, BUNDLE.to_vec()));
        assert_eq!(output, BUNDLE);
    }

    #[test]
    fn test_gzip_round_trip() {
        let compressed = read_all(create_compressor(Encoding::Gzip, BUNDLE.to_vec()));
        assert_ne!(compressed, BUNDLE);

        let mut decoder = flate2::read::GzDecoder::new(Cursor::new(compressed));
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, BUNDLE);
    }

    #[test]
    fn test_brotli_round_trip() {
        let compressed = read_all(create_compressor(Encoding::Brotli, BUNDLE.to_vec()));
        assert_ne!(compressed, BUNDLE);

        let mut decoder = brotli::Decompressor::new(Cursor::new(compressed), BROTLI_BUFFER_SIZE);
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, BUNDLE);
    }

    #[test]
    fn test_empty_input_round_trip() {
        let compressed = read_all(create_compressor(Encoding::Gzip, Vec::new()));
        let mut decoder = flate2::read::GzDecoder::new(Cursor::new(compressed));
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();
        assert!(decoded.is_empty());
    }
}
