//! Text-safe transport encoding for PDF bytes
//!
//! Encoding always emits standard padded base64. Decoding accepts what browser
//! and Node encoders produce in practice: ASCII whitespace (line-wrapped output)
//! is skipped and trailing padding is optional.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode raw bytes as standard padded base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text back into raw bytes
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        LENIENT.decode(compact)
    } else {
        LENIENT.decode(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_padded_standard_alphabet() {
        assert_eq!(encode(b"%PDF"), "JVBERg==");
        assert_eq!(encode(&[0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        assert_eq!(decode("JVBERg").unwrap(), b"%PDF");
    }

    #[test]
    fn test_decode_skips_line_breaks() {
        assert_eq!(decode("JVBE\r\nRg==\n").unwrap(), b"%PDF");
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(decode("JVBE*g==").is_err());
        assert!(decode("not base64!").is_err());
    }

    #[test]
    fn test_empty_round_trip() {
        assert_eq!(encode(b""), "");
        assert!(decode("").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn round_trip_is_lossless(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }

        #[test]
        fn encoded_text_is_json_safe(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let text = encode(&bytes);
            prop_assert!(text
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')));
        }
    }
}
