use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a cached page into UTF-8.
///
/// Cache files hold the response body verbatim and no headers, so the only
/// signals are a BOM and the bytes themselves: BOM -> chardetng guess.
pub fn decode_page(bytes: &[u8]) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "decoding error".into(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::decode_page;

    #[test]
    fn utf8_bom_is_stripped() {
        let decoded = decode_page(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(decoded.html, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn plain_ascii_decodes_as_utf8_compatible() {
        let decoded = decode_page(b"<html>ok</html>").unwrap();
        assert_eq!(decoded.html, "<html>ok</html>");
    }
}
