//! MP4 container signature checks for extracted clips.

use super::ExtractError;

/// Mime type reported for extracted clips.
pub const MP4_MIME: &str = "video/mp4";

/// Checks for an MP4-family `ftyp` marker.
///
/// The box layout puts the type at offset 4; files with a 64-bit size field
/// carry it at offset 8 instead.
pub fn has_container_signature(bytes: &[u8]) -> bool {
    let at = |offset: usize| bytes.get(offset..offset + 4) == Some(b"ftyp");
    at(4) || at(8)
}

/// Integrity gate run on every extraction result before success.
///
/// # Errors
///
/// - `ExtractError::IntegrityCheckFailed` - buffer is empty or carries no
///   recognizable container signature
pub fn validate_clip_bytes(bytes: &[u8]) -> Result<(), ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::IntegrityCheckFailed {
            reason: "extraction produced an empty file".to_string(),
        });
    }

    if !has_container_signature(bytes) {
        return Err(ExtractError::IntegrityCheckFailed {
            reason: format!(
                "output does not start with a valid container signature (first bytes: {:02x?})",
                &bytes[..bytes.len().min(12)]
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_header() -> Vec<u8> {
        let mut data = vec![
            0x00, 0x00, 0x00, 0x20, // box size
            b'f', b't', b'y', b'p', // box type
            b'i', b's', b'o', b'm', // major brand
        ];
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    #[test]
    fn test_signature_at_offset_four() {
        assert!(has_container_signature(&mp4_header()));
        assert!(validate_clip_bytes(&mp4_header()).is_ok());
    }

    #[test]
    fn test_signature_at_offset_eight() {
        // 64-bit box size layout: 4-byte marker, 4-byte type follows at 8.
        let mut data = vec![0x00, 0x00, 0x00, 0x01, b'x', b'x', b'x', b'x'];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(&[0u8; 32]);
        assert!(has_container_signature(&data));
    }

    #[test]
    fn test_rejects_empty_buffer() {
        assert!(matches!(
            validate_clip_bytes(&[]),
            Err(ExtractError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_non_container_bytes() {
        let html = b"<html><body>error page</body></html>";
        assert!(matches!(
            validate_clip_bytes(html),
            Err(ExtractError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        assert!(!has_container_signature(&[0x00, 0x00, 0x00]));
    }
}
