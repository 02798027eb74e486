use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::model::{PreviewRef, SelectedFile};

/// Build an inline preview for image files; other types get none.
/// Encoding a large image is CPU work, so callers run this off the UI thread.
pub fn build_preview(file: &SelectedFile) -> Option<PreviewRef> {
    if !file.is_image() {
        return None;
    }
    let data_uri = format!(
        "data:{};base64,{}",
        file.mime_type,
        STANDARD.encode(&file.bytes)
    );
    Some(PreviewRef { data_uri })
}

impl PreviewRef {
    /// Raw image bytes back out of the URI, for renderers that want a texture.
    pub fn decode(&self) -> Option<Vec<u8>> {
        let (header, payload) = self.data_uri.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        STANDARD.decode(payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_get_a_data_uri() {
        let file = SelectedFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        let preview = build_preview(&file).unwrap();
        assert_eq!(preview.data_uri, "data:image/jpeg;base64,/9j/");
        assert_eq!(preview.decode().unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn pdfs_get_no_preview() {
        let file = SelectedFile::new("scan.pdf", "application/pdf", b"%PDF".to_vec());
        assert!(build_preview(&file).is_none());
    }

    #[test]
    fn decode_rejects_non_base64_uris() {
        let preview = PreviewRef {
            data_uri: "data:text/plain,hello".into(),
        };
        assert!(preview.decode().is_none());
    }
}
