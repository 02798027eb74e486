use std::path::Path;

pub const PDF: &str = "application/pdf";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a media type from the file extension.
/// Unknown extensions map to `application/octet-stream`.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "pdf" => PDF,
        "txt" => "text/plain",
        "exe" => "application/vnd.microsoft.portable-executable",
        _ => OCTET_STREAM,
    }
}

pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// The only media types the service will take: any image, or exactly a PDF.
pub fn is_accepted(mime: &str) -> bool {
    is_image(mime) || mime == PDF
}

/// Short label shown next to a file name, e.g. `PDF` or `JPEG`.
pub fn kind_label(mime: &str) -> String {
    if mime == PDF {
        return "PDF".into();
    }
    mime.split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(mime)
        .to_uppercase()
}

/// Human-readable size: `512 B`, `1.50 KB`, `2.00 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{:.2} MB", b / MB)
    }
}
