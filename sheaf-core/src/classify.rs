//! File classification: text vs. image/PDF vs. opaque binary.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes sniffed from the head of a file when the extension is ambiguous.
const SNIFF_BYTES: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Image,
    Pdf,
    Binary,
}

/// MIME type for well-known image/PDF extensions.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Classify by extension alone, without touching the file.
/// Returns None when a content sniff is needed.
fn classify_by_extension(path: &Path) -> Option<FileKind> {
    match mime_for(path) {
        Some("application/pdf") => Some(FileKind::Pdf),
        Some(_) => Some(FileKind::Image),
        None => None,
    }
}

/// Classify a file. Extension first for well-known binary types, then a
/// bounded content sniff (NUL byte in the head) to split text from opaque
/// binary. The sniff read is the only side effect.
pub fn classify(path: &Path) -> std::io::Result<FileKind> {
    if let Some(kind) = classify_by_extension(path) {
        return Ok(kind);
    }

    let mut head = [0u8; SNIFF_BYTES];
    let mut file = File::open(path)?;
    let mut filled = 0;
    loop {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == head.len() {
            break;
        }
    }

    Ok(classify_bytes(&head[..filled]))
}

/// Classify sniffed head bytes: a NUL byte marks opaque binary.
pub fn classify_bytes(head: &[u8]) -> FileKind {
    if head.contains(&0) {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_image_and_pdf_by_extension() {
        let dir = TempDir::new().unwrap();
        // Extension wins; content is never inspected for these.
        let png = write_file(&dir, "logo.PNG", b"not really a png");
        let pdf = write_file(&dir, "doc.pdf", b"%PDF-1.4");
        assert_eq!(classify(&png).unwrap(), FileKind::Image);
        assert_eq!(classify(&pdf).unwrap(), FileKind::Pdf);
    }

    #[test]
    fn test_mime_for_known_extensions() {
        assert_eq!(mime_for(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("a.pdf")), Some("application/pdf"));
        assert_eq!(mime_for(Path::new("a.rs")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[test]
    fn test_text_sniff() {
        let dir = TempDir::new().unwrap();
        let txt = write_file(&dir, "notes", b"plain old text\nwith lines\n");
        assert_eq!(classify(&txt).unwrap(), FileKind::Text);
    }

    #[test]
    fn test_binary_sniff() {
        let dir = TempDir::new().unwrap();
        let bin = write_file(&dir, "blob.dat", &[0x7f, b'E', b'L', b'F', 0x00, 0x01]);
        assert_eq!(classify(&bin).unwrap(), FileKind::Binary);
    }

    #[test]
    fn test_empty_file_is_text() {
        let dir = TempDir::new().unwrap();
        let empty = write_file(&dir, "empty.log", b"");
        assert_eq!(classify(&empty).unwrap(), FileKind::Text);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(classify(&dir.path().join("absent.txt")).is_err());
    }
}
