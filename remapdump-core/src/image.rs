use crate::error::HeaderError;
use crate::header::pe::PeHeaders;
use crate::header::Header;
use std::fmt;
use std::path::Path;

/// Build identity of an executable, as a dump's module record stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub timestamp: u32,
    pub checksum: u32,
    pub image_size: u32,
}

impl ImageMetadata {
    pub fn from_header(header: &dyn Header) -> Self {
        ImageMetadata {
            timestamp: header.time_date_stamp(),
            checksum: header.checksum(),
            image_size: header.size_of_image(),
        }
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp={:#010x} checksum={:#010x} size={:#x}",
            self.timestamp, self.checksum, self.image_size
        )
    }
}

/// Reads the timestamp, checksum and image size of the executable at `path`.
pub fn read_image_metadata<P: AsRef<Path>>(path: P) -> Result<ImageMetadata, HeaderError> {
    let headers = PeHeaders::open(&path)?;
    let metadata = ImageMetadata::from_header(&headers);
    log::debug!(
        "{} ({}): {}",
        path.as_ref().display(),
        headers.format_name(),
        metadata
    );
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::pe::tests::build_image;
    use goblin::pe::optional_header::MAGIC_64;

    #[test]
    fn reads_metadata_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.exe");
        std::fs::write(&path, build_image(MAGIC_64, 240, 0x11, 0x22, 0x33)).unwrap();

        let meta = read_image_metadata(&path).unwrap();
        assert_eq!(
            meta,
            ImageMetadata {
                timestamp: 0x11,
                checksum: 0x33,
                image_size: 0x22,
            }
        );
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image_metadata(dir.path().join("nope.exe")).unwrap_err();
        assert!(matches!(err, HeaderError::Io(_)));
    }
}
