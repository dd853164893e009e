use crate::error::DumpError;
use byteorder::{ByteOrder, LE};
use std::path::{is_separator, Path, MAIN_SEPARATOR};

/// Bytes per wide character in the appended string.
pub const WCHAR_WIDTH: u32 = 2;

/// The corrected module path appended after a dump's original content.
///
/// Layout: `u32` length prefix, UTF-16LE of `base_dir` + `executable`, then a
/// single zero byte. The module record's name RVA points at the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    base_dir: String,
    executable: String,
}

impl PathRecord {
    /// `base_dir` gets a trailing separator unless it already ends in one.
    /// `executable` is joined as given, even when it is itself absolute.
    pub fn new(base_dir: &Path, executable: &Path) -> Result<Self, DumpError> {
        let mut base_dir = path_to_string(base_dir)?;
        if !base_dir.ends_with(is_separator) {
            base_dir.push(MAIN_SEPARATOR);
        }

        Ok(PathRecord {
            base_dir,
            executable: path_to_string(executable)?,
        })
    }

    /// Uses the absolute current working directory as the base.
    pub fn from_current_dir(executable: &Path) -> Result<Self, DumpError> {
        let cwd = std::env::current_dir()?;
        Self::new(&cwd, executable)
    }

    pub fn full_path(&self) -> String {
        format!("{}{}", self.base_dir, self.executable)
    }

    /// Narrow executable length in bytes times the wide-char width, plus the
    /// directory length in characters. This is a mixed-unit value, not the
    /// byte length of the encoded string.
    pub fn length_prefix(&self) -> u32 {
        let exe = self.executable.len() as u32 * WCHAR_WIDTH;
        let dir = self.base_dir.encode_utf16().count() as u32;
        exe + dir
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let wide: Vec<u16> = self.full_path().encode_utf16().collect();
        let body = 4 + wide.len() * 2;

        // Trailing byte stays zero as the terminator.
        let mut out = vec![0u8; body + 1];
        LE::write_u32(&mut out, self.length_prefix());
        LE::write_u16_into(&wide, &mut out[4..body]);
        out
    }
}

fn path_to_string(path: &Path) -> Result<String, DumpError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| DumpError::NonUnicodePath(path.display().to_string()))
}
