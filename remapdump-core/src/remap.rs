use crate::dump::{cleanup_dump, fixup_dump, CleanupOutcome};
use crate::error::DumpError;
use crate::image::ImageMetadata;
use crate::path_record::PathRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of the files picked up by [`find_dumps`].
pub const DUMP_EXTENSION: &str = "dmp";

/// Snapshot of the `*.dmp` files directly inside `dir`, sorted by path.
///
/// The extension match ignores case.
pub fn find_dumps<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut dumps = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_dump = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DUMP_EXTENSION));
        if is_dump {
            dumps.push(path);
        }
    }
    dumps.sort();
    Ok(dumps)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    pub cleanup: CleanupOutcome,
    pub modules_patched: usize,
    pub name_rva: u32,
}

/// Runs the cleanup pass and then the rewrite pass on one dump.
///
/// Cleanup is best-effort: if it cannot read the file the rewrite pass still
/// runs and reports the real failure.
pub fn remap_dump<P: AsRef<Path>>(
    path: P,
    meta: &ImageMetadata,
    record: &PathRecord,
) -> Result<PatchReport, DumpError> {
    let path = path.as_ref();
    let cleanup = cleanup_dump(path).unwrap_or_else(|e| {
        log::warn!("{}: cleanup skipped: {e}", path.display());
        CleanupOutcome::Unrecognized
    });

    let fixup = fixup_dump(path, meta, record)?;
    Ok(PatchReport {
        cleanup,
        modules_patched: fixup.modules_patched,
        name_rva: fixup.name_rva,
    })
}

#[derive(Debug)]
pub struct RemapOutcome {
    pub path: PathBuf,
    pub result: Result<PatchReport, DumpError>,
}

impl RemapOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Remaps every dump in `dumps`, in order. A failing file never stops the run.
pub fn remap_all<I>(dumps: I, meta: &ImageMetadata, record: &PathRecord) -> Vec<RemapOutcome>
where
    I: IntoIterator<Item = PathBuf>,
{
    dumps
        .into_iter()
        .map(|path| {
            let result = remap_dump(&path, meta, record);
            if let Err(e) = &result {
                log::error!("{}: {e}", path.display());
            }
            RemapOutcome { path, result }
        })
        .collect()
}
