use crate::dump::format::*;
use crate::dump::view::DumpView;
use crate::error::DumpError;
use crate::image::ImageMetadata;
use crate::path_record::PathRecord;
use byteorder::{ByteOrder, LE};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Signature already at offset 0.
    AlreadyClean,
    /// Signature found at [`STALE_PREFIX_LEN`]; the prefix was dropped.
    Stripped,
    /// Signature at neither offset; the file is not one we manage.
    Unrecognized,
}

/// Where, if anywhere, the container signature sits in `data`.
pub fn classify_dump(data: &[u8]) -> CleanupOutcome {
    if signature_at(data, 0) == Some(MINIDUMP_SIGNATURE) {
        CleanupOutcome::AlreadyClean
    } else if signature_at(data, STALE_PREFIX_LEN) == Some(MINIDUMP_SIGNATURE) {
        CleanupOutcome::Stripped
    } else {
        CleanupOutcome::Unrecognized
    }
}

/// Drops an 8-byte leading artifact left in front of the dump signature.
///
/// Files that already start with the signature, or that carry it at neither
/// offset, are left byte-for-byte untouched.
pub fn cleanup_dump<P: AsRef<Path>>(path: P) -> io::Result<CleanupOutcome> {
    let path = path.as_ref();
    let data = fs::read(path)?;

    let outcome = classify_dump(&data);
    match outcome {
        CleanupOutcome::Stripped => {
            fs::write(path, &data[STALE_PREFIX_LEN..])?;
            log::info!(
                "{}: stripped {} stale leading bytes",
                path.display(),
                STALE_PREFIX_LEN
            );
        }
        CleanupOutcome::Unrecognized => {
            log::debug!(
                "{}: no dump signature at 0 or {}",
                path.display(),
                STALE_PREFIX_LEN
            );
        }
        CleanupOutcome::AlreadyClean => {}
    }
    Ok(outcome)
}

/// Result of a successful rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixup {
    /// Module-list streams whose first record was rewritten.
    pub modules_patched: usize,
    /// Size of the dump before the path record was appended, stored as the
    /// first module's name RVA.
    pub name_rva: u32,
}

/// Rewrites the first record of every module-list stream in `data` and clears
/// the container checksum. `data` is left alone if the signature or the
/// directory bounds are wrong.
///
/// A dump with no module-list stream is not an error: nothing is patched and
/// the returned count is zero.
pub fn patch_modules(data: &mut [u8], meta: &ImageMetadata) -> Result<Fixup, DumpError> {
    let name_rva =
        u32::try_from(data.len()).map_err(|_| DumpError::TooLarge { len: data.len() })?;

    let lists = {
        let view = DumpView::parse(data)?;
        view.module_lists().into_iter().collect::<Result<Vec<_>, _>>()?
    };

    // Any patch invalidates the container checksum; zero means "unset".
    LE::write_u32(&mut data[HEADER_CHECKSUM..], 0);

    let mut modules_patched = 0;
    for list in &lists {
        if list.count == 0 {
            log::warn!("module list at {:#x} is empty, nothing to patch", list.rva);
            continue;
        }

        let record = &mut data[list.first_module_offset()..][..SIZEOF_MODULE];
        // The name RVA points past the original content, at the path record
        // appended by the caller, rather than into the dump's own string data.
        LE::write_u32(&mut record[MODULE_NAME_RVA..], name_rva);
        LE::write_u32(&mut record[MODULE_CHECKSUM..], meta.checksum);
        LE::write_u32(&mut record[MODULE_SIZE_OF_IMAGE..], meta.image_size);
        LE::write_u32(&mut record[MODULE_TIME_DATE_STAMP..], meta.timestamp);
        modules_patched += 1;

        if list.count > 1 {
            log::debug!(
                "module list at {:#x} has {} entries; only the first is patched",
                list.rva,
                list.count
            );
        }
    }

    if lists.is_empty() {
        log::warn!("no module list stream found; only the path record will be written");
    }

    Ok(Fixup {
        modules_patched,
        name_rva,
    })
}

/// Patches the dump at `path` with `meta` and appends `record`.
///
/// The file is rewritten with a single write of the patched content followed
/// by the path record, and only once every check has passed.
pub fn fixup_dump<P: AsRef<Path>>(
    path: P,
    meta: &ImageMetadata,
    record: &PathRecord,
) -> Result<Fixup, DumpError> {
    let path = path.as_ref();
    let mut data = fs::read(path)?;

    let fixup = patch_modules(&mut data, meta)?;
    data.extend_from_slice(&record.to_bytes());
    fs::write(path, &data)?;

    log::info!(
        "{}: patched {} module record(s), path record at {:#x} -> {}",
        path.display(),
        fixup.modules_patched,
        fixup.name_rva,
        record.full_path()
    );
    Ok(fixup)
}
