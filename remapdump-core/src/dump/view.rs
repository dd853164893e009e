use crate::dump::format::*;
use crate::error::DumpError;
use byteorder::{ByteOrder, LE};

/// A module-list stream whose count and first record lie inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleListLocation {
    pub rva: u32,
    pub count: u32,
}

impl ModuleListLocation {
    /// Offset of the first `MINIDUMP_MODULE` record.
    pub fn first_module_offset(&self) -> usize {
        self.rva as usize + 4
    }
}

/// Read-only structural view of a dump container.
///
/// Construction checks the signature and that the whole stream directory is
/// inside `data`; stream accessors check their own bounds before handing out
/// offsets.
#[derive(Debug)]
pub struct DumpView<'a> {
    data: &'a [u8],
    pub header: MinidumpHeader,
    pub directory: Vec<DirectoryEntry>,
}

impl<'a> DumpView<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, DumpError> {
        let signature = signature_at(data, 0).unwrap_or(0);
        if signature != MINIDUMP_SIGNATURE {
            return Err(DumpError::BadSignature { found: signature });
        }

        let header = MinidumpHeader::from_reader(&mut &data[..])?;

        let rva = header.stream_directory_rva;
        let count = header.number_of_streams;
        let out_of_bounds = DumpError::DirectoryOutOfBounds {
            rva,
            count,
            len: data.len(),
        };
        let end = (count as usize)
            .checked_mul(SIZEOF_DIRECTORY_ENTRY)
            .and_then(|n| n.checked_add(rva as usize));
        let table = match end {
            Some(end) if end <= data.len() => &data[rva as usize..end],
            _ => return Err(out_of_bounds),
        };

        let mut cur = table;
        let directory = (0..count)
            .map(|_| DirectoryEntry::from_reader(&mut cur))
            .collect::<Result<Vec<_>, _>>()?;

        for entry in &directory {
            log::debug!(
                "stream type {} at {:#x} ({} bytes)",
                entry.stream_type,
                entry.rva,
                entry.data_size
            );
        }

        Ok(DumpView {
            data,
            header,
            directory,
        })
    }

    /// Every module-list stream in directory order.
    pub fn module_lists(&self) -> Vec<Result<ModuleListLocation, DumpError>> {
        self.directory
            .iter()
            .filter(|entry| entry.stream_type == MODULE_LIST_STREAM)
            .map(|entry| self.module_list_at(entry))
            .collect()
    }

    fn module_list_at(&self, entry: &DirectoryEntry) -> Result<ModuleListLocation, DumpError> {
        let out_of_bounds = || DumpError::StreamOutOfBounds {
            stream_type: entry.stream_type,
            rva: entry.rva,
            len: self.data.len(),
        };

        let start = entry.rva as usize;
        let count_bytes = self.data.get(start..start + 4).ok_or_else(out_of_bounds)?;
        let count = LE::read_u32(count_bytes);

        if count > 0 && start + 4 + SIZEOF_MODULE > self.data.len() {
            return Err(out_of_bounds());
        }

        Ok(ModuleListLocation {
            rva: entry.rva,
            count,
        })
    }
}
