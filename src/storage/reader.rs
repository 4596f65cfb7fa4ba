//! Read-only, random-access page reader.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::storage::error::StorageError;
use crate::storage::format::{JetFormat, VERSION_OFFSET};
use crate::storage::page::PageId;

/// Random-access reader over the pages of a JET file.
///
/// The page size is fixed when the file is mounted, from the version field of
/// the header page. Reads are a single seek plus a read of one page.
///
/// # File Layout
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (header)  | Page 1           | Page 2 (MSysObj) | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ page_size        ^ 2 * page_size
/// ```
///
/// # Concurrency
///
/// The file handle sits behind a mutex so that the scanner and the row
/// decoder can share one `Arc<PageReader>`; callers are still expected to
/// drive a reader from a single logical thread.
pub struct PageReader {
    path: PathBuf,
    file: Mutex<File>,
    format: JetFormat,
    page_count: u32,
}

impl PageReader {
    /// Opens a database file and detects its format.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be opened,
    /// `StorageError::Truncated` if it is shorter than one page, and
    /// `NotJetDatabase`/`UnsupportedVersion` for a foreign header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).map_err(|e| StorageError::io(&path, e))?;
        let len = file
            .metadata()
            .map_err(|e| StorageError::io(&path, e))?
            .len();

        let needed = (VERSION_OFFSET + 4) as u64;
        if len < needed {
            return Err(StorageError::Truncated { len, needed });
        }

        let mut header = [0u8; VERSION_OFFSET + 4];
        file.read_exact(&mut header)
            .map_err(|e| StorageError::io(&path, e))?;
        let format = JetFormat::detect(&header)?;

        let page_size = format.page_size() as u64;
        if len < page_size {
            return Err(StorageError::Truncated {
                len,
                needed: page_size,
            });
        }

        let page_count = u32::try_from(len / page_size).unwrap_or(u32::MAX);
        debug!(
            path = %path.display(),
            version = ?format.version(),
            page_size,
            page_count,
            "mounted database file"
        );

        Ok(Self {
            path,
            file: Mutex::new(file),
            format,
            page_count,
        })
    }

    /// Reads one page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageOutOfRange` if the page lies past the end of
    /// the file and `StorageError::Io` if the read fails.
    pub fn read_page(&self, page_id: PageId) -> Result<Bytes, StorageError> {
        if page_id.page_num() >= self.page_count {
            return Err(StorageError::PageOutOfRange {
                page: page_id,
                count: self.page_count,
            });
        }

        let page_size = self.format.page_size();
        let mut buf = vec![0u8; page_size];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.byte_offset(page_size)))
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.read_exact(&mut buf)
            .map_err(|e| StorageError::io(&self.path, e))?;

        Ok(Bytes::from(buf))
    }

    /// Returns the detected file format.
    pub fn format(&self) -> &JetFormat {
        &self.format
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.format.page_size()
    }

    /// Returns the number of whole pages in the file.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Returns the path of the mounted file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PageReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageReader")
            .field("path", &self.path)
            .field("version", &self.format.version())
            .field("page_count", &self.page_count)
            .finish()
    }
}
