use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use checksums::strong::Md5;
use filetime::{set_file_mtime, FileTime};

use crate::entry::{DirEntry, FileEntry};
use crate::error::TransferError;

/// Fixed chunk size used to split file content into `FileChunk` frames.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Where a `Sender` reads the directories, files, and bytes it transfers.
///
/// Implemented directly against the real filesystem by [`FsSource`];
/// decoupled here so the protocol state machine can be driven in tests
/// without touching disk.
pub trait ChunkSource {
    /// Total number of regular files in the transfer.
    fn file_count(&self) -> u16;

    /// Every directory to create on the receiving side, in the order they
    /// should be created.
    fn directories(&self) -> &[DirEntry];

    /// Every file to transfer, with metadata and digest already computed.
    fn files(&self) -> &[FileEntry];

    /// Reads chunk number `seq` of `file_id` (each `CHUNK_SIZE` bytes except
    /// possibly the last). Returns an empty vector once `seq` is past the
    /// end of the file.
    fn read_chunk(&self, file_id: u16, seq: u32) -> io::Result<Vec<u8>>;
}

/// Where a `Receiver` writes the directories, files, and bytes it accepts.
pub trait ChunkSink {
    /// Creates `path` (relative to the destination root) with `perm`.
    fn create_dir(&mut self, path: &str, perm: u16) -> io::Result<()>;

    /// Prepares to receive `size` bytes for `path`, pre-allocating if the
    /// implementation finds that useful.
    fn begin_file(&mut self, file_id: u16, path: &str, perm: u16, size: u64, mtime: f64) -> io::Result<()>;

    /// Writes chunk number `seq` of `file_id` at its corresponding offset.
    /// Chunks may arrive out of order; positional writes make that safe.
    fn write_chunk(&mut self, file_id: u16, seq: u32, data: &[u8]) -> io::Result<()>;

    /// Called once all of a file's bytes have arrived: verifies the
    /// whole-file digest and applies final metadata (permissions, mtime).
    fn finish_file(&mut self, file_id: u16, expected_md5: [u8; 16]) -> Result<(), TransferError>;
}

/// A [`ChunkSource`] that walks a real directory tree.
pub struct FsSource {
    root: PathBuf,
    directories: Vec<DirEntry>,
    files: Vec<FileEntry>,
}

impl FsSource {
    /// Walks `root`, assigning sequential ids to every directory and file
    /// found, and computing each file's whole-file MD5 digest up front.
    pub fn scan(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let mut directories = Vec::new();
        let mut files = Vec::new();
        let mut next_id = 0u16;
        walk(&root, &root, &mut directories, &mut files, &mut next_id)?;
        Ok(Self { root, directories, files })
    }

    fn file_path(&self, file_id: u16) -> Option<PathBuf> {
        self.files.iter().find(|f| f.file_id == file_id).map(|f| self.root.join(&f.path))
    }
}

fn walk(
    root: &Path,
    dir: &Path,
    directories: &mut Vec<DirEntry>,
    files: &mut Vec<FileEntry>,
    next_id: &mut u16,
) -> io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let metadata = entry.metadata()?;
        let relative = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().replace('\\', "/");

        if metadata.is_dir() {
            let file_id = *next_id;
            *next_id += 1;
            directories.push(DirEntry {
                file_id,
                perm: perm_bits(&metadata),
                path: relative,
            });
            walk(root, &path, directories, files, next_id)?;
        } else if metadata.is_file() {
            let file_id = *next_id;
            *next_id += 1;
            let md5 = digest_file(&path)?;
            files.push(FileEntry {
                file_id,
                perm: perm_bits(&metadata),
                size: metadata.len(),
                mtime: mtime_as_unix(&metadata),
                md5,
                path: relative,
            });
        }
    }
    Ok(())
}

fn perm_bits(metadata: &fs::Metadata) -> u16 {
    (metadata.permissions().mode() & 0o7777) as u16
}

fn mtime_as_unix(metadata: &fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |duration| duration.as_secs_f64())
}

fn digest_file(path: &Path) -> io::Result<[u8; 16]> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

impl ChunkSource for FsSource {
    fn file_count(&self) -> u16 {
        self.files.len() as u16
    }

    fn directories(&self) -> &[DirEntry] {
        &self.directories
    }

    fn files(&self) -> &[FileEntry] {
        &self.files
    }

    fn read_chunk(&self, file_id: u16, seq: u32) -> io::Result<Vec<u8>> {
        let Some(path) = self.file_path(file_id) else {
            return Ok(Vec::new());
        };
        let mut file = File::open(path)?;
        let offset = u64::from(seq) * CHUNK_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = file.read(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// A [`ChunkSink`] that writes a real directory tree.
pub struct FsSink {
    root: PathBuf,
    files: std::collections::HashMap<u16, FileRecord>,
}

struct FileRecord {
    path: PathBuf,
    relative: String,
    perm: u16,
    mtime: f64,
}

impl FsSink {
    /// Writes beneath `root`, creating it if necessary.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            files: std::collections::HashMap::new(),
        })
    }
}

impl ChunkSink for FsSink {
    fn create_dir(&mut self, path: &str, perm: u16) -> io::Result<()> {
        let full = self.root.join(path);
        fs::create_dir_all(&full)?;
        fs::set_permissions(&full, fs::Permissions::from_mode(u32::from(perm)))
    }

    fn begin_file(&mut self, file_id: u16, path: &str, perm: u16, size: u64, mtime: f64) -> io::Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(&full)?;
        file.set_len(size)?;
        self.files.insert(
            file_id,
            FileRecord {
                path: full,
                relative: path.to_string(),
                perm,
                mtime,
            },
        );
        Ok(())
    }

    fn write_chunk(&mut self, file_id: u16, seq: u32, data: &[u8]) -> io::Result<()> {
        let record = self
            .files
            .get(&file_id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "chunk for unknown file id"))?;
        let mut file = OpenOptions::new().write(true).open(&record.path)?;
        let offset = u64::from(seq) * CHUNK_SIZE as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)
    }

    fn finish_file(&mut self, file_id: u16, expected_md5: [u8; 16]) -> Result<(), TransferError> {
        let record = self
            .files
            .remove(&file_id)
            .ok_or_else(|| TransferError::OutOfSequence(format!("finish_file for unknown file id {file_id}")))?;

        let computed = digest_file(&record.path)?;
        if computed != expected_md5 {
            return Err(TransferError::ChecksumMismatch {
                path: record.relative,
                declared: hex(&expected_md5),
                computed: hex(&computed),
            });
        }

        fs::set_permissions(&record.path, fs::Permissions::from_mode(u32::from(record.perm)))?;
        set_file_mtime(&record.path, FileTime::from_unix_time(record.mtime as i64, 0))?;
        Ok(())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scans_nested_directories_and_files_in_order() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"beta").unwrap();

        let source = FsSource::scan(dir.path()).unwrap();
        assert_eq!(source.file_count(), 2);
        assert_eq!(source.directories().len(), 1);
        assert_eq!(source.directories()[0].path, "sub");
    }

    #[test]
    fn read_chunk_returns_empty_past_eof() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let source = FsSource::scan(dir.path()).unwrap();
        let file_id = source.files()[0].file_id;

        let chunk = source.read_chunk(file_id, 0).unwrap();
        assert_eq!(chunk, b"hello");
        let empty = source.read_chunk(file_id, 1).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn sink_round_trips_a_small_file() {
        let src_dir = tempdir().unwrap();
        fs::write(src_dir.path().join("a.txt"), b"round trip me").unwrap();
        let source = FsSource::scan(src_dir.path()).unwrap();
        let file = &source.files()[0];

        let dst_dir = tempdir().unwrap();
        let mut sink = FsSink::new(dst_dir.path()).unwrap();
        sink.begin_file(file.file_id, &file.path, file.perm, file.size, file.mtime).unwrap();
        sink.write_chunk(file.file_id, 0, b"round trip me").unwrap();
        sink.finish_file(file.file_id, file.md5).unwrap();

        let written = fs::read(dst_dir.path().join("a.txt")).unwrap();
        assert_eq!(written, b"round trip me");
    }

    #[test]
    fn finish_file_rejects_a_digest_mismatch() {
        let dst_dir = tempdir().unwrap();
        let mut sink = FsSink::new(dst_dir.path()).unwrap();
        sink.begin_file(1, "a.txt", 0o644, 5, 0.0).unwrap();
        sink.write_chunk(1, 0, b"wrong").unwrap();

        let err = sink.finish_file(1, [0u8; 16]).unwrap_err();
        assert!(matches!(err, TransferError::ChecksumMismatch { .. }));
    }

    #[test]
    fn out_of_order_chunks_land_at_the_right_offset() {
        let dst_dir = tempdir().unwrap();
        let mut sink = FsSink::new(dst_dir.path()).unwrap();
        sink.begin_file(1, "a.txt", 0o644, (CHUNK_SIZE * 2) as u64, 0.0).unwrap();

        let second = vec![b'b'; CHUNK_SIZE];
        let first = vec![b'a'; CHUNK_SIZE];
        sink.write_chunk(1, 1, &second).unwrap();
        sink.write_chunk(1, 0, &first).unwrap();

        let written = fs::read(dst_dir.path().join("a.txt")).unwrap();
        assert_eq!(&written[..CHUNK_SIZE], first.as_slice());
        assert_eq!(&written[CHUNK_SIZE..], second.as_slice());
    }
}
