/// A directory to be created on the receiving side before any file inside
/// it arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// Identifier assigned to this directory for the session.
    pub file_id: u16,
    /// Unix permission bits.
    pub perm: u16,
    /// Path relative to the transfer root.
    pub path: String,
}

/// A regular file to be transferred, with its whole-file digest already
/// computed (`FileInfo` carries it up front, before any chunk is sent).
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    /// Identifier assigned to this file for the session.
    pub file_id: u16,
    /// Unix permission bits.
    pub perm: u16,
    /// File size in bytes.
    pub size: u64,
    /// Modification time as a Unix timestamp.
    pub mtime: f64,
    /// Whole-file MD5 digest, computed ahead of transfer.
    pub md5: [u8; 16],
    /// Path relative to the transfer root.
    pub path: String,
}
