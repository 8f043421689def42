//! In-memory file system
//!
//! A flat namespace of byte vectors plus a per-process descriptor table.
//! Descriptors start at 3 (0-2 belong to the console by convention) and are
//! reused lowest-first after `close`.

use std::collections::BTreeMap;

use klog_core::{klog_debug, klog_info, klog_warn};

use crate::dev::IRQ_DISK;
use crate::error::KernelError;
use crate::{Kernel, ProcessId};

/// Per-process descriptor limit.
pub const NOFILE: u32 = 16;

const FIRST_FD: u32 = 3;

const README: &str = "klog hosted kernel\n\
    \n\
    Every subsystem of this kernel logs through the kernel log engine.\n\
    Inspect the log with klogview, exercise it with klogtest and logstress.\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fd(pub u32);

/// How `open` treats the target path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, read-only
    Read,
    /// Existing file, read-write
    ReadWrite,
    /// Create or truncate, read-write
    Create,
}

struct OpenFile {
    path: String,
    offset: usize,
    writable: bool,
}

pub(crate) struct FileTable {
    files: BTreeMap<String, Vec<u8>>,
    open: BTreeMap<(ProcessId, Fd), OpenFile>,
}

impl FileTable {
    /// Root file system as mounted at boot.
    pub(crate) fn rootfs() -> Self {
        let mut files = BTreeMap::new();
        files.insert("README".to_string(), README.as_bytes().to_vec());
        files.insert("etc/motd".to_string(), b"welcome\n".to_vec());
        Self {
            files,
            open: BTreeMap::new(),
        }
    }

    pub(crate) fn file_count(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn size(&self, path: &str) -> Option<usize> {
        self.files.get(path).map(Vec::len)
    }

    fn open(&mut self, pid: ProcessId, path: &str, mode: OpenMode) -> Result<Fd, KernelError> {
        match mode {
            OpenMode::Create => {
                self.files.insert(path.to_string(), Vec::new());
            }
            OpenMode::Read | OpenMode::ReadWrite if !self.files.contains_key(path) => {
                return Err(KernelError::FileNotFound);
            }
            OpenMode::Read | OpenMode::ReadWrite => {}
        }
        let fd = (FIRST_FD..FIRST_FD + NOFILE)
            .map(Fd)
            .find(|fd| !self.open.contains_key(&(pid, *fd)))
            .ok_or(KernelError::TooManyOpenFiles)?;
        self.open.insert(
            (pid, fd),
            OpenFile {
                path: path.to_string(),
                offset: 0,
                writable: mode != OpenMode::Read,
            },
        );
        Ok(fd)
    }

    fn read(&mut self, pid: ProcessId, fd: Fd, buf: &mut [u8]) -> Result<usize, KernelError> {
        let file = self.open.get_mut(&(pid, fd)).ok_or(KernelError::BadDescriptor)?;
        let data = self.files.get(&file.path).map(Vec::as_slice).unwrap_or(&[]);
        let start = file.offset.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        file.offset = start + n;
        Ok(n)
    }

    fn write(&mut self, pid: ProcessId, fd: Fd, bytes: &[u8]) -> Result<usize, KernelError> {
        let file = self.open.get_mut(&(pid, fd)).ok_or(KernelError::BadDescriptor)?;
        if !file.writable {
            return Err(KernelError::PermissionDenied);
        }
        let data = self.files.entry(file.path.clone()).or_default();
        let end = file.offset + bytes.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[file.offset..end].copy_from_slice(bytes);
        file.offset = end;
        Ok(bytes.len())
    }

    fn close(&mut self, pid: ProcessId, fd: Fd) -> Result<String, KernelError> {
        self.open
            .remove(&(pid, fd))
            .map(|file| file.path)
            .ok_or(KernelError::BadDescriptor)
    }

    fn close_all(&mut self, pid: ProcessId) -> usize {
        let before = self.open.len();
        self.open.retain(|(owner, _), _| *owner != pid);
        before - self.open.len()
    }
}

// ============================================================================
// File syscalls
// ============================================================================

impl Kernel {
    pub(crate) fn fs_open(&self, pid: ProcessId, path: &str, mode: OpenMode) -> Result<Fd, KernelError> {
        let result = self.files().open(pid, path, mode);
        match result {
            Ok(fd) => klog_info!(self.log(), "fs", "open {} fd={} mode={:?}", path, fd.0, mode),
            Err(e) => klog_warn!(self.log(), "fs", "open {} failed: {}", path, e),
        }
        result
    }

    pub(crate) fn fs_read(&self, pid: ProcessId, fd: Fd, buf: &mut [u8]) -> Result<usize, KernelError> {
        let result = self.files().read(pid, fd, buf);
        match result {
            Ok(n) => klog_debug!(self.log(), "fs", "read fd={} {} bytes", fd.0, n),
            Err(e) => klog_warn!(self.log(), "fs", "read fd={} failed: {}", fd.0, e),
        }
        result
    }

    pub(crate) fn fs_write(&self, pid: ProcessId, fd: Fd, bytes: &[u8]) -> Result<usize, KernelError> {
        let result = self.files().write(pid, fd, bytes);
        match result {
            Ok(n) => {
                klog_debug!(self.log(), "fs", "write fd={} {} bytes", fd.0, n);
                self.interrupt(IRQ_DISK);
            }
            Err(e) => klog_warn!(self.log(), "fs", "write fd={} failed: {}", fd.0, e),
        }
        result
    }

    pub(crate) fn fs_close(&self, pid: ProcessId, fd: Fd) -> Result<(), KernelError> {
        let result = self.files().close(pid, fd);
        match &result {
            Ok(path) => klog_info!(self.log(), "fs", "close {} fd={}", path, fd.0),
            Err(e) => klog_warn!(self.log(), "fs", "close fd={} failed: {}", fd.0, e),
        }
        result.map(|_| ())
    }

    /// Release every descriptor `pid` still holds.
    pub(crate) fn fs_release(&self, pid: ProcessId) {
        let closed = self.files().close_all(pid);
        if closed > 0 {
            klog_warn!(self.log(), "fs", "pid {} exited with {} open files", pid, closed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: ProcessId = ProcessId(2);

    #[test]
    fn test_read_readme() {
        let mut fs = FileTable::rootfs();
        let fd = fs.open(P, "README", OpenMode::Read).unwrap();
        assert_eq!(fd, Fd(3));

        let mut buf = [0u8; 4];
        assert_eq!(fs.read(P, fd, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"klog");
        let mut rest = vec![0u8; 1024];
        let n = fs.read(P, fd, &mut rest).unwrap();
        assert_eq!(n + 4, fs.size("README").unwrap());
        assert_eq!(fs.read(P, fd, &mut rest).unwrap(), 0);
    }

    #[test]
    fn test_create_write_then_read_back() {
        let mut fs = FileTable::rootfs();
        let fd = fs.open(P, "tmp/a", OpenMode::Create).unwrap();
        assert_eq!(fs.write(P, fd, b"hello").unwrap(), 5);
        fs.close(P, fd).unwrap();

        let fd = fs.open(P, "tmp/a", OpenMode::Read).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(fs.read(P, fd, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(fs.write(P, fd, b"x"), Err(KernelError::PermissionDenied));
    }

    #[test]
    fn test_descriptor_errors() {
        let mut fs = FileTable::rootfs();
        assert_eq!(fs.open(P, "missing", OpenMode::Read), Err(KernelError::FileNotFound));
        assert_eq!(fs.close(P, Fd(3)), Err(KernelError::BadDescriptor));

        let fd = fs.open(P, "README", OpenMode::Read).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(fs.read(ProcessId(9), fd, &mut buf), Err(KernelError::BadDescriptor));
    }

    #[test]
    fn test_descriptor_limit_and_reuse() {
        let mut fs = FileTable::rootfs();
        for _ in 0..NOFILE {
            fs.open(P, "README", OpenMode::Read).unwrap();
        }
        assert_eq!(fs.open(P, "README", OpenMode::Read), Err(KernelError::TooManyOpenFiles));

        fs.close(P, Fd(5)).unwrap();
        assert_eq!(fs.open(P, "README", OpenMode::Read), Ok(Fd(5)));
        assert_eq!(fs.close_all(P), NOFILE as usize);
    }
}
