//! Classpath entries
//!
//! A single location on the search path: a directory tree of class files, or
//! an archive holding the same layout. Archives are jar/zip files or tar files
//! (plain or gzip-compressed).

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use super::accumulate::drain;

/// An open, read-once resource positioned at offset 0
pub type ResourceStream = Box<dyn Read + Send>;

/// Archive suffixes recognised as classpath entries
const TAR_SUFFIXES: &[&str] = &[".tar"];
const TAR_GZ_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];
const ZIP_SUFFIXES: &[&str] = &[".jar", ".zip"];

/// One location consulted during resource lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    /// Directory whose subtree mirrors resource paths
    Directory(PathBuf),
    /// Jar, zip or tar archive whose member names mirror resource paths
    Archive(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Tar,
    TarGz,
    Zip,
}

impl ClasspathEntry {
    /// Classify a path by its suffix; anything that is not an archive is
    /// treated as a directory.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() && archive_format(&path).is_some() {
            ClasspathEntry::Archive(path)
        } else {
            ClasspathEntry::Directory(path)
        }
    }

    /// The filesystem location of this entry
    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::Directory(path) | ClasspathEntry::Archive(path) => path,
        }
    }

    /// Open `resource` (a `/`-separated relative path) if this entry has it.
    ///
    /// A missing entry, or a missing resource inside it, is `Ok(None)`. Any
    /// other failure to read the entry is returned as an error.
    pub fn open_if_present(&self, resource: &str) -> io::Result<Option<ResourceStream>> {
        match self {
            ClasspathEntry::Directory(root) => open_in_directory(root, resource),
            ClasspathEntry::Archive(archive) => match archive_format(archive) {
                Some(ArchiveFormat::Zip) => open_in_zip(archive, resource),
                Some(ArchiveFormat::TarGz) => open_in_tar_gz(archive, resource),
                _ => open_in_tar(archive, resource),
            },
        }
    }
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

fn archive_format(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if ZIP_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(ArchiveFormat::Zip)
    } else if TAR_GZ_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(ArchiveFormat::TarGz)
    } else if TAR_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(ArchiveFormat::Tar)
    } else {
        None
    }
}

fn open_in_directory(root: &Path, resource: &str) -> io::Result<Option<ResourceStream>> {
    let path = root.join(resource);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(_) if root.is_file() => {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "'{}' is neither a directory nor an archive",
                    root.display()
                ),
            ))
        }
        // A plain file where a package directory would be
        Err(e) if e.kind() == ErrorKind::NotADirectory => return Ok(None),
        Err(e) => return Err(e),
    };

    if !file.metadata()?.is_file() {
        return Ok(None);
    }

    debug!(path = %path.display(), "resource found in directory");
    Ok(Some(Box::new(file)))
}

fn member_matches(member: &Path, resource: &str) -> bool {
    let member = member.strip_prefix(".").unwrap_or(member);
    member == Path::new(resource)
}

/// Plain tar: locate the member, then hand out a bounded view of the archive
/// file itself so nothing is buffered.
fn open_in_tar(archive: &Path, resource: &str) -> io::Result<Option<ResourceStream>> {
    let file = match File::open(archive) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut tar = tar::Archive::new(file);
    let mut hit = None;
    for entry in tar.entries_with_seek()? {
        let entry = entry?;
        if entry.header().entry_type().is_file() && member_matches(&entry.path()?, resource) {
            hit = Some((entry.raw_file_position(), entry.size()));
            break;
        }
    }

    let Some((offset, size)) = hit else {
        return Ok(None);
    };

    let mut file = tar.into_inner();
    file.seek(SeekFrom::Start(offset))?;
    debug!(
        archive = %archive.display(),
        resource,
        offset,
        size,
        "resource found in tar archive"
    );
    Ok(Some(Box::new(MemberReader::new(file.take(size), size))))
}

/// Bounded view of one tar member. An archive that ends inside the member is
/// reported as `UnexpectedEof` rather than as a short read.
struct MemberReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> MemberReader<R> {
    fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            remaining: size,
        }
    }
}

impl<R: Read> Read for MemberReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("archive ends {} bytes before the member does", self.remaining),
            ));
        }
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(n)
    }
}

/// Gzip tar: members can only be reached by decompressing, so the matching
/// member is inflated into memory.
fn open_in_tar_gz(archive: &Path, resource: &str) -> io::Result<Option<ResourceStream>> {
    let file = match File::open(archive) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut tar = tar::Archive::new(GzDecoder::new(file));
    for entry in tar.entries()? {
        let entry = entry?;
        if entry.header().entry_type().is_file() && member_matches(&entry.path()?, resource) {
            let size = entry.size();
            let bytes = drain(entry)?;
            let missing = size.saturating_sub(bytes.len() as u64);
            if missing > 0 {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("archive ends {} bytes before the member does", missing),
                ));
            }
            debug!(
                archive = %archive.display(),
                resource,
                size = bytes.len(),
                "resource inflated from tar.gz archive"
            );
            return Ok(Some(Box::new(Cursor::new(bytes))));
        }
    }

    Ok(None)
}

fn zip_io_error(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(ErrorKind::InvalidData, other),
    }
}

/// Jar/zip: members are located through the central directory and inflated
/// into memory.
fn open_in_zip(archive: &Path, resource: &str) -> io::Result<Option<ResourceStream>> {
    let file = match File::open(archive) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(zip_io_error)?;
    let bytes = match zip.by_name(resource) {
        Ok(member) if member.is_dir() => return Ok(None),
        Ok(member) => drain(member)?,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(zip_io_error(e)),
    };

    debug!(
        archive = %archive.display(),
        resource,
        size = bytes.len(),
        "resource inflated from zip archive"
    );
    Ok(Some(Box::new(Cursor::new(bytes))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_suffix() {
        assert!(matches!(
            ClasspathEntry::from_path("lib/rt.tar"),
            ClasspathEntry::Archive(_)
        ));
        assert!(matches!(
            ClasspathEntry::from_path("lib/rt.TAR.GZ"),
            ClasspathEntry::Archive(_)
        ));
        assert!(matches!(
            ClasspathEntry::from_path("lib/rt.tgz"),
            ClasspathEntry::Archive(_)
        ));
        assert!(matches!(
            ClasspathEntry::from_path("lib/rt.jar"),
            ClasspathEntry::Archive(_)
        ));
        assert!(matches!(
            ClasspathEntry::from_path("lib/classes.zip"),
            ClasspathEntry::Archive(_)
        ));
        assert!(matches!(
            ClasspathEntry::from_path("build/classes"),
            ClasspathEntry::Directory(_)
        ));
    }

    #[test]
    fn test_member_reader_stops_at_size() {
        let mut reader = MemberReader::new(Cursor::new(b"abcdef".to_vec()).take(4), 4);
        assert_eq!(drain(&mut reader).unwrap(), b"abcd");
    }

    #[test]
    fn test_member_reader_reports_short_archive() {
        let reader = MemberReader::new(Cursor::new(b"abc".to_vec()).take(8), 8);
        let err = drain(reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_member_matches() {
        assert!(member_matches(Path::new("a/b/C.class"), "a/b/C.class"));
        assert!(member_matches(Path::new("./a/b/C.class"), "a/b/C.class"));
        assert!(!member_matches(Path::new("x/a/b/C.class"), "a/b/C.class"));
    }

    #[test]
    fn test_missing_entries_are_absent() {
        let dir = ClasspathEntry::Directory(PathBuf::from("/nonexistent/terrajava/classes"));
        assert!(dir.open_if_present("a/B.class").unwrap().is_none());

        let tar = ClasspathEntry::Archive(PathBuf::from("/nonexistent/terrajava/rt.tar"));
        assert!(tar.open_if_present("a/B.class").unwrap().is_none());

        let tgz = ClasspathEntry::Archive(PathBuf::from("/nonexistent/terrajava/rt.tar.gz"));
        assert!(tgz.open_if_present("a/B.class").unwrap().is_none());

        let jar = ClasspathEntry::Archive(PathBuf::from("/nonexistent/terrajava/rt.jar"));
        assert!(jar.open_if_present("a/B.class").unwrap().is_none());
    }

    #[test]
    fn test_display() {
        let entry = ClasspathEntry::Directory(PathBuf::from("build/classes"));
        assert_eq!(entry.to_string(), "build/classes");
    }
}
