//! Gzip archiver: copy-out compression of a single file.
//!
//! The destination is `<archive_dir>/<base name>.gz`. Files with the same base
//! name from different source directories land on the same destination and
//! the last one written wins. The source is opened read-only and is never
//! modified or removed.

#![allow(missing_docs)]

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use flate2::{Compression, GzBuilder};

use crate::core::errors::{FswError, Result};

/// Suffix appended to archived file names.
pub const ARCHIVE_SUFFIX: &str = ".gz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    dir: PathBuf,
    level: u32,
}

impl Archiver {
    /// `level` is clamped to gzip's 0..=9 range.
    pub fn new(dir: impl Into<PathBuf>, level: u32) -> Self {
        Self {
            dir: dir.into(),
            level: level.min(9),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `source` would be archived to.
    pub fn destination_for(&self, source: &Path) -> Result<PathBuf> {
        let Some(base) = source.file_name() else {
            return Err(FswError::Archive {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            });
        };
        let mut name = OsString::from(base);
        name.push(ARCHIVE_SUFFIX);
        Ok(self.dir.join(name))
    }

    /// Compress `source` into the archive directory and return the archive path.
    ///
    /// Both handles are dropped on every exit path. A failure part-way through
    /// can leave a truncated archive behind; the source is untouched either way.
    pub fn archive(&self, source: &Path) -> Result<PathBuf> {
        let dest = self.destination_for(source)?;
        self.compress(source, &dest)
            .map_err(|err| FswError::Archive {
                path: source.to_path_buf(),
                source: err,
            })?;
        Ok(dest)
    }

    fn compress(&self, source: &Path, dest: &Path) -> io::Result<()> {
        let input = File::open(source)?;
        let mtime = input
            .metadata()?
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map_or(0, |d| u32::try_from(d.as_secs()).unwrap_or(0));

        let output = File::create(dest)?;

        let mut builder = GzBuilder::new().mtime(mtime);
        if let Some(name) = source.file_name().and_then(|n| n.to_str()) {
            builder = builder.filename(name);
        }

        let mut encoder = builder.write(BufWriter::new(output), Compression::new(self.level));
        io::copy(&mut BufReader::new(input), &mut encoder)?;
        let mut output = encoder.finish()?;
        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn archive_round_trips_and_keeps_source() {
        let src_dir = TempDir::new().unwrap();
        let arc_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("app.log");
        let body = "line one\nline two\n".repeat(50);
        fs::write(&source, &body).unwrap();

        let archiver = Archiver::new(arc_dir.path(), 6);
        let dest = archiver.archive(&source).unwrap();

        assert_eq!(dest, arc_dir.path().join("app.log.gz"));
        assert_eq!(fs::read_to_string(&source).unwrap(), body);

        let mut decoder = GzDecoder::new(File::open(&dest).unwrap());
        let mut restored = String::new();
        decoder.read_to_string(&mut restored).unwrap();
        assert_eq!(restored, body);
        assert_eq!(
            decoder.header().and_then(|h| h.filename()),
            Some(&b"app.log"[..])
        );
    }

    #[test]
    fn same_base_name_overwrites() {
        let src_dir = TempDir::new().unwrap();
        let arc_dir = TempDir::new().unwrap();
        fs::create_dir_all(src_dir.path().join("one")).unwrap();
        fs::create_dir_all(src_dir.path().join("two")).unwrap();
        fs::write(src_dir.path().join("one").join("x.log"), "first").unwrap();
        fs::write(src_dir.path().join("two").join("x.log"), "second").unwrap();

        let archiver = Archiver::new(arc_dir.path(), 1);
        archiver.archive(&src_dir.path().join("one").join("x.log")).unwrap();
        let dest = archiver.archive(&src_dir.path().join("two").join("x.log")).unwrap();

        assert_eq!(fs::read_dir(arc_dir.path()).unwrap().count(), 1);
        let mut restored = String::new();
        GzDecoder::new(File::open(dest).unwrap())
            .read_to_string(&mut restored)
            .unwrap();
        assert_eq!(restored, "second");
    }

    #[test]
    fn missing_archive_dir_fails_without_touching_source() {
        let src_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("a.log");
        fs::write(&source, "keep me").unwrap();

        let archiver = Archiver::new(src_dir.path().join("no-such-dir"), 6);
        let err = archiver.archive(&source).unwrap_err();
        assert_eq!(err.code(), "FSW-3002");
        assert_eq!(fs::read_to_string(&source).unwrap(), "keep me");
    }

    #[test]
    fn missing_source_fails() {
        let arc_dir = TempDir::new().unwrap();
        let archiver = Archiver::new(arc_dir.path(), 6);
        let err = archiver.archive(&arc_dir.path().join("gone.log")).unwrap_err();
        assert!(matches!(err, FswError::Archive { .. }));
        assert_eq!(fs::read_dir(arc_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(Archiver::new("/tmp", 42), Archiver::new("/tmp", 9));
    }
}
