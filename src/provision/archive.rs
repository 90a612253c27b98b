//! Archive validation and extraction
//!
//! Downloads are validated before extraction: the file must be non-empty
//! and start with the magic bytes of its declared container format.
//! GitHub tag tarballs wrap everything in a single `<name>-<version>/`
//! root directory; `locate_root` resolves past it.

use crate::error::{CorekitError, CorekitResult};
use crate::provision::package::ArchiveFormat;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 2] = [0x50, 0x4b];

/// Check that the archive is non-empty and matches its declared format.
pub fn validate(path: &Path, format: ArchiveFormat) -> CorekitResult<()> {
    let metadata = fs::metadata(path)
        .map_err(|e| CorekitError::io(format!("reading metadata of {}", path.display()), e))?;

    if metadata.len() == 0 {
        return Err(CorekitError::validation(path, "archive is empty"));
    }

    let mut file = File::open(path)
        .map_err(|e| CorekitError::io(format!("opening {}", path.display()), e))?;
    let mut magic = [0u8; 2];
    file.read_exact(&mut magic)
        .map_err(|_| CorekitError::validation(path, "archive too short to identify"))?;

    let expected = match format {
        ArchiveFormat::TarGz => GZIP_MAGIC,
        ArchiveFormat::Zip => ZIP_MAGIC,
    };

    if magic != expected {
        return Err(CorekitError::validation(
            path,
            format!("not a {format} archive (bad magic bytes)"),
        ));
    }

    Ok(())
}

/// Extract an archive into `dest`, which must already exist.
pub fn unpack(path: &Path, format: ArchiveFormat, dest: &Path) -> CorekitResult<()> {
    debug!(archive = %path.display(), dest = %dest.display(), "Extracting archive");

    match format {
        ArchiveFormat::TarGz => {
            let file = File::open(path)
                .map_err(|e| CorekitError::io(format!("opening {}", path.display()), e))?;
            let mut archive = Archive::new(GzDecoder::new(file));
            archive
                .unpack(dest)
                .map_err(|e| CorekitError::validation(path, format!("tar extraction failed: {e}")))?;
        }
        ArchiveFormat::Zip => {
            let file = File::open(path)
                .map_err(|e| CorekitError::io(format!("opening {}", path.display()), e))?;
            let mut archive = zip::ZipArchive::new(file)
                .map_err(|e| CorekitError::validation(path, format!("zip open failed: {e}")))?;
            archive
                .extract(dest)
                .map_err(|e| CorekitError::validation(path, format!("zip extraction failed: {e}")))?;
        }
    }

    Ok(())
}

/// Resolve the content root of an extracted archive.
///
/// When the archive unpacked to exactly one directory (the GitHub tag
/// tarball layout), that directory is the root; otherwise `dir` itself is.
pub fn locate_root(dir: &Path) -> CorekitResult<PathBuf> {
    let mut entries = Vec::new();
    let read = fs::read_dir(dir)
        .map_err(|e| CorekitError::io(format!("reading {}", dir.display()), e))?;
    for entry in read {
        let entry = entry.map_err(|e| CorekitError::io(format!("reading {}", dir.display()), e))?;
        entries.push(entry.path());
    }

    match entries.as_slice() {
        [] => Err(CorekitError::validation(dir, "archive extracted to nothing")),
        [single] if single.is_dir() => Ok(single.clone()),
        _ => Ok(dir.to_path_buf()),
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::{tarball, zipball};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn validate_rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.tar.gz");
        fs::write(&path, b"").unwrap();

        let err = validate(&path, ArchiveFormat::TarGz).unwrap_err();
        assert!(matches!(err, CorekitError::Validation { .. }));
    }

    #[test]
    fn validate_rejects_wrong_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bogus.tar.gz");
        fs::write(&path, b"<html>not found</html>").unwrap();

        let err = validate(&path, ArchiveFormat::TarGz).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn validate_accepts_real_archives() {
        let dir = TempDir::new().unwrap();

        let tar_path = dir.path().join("pkg.tar.gz");
        fs::write(&tar_path, tarball(&[("file.txt", b"hi")])).unwrap();
        validate(&tar_path, ArchiveFormat::TarGz).unwrap();

        let zip_path = dir.path().join("pkg.zip");
        fs::write(&zip_path, zipball(&[("file.txt", b"hi")])).unwrap();
        validate(&zip_path, ArchiveFormat::Zip).unwrap();
    }

    #[test]
    fn unpack_tarball_and_locate_single_root() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("core.tar.gz");
        fs::write(
            &archive,
            tarball(&[
                ("ArduinoCore-avr-1.8.6/platform.txt", b"version=1.8.6"),
                ("ArduinoCore-avr-1.8.6/cores/arduino/Arduino.h", b"// core"),
            ]),
        )
        .unwrap();

        let dest = dir.path().join("unpacked");
        fs::create_dir(&dest).unwrap();
        unpack(&archive, ArchiveFormat::TarGz, &dest).unwrap();

        let root = locate_root(&dest).unwrap();
        assert!(root.ends_with("ArduinoCore-avr-1.8.6"));
        assert!(root.join("cores/arduino/Arduino.h").exists());
    }

    #[test]
    fn unpack_zip_without_single_root() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("tool.zip");
        fs::write(
            &archive,
            zipball(&[("bin/avr-gcc", b"#!"), ("bin/avr-size", b"#!")]),
        )
        .unwrap();

        let dest = dir.path().join("unpacked");
        fs::create_dir(&dest).unwrap();
        unpack(&archive, ArchiveFormat::Zip, &dest).unwrap();

        // Two top-level entries: the extraction dir itself is the root
        let root = locate_root(&dest).unwrap();
        assert_eq!(root, dest);
        assert!(root.join("bin/avr-gcc").exists());
    }

    #[test]
    fn unpack_corrupt_tarball_fails_validation() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bad.tar.gz");
        // Valid gzip magic, garbage afterwards
        fs::write(&archive, [0x1f, 0x8b, 0xff, 0x00, 0x12, 0x34]).unwrap();

        let dest = dir.path().join("unpacked");
        fs::create_dir(&dest).unwrap();
        let err = unpack(&archive, ArchiveFormat::TarGz, &dest).unwrap_err();
        assert!(matches!(err, CorekitError::Validation { .. }));
    }

    #[test]
    fn locate_root_on_empty_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = locate_root(dir.path()).unwrap_err();
        assert!(matches!(err, CorekitError::Validation { .. }));
    }
}
