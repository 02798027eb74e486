use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::session::ExportArtifact;

/// Write an export payload into `dir` under its artifact name.
///
/// The bytes go to a temp file in the same directory which is then renamed into place, so
/// a half-written export never shows up under the final name. The temp handle is released
/// once the rename is done. An existing file with the same name is replaced.
pub fn save_artifact(dir: &Path, artifact: &ExportArtifact) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let dest = dir.join(&artifact.file_name);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&artifact.payload)?;
    tmp.flush()?;
    tmp.persist(&dest).map_err(|e| e.error)?;

    log::info!(
        "Saved {} export ({} bytes) to {}",
        artifact.format,
        artifact.payload.len(),
        dest.display()
    );
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportFormat;
    use bytes::Bytes;

    fn artifact(body: &'static [u8]) -> ExportArtifact {
        ExportArtifact {
            file_name: ExportFormat::Txt.artifact_name("abc123"),
            format: ExportFormat::Txt,
            payload: Bytes::from_static(body),
        }
    }

    #[test]
    fn writes_under_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_artifact(dir.path(), &artifact(b"Hello world")).unwrap();

        assert_eq!(path, dir.path().join("voxaccess_abc123.txt"));
        assert_eq!(fs::read(&path).unwrap(), b"Hello world");
        // only the final file remains
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn creates_missing_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports");
        save_artifact(&nested, &artifact(b"first")).unwrap();
        let path = save_artifact(&nested, &artifact(b"second")).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");
    }
}
