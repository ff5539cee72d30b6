use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use starknet::core::types::contract::{CompiledClass, SierraClass};

pub const SIERRA_SUFFIX: &str = ".sierra.json";
pub const CASM_SUFFIX: &str = ".casm.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub sierra: PathBuf,
    pub casm: PathBuf,
}

impl ArtifactPaths {
    /// `out/hello` -> `out/hello.sierra.json`, `out/hello.casm.json`.
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().as_os_str();
        let with_suffix = |suffix: &str| {
            let mut path = base.to_os_string();
            path.push(suffix);
            PathBuf::from(path)
        };
        Self {
            sierra: with_suffix(SIERRA_SUFFIX),
            casm: with_suffix(CASM_SUFFIX),
        }
    }
}

pub struct Artifacts {
    pub sierra: SierraClass,
    pub casm: CompiledClass,
}

/// Both files are read before either is parsed, so a missing file is always
/// reported as such rather than masked by a parse error on the other.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<Artifacts> {
    let sierra = read(&paths.sierra)?;
    let casm = read(&paths.casm)?;

    let sierra = serde_json::from_str(&sierra)
        .with_context(|| format!("invalid sierra artifact {}", paths.sierra.display()))?;
    let casm = serde_json::from_str(&casm)
        .with_context(|| format!("invalid casm artifact {}", paths.casm.display()))?;

    Ok(Artifacts { sierra, casm })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io;

    use tempfile::TempDir;

    use super::*;

    fn io_kind(err: &anyhow::Error) -> Option<io::ErrorKind> {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<io::Error>())
            .map(io::Error::kind)
    }

    #[test]
    fn paths_append_suffixes() {
        let paths = ArtifactPaths::from_base("target/dev/hello");
        assert_eq!(paths.sierra, PathBuf::from("target/dev/hello.sierra.json"));
        assert_eq!(paths.casm, PathBuf::from("target/dev/hello.casm.json"));
    }

    #[test]
    fn paths_keep_dots_in_base() {
        let paths = ArtifactPaths::from_base("out/my.token");
        assert_eq!(paths.sierra, PathBuf::from("out/my.token.sierra.json"));
    }

    #[test]
    fn missing_sierra_is_not_found() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::from_base(dir.path().join("hello"));
        let err = load_artifacts(&paths).err().unwrap();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("hello.sierra.json"));
    }

    #[test]
    fn missing_casm_is_not_found_even_with_bad_sierra() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::from_base(dir.path().join("hello"));
        fs::write(&paths.sierra, "not json").unwrap();
        let err = load_artifacts(&paths).err().unwrap();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("hello.casm.json"));
    }

    #[test]
    fn malformed_artifact_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::from_base(dir.path().join("hello"));
        fs::write(&paths.sierra, "{\"abi\": 3}").unwrap();
        fs::write(&paths.casm, "{}").unwrap();
        let err = load_artifacts(&paths).err().unwrap();
        assert_eq!(io_kind(&err), None);
        assert!(err.to_string().contains("invalid sierra artifact"));
    }
}
