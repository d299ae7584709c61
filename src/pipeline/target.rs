//! Output path resolution: where a source file's images go and what they
//! are called.
//!
//! Resolution is a pure function of its inputs (plus the RNG for
//! [`NamingScheme::RandomSuffix`]); the only side effect lives in
//! [`OutputTarget::ensure_dir`], which workers call concurrently.

use crate::config::NamingScheme;
use crate::error::FileError;
use rand::Rng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Hex characters of the blake3 digest used as a content-derived name.
pub const HASH_NAME_LEN: usize = 12;

/// Destination of one source file's images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub base_name: String,
}

impl OutputTarget {
    /// `{dir}/{base}.jpg`, used for single-page documents.
    pub fn single_image_path(&self) -> PathBuf {
        self.dir.join(format!("{}.jpg", self.base_name))
    }

    /// `{dir}/{base}-page{N}.jpg`, `page_num` 1-based.
    pub fn page_image_path(&self, page_num: usize) -> PathBuf {
        self.dir
            .join(format!("{}-page{}.jpg", self.base_name, page_num))
    }

    /// Create the target directory and its parents.
    ///
    /// Safe to race: `create_dir_all` treats a directory that appeared
    /// concurrently as success.
    pub fn ensure_dir(&self) -> Result<(), FileError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| FileError::OutputDir {
            path: self.dir.clone(),
            detail: e.to_string(),
        })
    }
}

/// Compute the output directory and base name for `source`.
///
/// * mirrored (`flatten == false`): `output_root/<relative parent>` or, without
///   an output root, the source's own parent directory.
/// * flattened: `output_root`, or `input_root` itself without one.
///
/// `content` is the file's bytes; only [`NamingScheme::ContentHash`] reads it.
pub fn resolve_target(
    source: &Path,
    input_root: &Path,
    output_root: Option<&Path>,
    flatten: bool,
    naming: NamingScheme,
    content: &[u8],
) -> OutputTarget {
    let dir = match (flatten, output_root) {
        (true, Some(out)) => out.to_path_buf(),
        (true, None) => input_root.to_path_buf(),
        (false, Some(out)) => out.join(relative_parent(source, input_root)),
        (false, None) => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let base_name = base_name(source, naming, content);
    debug!(
        "Resolved {} → {}/{}",
        source.display(),
        dir.display(),
        base_name
    );

    OutputTarget { dir, base_name }
}

/// The source's parent directory relative to `input_root`.
///
/// Collected files always live under the root; anything else maps to the
/// output root itself.
fn relative_parent(source: &Path, input_root: &Path) -> PathBuf {
    source
        .parent()
        .and_then(|parent| parent.strip_prefix(input_root).ok())
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// For each of `sources`, the earlier source that resolves to the same
/// output directory and base name, if any.
///
/// Only [`NamingScheme::Stem`] can produce such pairs, e.g. `report.pdf` and
/// `report.PDF` side by side. The first file of a pair keeps its names.
pub fn find_name_collisions(
    sources: &[PathBuf],
    input_root: &Path,
    output_root: Option<&Path>,
    flatten: bool,
    naming: NamingScheme,
) -> Vec<Option<PathBuf>> {
    if naming != NamingScheme::Stem {
        return vec![None; sources.len()];
    }

    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let target = resolve_target(source, input_root, output_root, flatten, naming, &[]);
            match seen.entry(target.single_image_path()) {
                Entry::Occupied(first) => Some(first.get().to_path_buf()),
                Entry::Vacant(slot) => {
                    slot.insert(source);
                    None
                }
            }
        })
        .collect()
}

fn base_name(source: &Path, naming: NamingScheme, content: &[u8]) -> String {
    match naming {
        NamingScheme::ContentHash => content_hash_name(content),
        NamingScheme::RandomSuffix => {
            let suffix: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
            format!("{}_{}", file_stem(source), suffix)
        }
        NamingScheme::Stem => file_stem(source),
    }
}

/// First [`HASH_NAME_LEN`] hex characters of the blake3 digest of `content`.
pub fn content_hash_name(content: &[u8]) -> String {
    blake3::hash(content).to_hex()[..HASH_NAME_LEN].to_string()
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        source: &str,
        output_root: Option<&str>,
        flatten: bool,
        naming: NamingScheme,
    ) -> OutputTarget {
        resolve_target(
            Path::new(source),
            Path::new("docs"),
            output_root.map(Path::new),
            flatten,
            naming,
            b"%PDF-1.7 sample",
        )
    }

    #[test]
    fn mirrored_with_output_root() {
        let t = resolve("docs/sub/deep/b.pdf", Some("out"), false, NamingScheme::Stem);
        assert_eq!(t.dir, PathBuf::from("out/sub/deep"));
        assert_eq!(t.base_name, "b");

        let t = resolve("docs/a.pdf", Some("out"), false, NamingScheme::Stem);
        assert_eq!(t.dir, PathBuf::from("out"));
    }

    #[test]
    fn mirrored_without_output_root_uses_source_parent() {
        let t = resolve("docs/sub/b.pdf", None, false, NamingScheme::Stem);
        assert_eq!(t.dir, PathBuf::from("docs/sub"));
    }

    #[test]
    fn flattened_ignores_hierarchy() {
        let t = resolve("docs/sub/deep/b.pdf", Some("out"), true, NamingScheme::ContentHash);
        assert_eq!(t.dir, PathBuf::from("out"));

        let t = resolve("docs/sub/deep/b.pdf", None, true, NamingScheme::ContentHash);
        assert_eq!(t.dir, PathBuf::from("docs"));
    }

    #[test]
    fn content_hash_is_deterministic_and_short() {
        let a = content_hash_name(b"one");
        assert_eq!(a.len(), HASH_NAME_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, content_hash_name(b"one"));
        assert_ne!(a, content_hash_name(b"two"));
    }

    #[test]
    fn same_stem_different_content_does_not_collide() {
        let a = resolve_target(
            Path::new("docs/2023/report.pdf"),
            Path::new("docs"),
            Some(Path::new("out")),
            true,
            NamingScheme::ContentHash,
            b"first report",
        );
        let b = resolve_target(
            Path::new("docs/2024/report.pdf"),
            Path::new("docs"),
            Some(Path::new("out")),
            true,
            NamingScheme::ContentHash,
            b"second report",
        );
        assert_eq!(a.dir, b.dir);
        assert_ne!(a.base_name, b.base_name);
    }

    #[test]
    fn random_suffix_keeps_stem() {
        let t = resolve("docs/report.pdf", None, true, NamingScheme::RandomSuffix);
        let (stem, suffix) = t.base_name.rsplit_once('_').unwrap();
        assert_eq!(stem, "report");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn image_paths() {
        let t = OutputTarget {
            dir: PathBuf::from("out/sub"),
            base_name: "b".into(),
        };
        assert_eq!(t.single_image_path(), PathBuf::from("out/sub/b.jpg"));
        assert_eq!(t.page_image_path(3), PathBuf::from("out/sub/b-page3.jpg"));
    }

    #[test]
    fn ensure_dir_is_idempotent_under_contention() {
        let tmp = tempfile::tempdir().unwrap();
        let target = OutputTarget {
            dir: tmp.path().join("a/b/c"),
            base_name: "x".into(),
        };

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| target.ensure_dir().unwrap());
            }
        });
        target.ensure_dir().unwrap();
        assert!(target.dir.is_dir());
    }

    #[test]
    fn ensure_dir_reports_blocked_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let target = OutputTarget {
            dir: blocker.join("sub"),
            base_name: "x".into(),
        };
        assert!(matches!(
            target.ensure_dir(),
            Err(FileError::OutputDir { .. })
        ));
    }

    #[test]
    fn stem_collisions_are_reported_against_the_first_file() {
        let sources = vec![
            PathBuf::from("docs/report.PDF"),
            PathBuf::from("docs/report.pdf"),
            PathBuf::from("docs/sub/report.pdf"),
        ];
        let collisions = find_name_collisions(
            &sources,
            Path::new("docs"),
            Some(Path::new("out")),
            false,
            NamingScheme::Stem,
        );
        assert_eq!(
            collisions,
            vec![None, Some(PathBuf::from("docs/report.PDF")), None]
        );
    }

    #[test]
    fn hash_naming_never_reports_collisions() {
        let sources = vec![PathBuf::from("docs/a.pdf"), PathBuf::from("docs/a.PDF")];
        let collisions = find_name_collisions(
            &sources,
            Path::new("docs"),
            None,
            true,
            NamingScheme::ContentHash,
        );
        assert_eq!(collisions, vec![None, None]);
    }
}
