use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting generated files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents. Returns true if it did not exist before.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}

/// Create an empty file if nothing exists at `path`. Returns true if created.
pub fn touch_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(true)
}

/// Copy every regular file in `src` whose extension is `ext` into `dest`,
/// overwriting files of the same name. Returns the copied destinations,
/// sorted by file name.
pub fn copy_files_with_extension(src: &Path, dest: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(src)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == ext))
        .collect();
    entries.sort();

    let mut copied = Vec::with_capacity(entries.len());
    for path in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        std::fs::copy(&path, &target)?;
        copied.push(target);
    }
    Ok(copied)
}

/// Rewrite every line that starts with `prefix` to `replacement`, keeping
/// all other bytes (including line endings) exactly as they were.
///
/// `replacement` should not carry a line terminator; the original line's
/// terminator is reused. Returns the new text and the number of lines replaced.
pub fn replace_prefixed_lines(content: &str, prefix: &str, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(content.len() + replacement.len());
    let mut replaced = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with(prefix) {
            let body_len = line.trim_end_matches(['\n', '\r']).len();
            out.push_str(replacement);
            out.push_str(&line[body_len..]);
            replaced += 1;
        } else {
            out.push_str(line);
        }
    }
    (out, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/alembic.ini");
        atomic_write(&path, b"[alembic]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[alembic]");
    }

    #[test]
    fn ensure_dir_reports_creation_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models");
        assert!(ensure_dir(&path).unwrap());
        assert!(!ensure_dir(&path).unwrap());
    }

    #[test]
    fn touch_if_missing_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("__init__.py");
        std::fs::write(&path, "x = 1\n").unwrap();
        assert!(!touch_if_missing(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[test]
    fn copy_filters_by_extension_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("project.py"), "new").unwrap();
        std::fs::write(src.join("notes.txt"), "skip").unwrap();
        std::fs::write(dest.join("project.py"), "old").unwrap();

        let copied = copy_files_with_extension(&src, &dest, "py").unwrap();
        assert_eq!(copied, vec![dest.join("project.py")]);
        assert_eq!(std::fs::read_to_string(dest.join("project.py")).unwrap(), "new");
        assert!(!dest.join("notes.txt").exists());
        assert!(!dest.join("nested").exists());
    }

    #[test]
    fn replace_prefixed_lines_preserves_other_bytes() {
        let content = "[alembic]\r\nsqlalchemy.url = sqlite:///x\r\n# sqlalchemy.url = keep\nlast";
        let (out, n) = replace_prefixed_lines(content, "sqlalchemy.url", "sqlalchemy.url = pg://db");
        assert_eq!(n, 1);
        assert_eq!(
            out,
            "[alembic]\r\nsqlalchemy.url = pg://db\r\n# sqlalchemy.url = keep\nlast"
        );
    }

    #[test]
    fn replace_prefixed_lines_without_match_is_identity() {
        let content = "a\nb\n";
        let (out, n) = replace_prefixed_lines(content, "sqlalchemy.url", "x");
        assert_eq!(n, 0);
        assert_eq!(out, content);
    }
}
