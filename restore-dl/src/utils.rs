//! Filesystem helpers shared by the resolvers and the corpus tools.

use crate::common::*;

/// Recursively list regular files under `root` as paths relative to it.
pub fn list_files(root: impl AsRef<Path>) -> Result<BTreeSet<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::config(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }

    let root_str = root.to_str().ok_or_else(|| {
        Error::config(format!("'{}' is not a UTF-8 path", root.display()))
    })?;
    let pattern = format!("{}/**/*", glob::Pattern::escape(root_str));
    let entries = glob::glob(&pattern).map_err(|err| Error::config(err.to_string()))?;

    let mut files = BTreeSet::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            let path = err.path().to_owned();
            Error::io(path, err.into())
        })?;
        if !path.is_file() {
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .map_err(|_| {
                Error::config(format!(
                    "'{}' is not under '{}'",
                    path.display(),
                    root.display()
                ))
            })?
            .to_owned();
        files.insert(relative);
    }

    Ok(files)
}

/// Convert a path into a storage key.
pub fn path_to_key(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::config(format!("'{}' is not a UTF-8 path", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("b.png"), b"").unwrap();
        fs::write(dir.path().join("nested/a.png"), b"").unwrap();
        fs::write(dir.path().join("nested/deeper/c.png"), b"").unwrap();

        let files: Vec<_> = list_files(dir.path()).unwrap().into_iter().collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("b.png"),
                PathBuf::from("nested/a.png"),
                PathBuf::from("nested/deeper/c.png"),
            ]
        );
    }

    #[test]
    fn list_files_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_files(dir.path().join("missing")),
            Err(Error::Config(_))
        ));
    }
}
