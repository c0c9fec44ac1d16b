use crate::common::*;
use std::str::FromStr;

/// A file name template with exactly one `{}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameTemplate {
    prefix: String,
    suffix: String,
}

impl FilenameTemplate {
    /// Substitute `stem` into the placeholder.
    pub fn format(&self, stem: &str) -> String {
        format!("{}{}{}", self.prefix, stem, self.suffix)
    }

    /// Map `dir/stem.ext` to `dir/<formatted stem>.ext`.
    pub fn apply_to_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                Error::config(format!("'{}' has no UTF-8 file stem", path.display()))
            })?;

        let mut name = self.format(stem);
        if let Some(ext) = path.extension() {
            let ext = ext.to_str().ok_or_else(|| {
                Error::config(format!("'{}' has a non UTF-8 extension", path.display()))
            })?;
            name.push('.');
            name.push_str(ext);
        }

        Ok(match path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        })
    }
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl FromStr for FilenameTemplate {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut parts = text.split("{}");
        let (prefix, suffix) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(suffix), None) => (prefix, suffix),
            _ => {
                return Err(Error::config(format!(
                    "filename template '{}' must contain exactly one '{{}}'",
                    text
                )))
            }
        };

        Ok(Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
        })
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{}}{}", self.prefix, self.suffix)
    }
}
