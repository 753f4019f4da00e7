//! Enumerate the text assets of a project.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// The kinds of assets that may reference fonts or render text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    Markup,
    Stylesheet,
    Script,
    Template,
    Data,
}

impl AssetKind {
    /// Map a file extension (without the dot, any case) to an asset kind.
    pub fn from_extension(ext: &str) -> Option<AssetKind> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(AssetKind::Markup),
            "css" => Some(AssetKind::Stylesheet),
            "js" | "mjs" | "cjs" => Some(AssetKind::Script),
            "vue" => Some(AssetKind::Template),
            "json" => Some(AssetKind::Data),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<AssetKind> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(AssetKind::from_extension)
    }
}

/// A text asset read from the project.
#[derive(Clone, Debug)]
pub struct AssetFile {
    /// The path on disk.
    pub path: PathBuf,
    /// The path relative to the project root, `/` separated.
    pub relative: String,
    pub kind: AssetKind,
    pub content: String,
}

/// A failure to read one asset, or to list one directory.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("'{}' is not valid UTF-8", path.display())]
    NotText { path: PathBuf },
}

impl AssetError {
    pub fn path(&self) -> &Path {
        match self {
            AssetError::Io { path, .. } | AssetError::NotText { path } => path,
        }
    }
}

/// A lazy, depth first walk over the assets below a root directory.
///
/// The order in which entries are produced is whatever the file system
/// returns and should not be relied upon.
pub struct AssetWalker {
    root: PathBuf,
    pending_dirs: Vec<PathBuf>,
    /// The directory being listed.
    current: Option<(PathBuf, fs::ReadDir)>,
}

impl AssetWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        AssetWalker {
            pending_dirs: vec![root.clone()],
            root,
            current: None,
        }
    }

    fn read_asset(&self, path: PathBuf, kind: AssetKind) -> Result<AssetFile, AssetError> {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(AssetError::Io { path, source }),
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => return Err(AssetError::NotText { path }),
        };
        let relative = relative_path(&self.root, &path);
        Ok(AssetFile {
            path,
            relative,
            kind,
            content,
        })
    }
}

impl Iterator for AssetWalker {
    type Item = Result<AssetFile, AssetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((dir, entries)) = self.current.as_mut() else {
                let dir = self.pending_dirs.pop()?;
                match fs::read_dir(&dir) {
                    Ok(entries) => self.current = Some((dir, entries)),
                    Err(source) => return Some(Err(AssetError::Io { path: dir, source })),
                }
                continue;
            };

            let Some(entry) = entries.next() else {
                self.current = None;
                continue;
            };
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = dir.clone();
                    return Some(Err(AssetError::Io { path, source }));
                }
            };
            let path = entry.path();
            // symlinked directories are not followed
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => return Some(Err(AssetError::Io { path, source })),
            };
            if file_type.is_dir() {
                self.pending_dirs.push(path);
            } else if let Some(kind) = AssetKind::from_path(&path) {
                return Some(self.read_asset(path, kind));
            }
        }
    }
}

/// `path` relative to `root`, with `/` separators.
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
