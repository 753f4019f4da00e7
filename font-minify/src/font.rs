//! Loading and saving font files.

use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use read_fonts::{FontRef, ReadError};
use skera::SubsetError;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{
    glyph::FontInventory,
    woff::{self, WoffError, WoffExtras},
};

/// The container a font file is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontContainer {
    /// A bare OpenType/TrueType font.
    Sfnt,
    Woff,
    Woff2,
}

impl FontContainer {
    /// Determine the container from the leading bytes of a file.
    ///
    /// Anything that is not WOFF is assumed to be an sfnt; parsing will tell.
    pub fn sniff(data: &[u8]) -> FontContainer {
        if woff::is_woff(data) {
            FontContainer::Woff
        } else if woff::is_woff2(data) {
            FontContainer::Woff2
        } else {
            FontContainer::Sfnt
        }
    }
}

impl fmt::Display for FontContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontContainer::Sfnt => "sfnt",
            FontContainer::Woff => "WOFF",
            FontContainer::Woff2 => "WOFF2",
        })
    }
}

/// A failure affecting a single font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to access '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed WOFF: {0}")]
    Woff(#[from] WoffError),

    #[error("malformed font: {0}")]
    Read(#[from] ReadError),

    #[error("subsetting failed: {0}")]
    Subset(#[from] SubsetError),
}

impl FontError {
    fn io(path: &Path, source: io::Error) -> Self {
        FontError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// A font loaded from disk, held as sfnt data.
#[derive(Clone, Debug)]
pub struct FontFile {
    path: PathBuf,
    container: FontContainer,
    sfnt: Vec<u8>,
    extras: WoffExtras,
    file_size: usize,
}

impl FontFile {
    /// Read a font file, unwrapping it to sfnt data if necessary.
    pub fn load(path: impl Into<PathBuf>) -> Result<FontFile, FontError> {
        let path = path.into();
        let data = fs::read(&path).map_err(|e| FontError::io(&path, e))?;
        FontFile::from_bytes(path, data)
    }

    /// Build a font from file contents already in memory.
    ///
    /// `path` is only used when saving.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<FontFile, FontError> {
        let file_size = data.len();
        let container = FontContainer::sniff(&data);
        let (sfnt, extras) = match container {
            FontContainer::Sfnt => (data, WoffExtras::default()),
            FontContainer::Woff => {
                let decoded = woff::decode(&data)?;
                (decoded.sfnt, decoded.extras)
            }
            FontContainer::Woff2 => (woff::decode_woff2(&data)?, WoffExtras::default()),
        };
        FontRef::new(&sfnt)?;
        Ok(FontFile {
            path: path.into(),
            container,
            sfnt,
            extras,
            file_size,
        })
    }

    pub fn container(&self) -> FontContainer {
        self.container
    }

    /// The container [`FontFile::to_bytes`] produces.
    ///
    /// WOFF2 fonts are written back as WOFF.
    pub fn output_container(&self) -> FontContainer {
        match self.container {
            FontContainer::Woff2 => FontContainer::Woff,
            container => container,
        }
    }

    /// The size of the file this font was loaded from.
    pub fn file_size(&self) -> usize {
        self.file_size
    }

    pub fn font_ref(&self) -> Result<FontRef<'_>, ReadError> {
        FontRef::new(&self.sfnt)
    }

    /// The glyphs this font maps from code points.
    pub fn inventory(&self) -> Result<FontInventory, FontError> {
        Ok(FontInventory::new(&self.font_ref()?))
    }

    /// Replace the font's tables, keeping its path and container.
    pub fn with_sfnt(self, sfnt: Vec<u8>) -> Result<FontFile, FontError> {
        FontRef::new(&sfnt)?;
        Ok(FontFile { sfnt, ..self })
    }

    /// The bytes of this font in its output container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FontError> {
        match self.output_container() {
            FontContainer::Sfnt => Ok(self.sfnt.clone()),
            _ => Ok(woff::encode(&self.sfnt, &self.extras)?),
        }
    }

    /// Write the font back to the path it was loaded from.
    pub fn save(&self) -> Result<usize, FontError> {
        self.save_to(&self.path)
    }

    /// Write the font to `path`, returning the number of bytes written.
    ///
    /// The data goes to a temporary file next to `path` which is then renamed
    /// over it, so `path` is never left partially written. An existing file
    /// keeps its permissions.
    pub fn save_to(&self, path: &Path) -> Result<usize, FontError> {
        let data = self.to_bytes()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| FontError::io(dir, e))?;
        temp.write_all(&data)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| FontError::io(temp.path(), e))?;
        if let Ok(existing) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| FontError::io(temp.path(), e))?;
        }
        temp.persist(path)
            .map_err(|e| FontError::io(path, e.error))?;
        Ok(data.len())
    }
}
