use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::{Color, SpriteKey};

/// Manifest format version understood by [`ResourceCache`].
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Errors raised while reading a sprite manifest.
///
/// Failing to load an individual sprite is not an error; that sprite falls
/// back to its placeholder color instead.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read sprite manifest at {path}")]
    Io {
        /// Location of the unreadable manifest.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML.
    #[error("failed to parse sprite manifest toml contents")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a version this build cannot read.
    #[error(
        "unsupported sprite manifest version {found}; expected {}",
        SUPPORTED_MANIFEST_VERSION
    )]
    UnsupportedVersion {
        /// Version found in the manifest.
        found: u32,
    },
    /// The manifest names a sprite this build does not know.
    #[error("unknown sprite key `{0}` in manifest")]
    UnknownKey(String),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    sprites: BTreeMap<String, String>,
}

/// Outcome of resolving a sprite key.
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, T> {
    /// The sprite was loaded.
    Loaded(&'a T),
    /// The sprite is missing; draw a solid rectangle of this color instead.
    Placeholder(Color),
}

/// Cache of loaded sprite handles with a placeholder fallback for misses.
#[derive(Debug)]
pub struct ResourceCache<T> {
    handles: BTreeMap<SpriteKey, T>,
    warned: RefCell<BTreeSet<SpriteKey>>,
}

impl<T> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> ResourceCache<T> {
    /// Cache with nothing loaded; every lookup yields a placeholder.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handles: BTreeMap::new(),
            warned: RefCell::new(BTreeSet::new()),
        }
    }

    /// Loads every sprite listed in the manifest at `path`.
    ///
    /// Sprite paths are resolved relative to the manifest's directory.
    pub fn from_manifest_path(
        path: impl AsRef<Path>,
        loader: impl FnMut(SpriteKey, &Path) -> anyhow::Result<T>,
    ) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_manifest_str(&contents, &base, loader)
    }

    /// Loads every sprite listed in manifest text using the injected loader.
    pub fn from_manifest_str(
        contents: &str,
        base: &Path,
        mut loader: impl FnMut(SpriteKey, &Path) -> anyhow::Result<T>,
    ) -> Result<Self, ManifestError> {
        let mut cache = Self::empty();
        for (key, path) in parse_manifest(contents, base)? {
            match loader(key, &path) {
                Ok(handle) => {
                    let _ = cache.handles.insert(key, handle);
                }
                Err(error) => {
                    warn!(
                        "failed to load sprite `{}` from {}: {error:#}; using placeholder",
                        key.name(),
                        path.display()
                    );
                    let _ = cache.warned.get_mut().insert(key);
                }
            }
        }
        Ok(cache)
    }

    /// Resolves a sprite, warning once per key the first time it is missing.
    pub fn lookup(&self, key: SpriteKey) -> Resolved<'_, T> {
        if let Some(handle) = self.handles.get(&key) {
            return Resolved::Loaded(handle);
        }
        if self.warned.borrow_mut().insert(key) {
            warn!("sprite `{}` is not loaded; using placeholder", key.name());
        }
        Resolved::Placeholder(key.placeholder())
    }

    /// Reports whether the sprite was loaded.
    #[must_use]
    pub fn contains(&self, key: SpriteKey) -> bool {
        self.handles.contains_key(&key)
    }

    /// Number of loaded sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Reports whether no sprite was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn parse_manifest(
    contents: &str,
    base: &Path,
) -> Result<Vec<(SpriteKey, PathBuf)>, ManifestError> {
    let manifest: Manifest = toml::from_str(contents)?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(ManifestError::UnsupportedVersion {
            found: manifest.version,
        });
    }

    let mut resolved = BTreeMap::new();
    for (name, relative) in manifest.sprites {
        let key = SpriteKey::from_name(&name).ok_or(ManifestError::UnknownKey(name))?;
        let _ = resolved.insert(key, base.join(relative));
    }
    Ok(resolved.into_iter().collect())
}
