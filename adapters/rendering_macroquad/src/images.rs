use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use driftlands_core::{ImageHandle, ImageKey, ImageSet};
use macroquad::texture::Texture2D;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Texture decoded by a loader together with its pixel size.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LoadedImage {
    pub(crate) texture: Texture2D,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Textures loaded from the image manifest, addressed by [`ImageHandle`].
#[derive(Debug, Default)]
pub struct ImageLibrary {
    textures: Vec<Texture2D>,
    images: ImageSet,
}

impl ImageLibrary {
    /// Loads images from the manifest located at the provided path.
    ///
    /// A missing manifest yields an empty library; a malformed one is an error.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                manifest = %path.display(),
                "image manifest not found, drawing flat colours"
            );
            return Ok(Self::default());
        }
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Handles of every image that loaded.
    #[must_use]
    pub fn images(&self) -> ImageSet {
        self.images
    }

    /// Number of textures held by the library.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Reports whether no texture loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Retrieves the texture behind a handle.
    #[must_use]
    pub fn texture(&self, handle: ImageHandle) -> Option<Texture2D> {
        let index = usize::try_from(handle.id()).ok()?;
        self.textures.get(index).copied()
    }

    /// Frees every GPU texture held by the library.
    pub fn release(self) {
        for texture in &self.textures {
            texture.delete();
        }
        tracing::debug!(released = self.textures.len(), "images released");
    }

    pub(crate) fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(ImageKey, &Path) -> Result<LoadedImage>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read image manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Ok(Self::from_entries(entries, &mut loader))
    }

    fn from_entries(
        entries: Vec<(ImageKey, PathBuf)>,
        loader: &mut impl FnMut(ImageKey, &Path) -> Result<LoadedImage>,
    ) -> Self {
        let mut library = Self::default();
        for (key, path) in entries {
            match loader(key, &path) {
                Ok(loaded) => library.insert(key, loaded),
                Err(error) => tracing::warn!(
                    image = ?key,
                    path = %path.display(),
                    error = %format!("{error:#}"),
                    "image failed to load"
                ),
            }
        }
        library
    }

    fn insert(&mut self, key: ImageKey, loaded: LoadedImage) {
        let Ok(id) = u32::try_from(self.textures.len()) else {
            return;
        };
        self.textures.push(loaded.texture);
        self.images
            .set(key, ImageHandle::new(id, loaded.width, loaded.height));
    }
}

fn default_loader(_key: ImageKey, path: &Path) -> Result<LoadedImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read image asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    Ok(LoadedImage {
        texture,
        width: texture.width() as u32,
        height: texture.height() as u32,
    })
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default)]
    images: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(ImageKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse image manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported image manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.images {
        let key = parse_image_key(&name)
            .with_context(|| format!("unknown image key `{name}` in manifest"))?;
        let _ = resolved.insert(key, base_path.join(relative_path));
    }

    Ok(ImageKey::ALL
        .into_iter()
        .filter_map(|key| resolved.remove(&key).map(|path| (key, path)))
        .collect())
}

fn parse_image_key(name: &str) -> Result<ImageKey> {
    match name {
        "Tileset" => Ok(ImageKey::Tileset),
        "Wall" => Ok(ImageKey::Wall),
        "Hazard" => Ok(ImageKey::Hazard),
        "Pickup" => Ok(ImageKey::Pickup),
        "Player" => Ok(ImageKey::Player),
        "Enemy" => Ok(ImageKey::Enemy),
        "ActorSheet" => Ok(ImageKey::ActorSheet),
        _ => bail!("unknown image key `{name}`"),
    }
}
