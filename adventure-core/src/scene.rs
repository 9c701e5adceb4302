//! Scene images produced by the image phase of a turn.

use std::path::{Path, PathBuf};

use crate::state::ImageSize;

/// Image data for a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneImage {
    /// Bytes returned by the image model.
    Generated { mime_type: String, bytes: Vec<u8> },
    /// Stand-in used when image generation fails.
    Placeholder { url: String },
}

impl SceneImage {
    /// A random placeholder picture so a failed image never stalls the game.
    pub fn placeholder() -> Self {
        let seed: u64 = rand::random();
        SceneImage::Placeholder {
            url: format!("https://picsum.photos/seed/{seed}/800/600"),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, SceneImage::Placeholder { .. })
    }

    /// File extension for the image's MIME type.
    pub fn extension(&self) -> &'static str {
        match self {
            SceneImage::Generated { mime_type, .. } => match mime_type.as_str() {
                "image/jpeg" | "image/jpg" => "jpg",
                "image/webp" => "webp",
                "image/gif" => "gif",
                _ => "png",
            },
            SceneImage::Placeholder { .. } => "url",
        }
    }

    /// Write a generated image to `dir/<stem>.<ext>`.
    ///
    /// Returns `Ok(None)` for placeholders, which have nothing to write.
    pub async fn save(&self, dir: &Path, stem: &str) -> std::io::Result<Option<PathBuf>> {
        let SceneImage::Generated { bytes, .. } = self else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{stem}.{}", self.extension()));
        tokio::fs::write(&path, bytes).await?;
        Ok(Some(path))
    }
}

/// The scene currently on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub image: SceneImage,
    /// Scene description from the story model (without the style prefix).
    pub prompt: String,
    pub size: ImageSize,
    /// Where the image was written, if an image directory is configured.
    pub saved_to: Option<PathBuf>,
}

impl Scene {
    /// Short human-readable location of the image.
    pub fn location(&self) -> String {
        match (&self.saved_to, &self.image) {
            (Some(path), _) => path.display().to_string(),
            (None, SceneImage::Placeholder { url }) => url.clone(),
            (None, SceneImage::Generated { mime_type, bytes }) => {
                format!("{mime_type}, {} bytes (not saved)", bytes.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_url_shape() {
        let SceneImage::Placeholder { url } = SceneImage::placeholder() else {
            panic!("expected placeholder");
        };
        assert!(url.starts_with("https://picsum.photos/seed/"));
        assert!(url.ends_with("/800/600"));
    }

    #[test]
    fn test_extension_from_mime() {
        let jpeg = SceneImage::Generated {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![],
        };
        assert_eq!(jpeg.extension(), "jpg");

        let unknown = SceneImage::Generated {
            mime_type: "application/octet-stream".to_string(),
            bytes: vec![],
        };
        assert_eq!(unknown.extension(), "png");
    }

    #[tokio::test]
    async fn test_save_generated_image() {
        let dir = tempfile::tempdir().unwrap();
        let image = SceneImage::Generated {
            mime_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };

        let path = image.save(dir.path(), "scene-001").await.unwrap().unwrap();
        assert_eq!(path, dir.path().join("scene-001.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_save_placeholder_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let saved = SceneImage::placeholder()
            .save(dir.path(), "scene-001")
            .await
            .unwrap();
        assert!(saved.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_location_prefers_saved_path() {
        let scene = Scene {
            image: SceneImage::Generated {
                mime_type: "image/png".to_string(),
                bytes: vec![0; 4],
            },
            prompt: "A forest".to_string(),
            size: ImageSize::OneK,
            saved_to: None,
        };
        assert_eq!(scene.location(), "image/png, 4 bytes (not saved)");

        let saved = Scene {
            saved_to: Some(PathBuf::from("scenes/scene-002.png")),
            ..scene
        };
        assert_eq!(saved.location(), "scenes/scene-002.png");
    }
}
