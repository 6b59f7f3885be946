//! Downloads selected images and stores them as WebP.
//!
//! Files are keyed by `{slug}-{index}-{hash8(url)}.webp`; a key that already
//! exists on disk is reused without fetching again.

use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use sha2::{Digest, Sha256};

use crate::error::WriterError;
use crate::state::{ImageRef, LocalImage};

/// Maximum accepted download size (10MB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Images wider than this are scaled down before encoding.
pub const MAX_IMAGE_WIDTH: u32 = 1200;

/// Lossy WebP quality, 0 to 100.
pub const WEBP_QUALITY: f32 = 85.0;

/// Fetches raw image bytes.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, WriterError>> + Send;
}

/// [`ImageFetcher`] over plain HTTP GET.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, WriterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WriterError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/webp,image/*,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WriterError::ImageFetch {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_IMAGE_BYTES as u64)
        {
            return Err(WriterError::ImageFetch {
                url: url.to_string(),
                reason: format!("content length exceeds {MAX_IMAGE_BYTES} bytes"),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(WriterError::ImageFetch {
                url: url.to_string(),
                reason: format!("image too large: {} bytes", bytes.len()),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Decodes `data`, scales it down to `max_width` if wider, and encodes it as
/// lossy WebP at [`WEBP_QUALITY`]. Returns the encoded bytes and the final
/// dimensions.
///
/// # Errors
///
/// Returns [`WriterError::Image`] if the data cannot be decoded, or
/// [`WriterError::WebpEncode`] if the encoder rejects it.
pub fn convert_to_webp(data: &[u8], max_width: u32) -> Result<(Vec<u8>, u32, u32), WriterError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let img = if img.width() > max_width {
        img.resize(max_width, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    // the encoder only accepts 8-bit RGB or RGBA
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let encoded = webp::Encoder::from_image(&img)
        .map_err(|e| WriterError::WebpEncode(e.to_string()))?
        .encode(WEBP_QUALITY);
    Ok((encoded.to_vec(), img.width(), img.height()))
}

/// On-disk image directory plus the URL prefix it is served under.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
    max_width: u32,
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_width: MAX_IMAGE_WIDTH,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{slug}-{index}-{first 8 hex chars of sha256(url)}.webp`
    #[must_use]
    pub fn file_name(slug: &str, index: usize, url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        let hex: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
        format!("{slug}-{index}-{hex}.webp")
    }

    fn local_image(&self, file_name: &str, alt: &str, width: u32, height: u32) -> LocalImage {
        LocalImage {
            path: format!("{}/{file_name}", self.url_prefix),
            alt: alt.to_string(),
            width,
            height,
        }
    }

    /// Stores one image, reusing an existing file with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError`] if the fetch, conversion or write fails.
    pub async fn store<F: ImageFetcher>(
        &self,
        fetcher: &F,
        slug: &str,
        index: usize,
        image: &ImageRef,
        alt: &str,
    ) -> Result<LocalImage, WriterError> {
        let file_name = Self::file_name(slug, index, &image.url);
        let path = self.dir.join(&file_name);

        if path.is_file() {
            match image::image_dimensions(&path) {
                Ok((width, height)) => {
                    tracing::debug!(path = %path.display(), "reusing stored image");
                    return Ok(self.local_image(&file_name, alt, width, height));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "stored image unreadable, fetching again");
                }
            }
        }

        let data = fetcher.fetch(&image.url).await?;
        let (webp, width, height) = convert_to_webp(&data, self.max_width)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, webp).await?;
        tracing::info!(url = %image.url, path = %path.display(), width, height, "stored image");

        Ok(self.local_image(&file_name, alt, width, height))
    }

    /// Stores every image in order (1-based index), skipping failures.
    pub async fn store_all<F: ImageFetcher>(
        &self,
        fetcher: &F,
        product_name: &str,
        slug: &str,
        images: &[ImageRef],
    ) -> Vec<LocalImage> {
        let mut stored = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let index = i + 1;
            let alt = format!("{product_name} 이미지 {index}");
            match self.store(fetcher, slug, index, image, &alt).await {
                Ok(local) => stored.push(local),
                Err(e) => {
                    tracing::warn!(url = %image.url, error = %e, "image download failed, skipping");
                }
            }
        }
        stored
    }
}

#[cfg(test)]
#[path = "image_store_test.rs"]
mod tests;
