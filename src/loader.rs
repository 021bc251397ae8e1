// Base image loading: decode a file into RGBA pixels, optionally on a worker thread.
// The event loop polls for completions; an older load finishing after a newer one is dropped.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use image::RgbaImage;

use crate::error::Error;
use crate::raster::Raster;

/// Decoded pixel dimensions and straight-alpha RGBA8 content.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>, // length = 4 * width * height
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DecodedImage({}x{})", self.width, self.height)
    }
}

impl From<RgbaImage> for DecodedImage {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, pixels: img.into_raw() }
    }
}

/// Resolve a reference (plain path or `file://` URL) to a path on disk.
fn resolve(reference: &str) -> Result<&Path, Error> {
    let trimmed = reference.trim();
    if let Some(rest) = trimmed.strip_prefix("file://") {
        return Ok(Path::new(rest));
    }
    if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(Error::ImageLoad(format!("unsupported scheme {scheme:?} in {reference:?}")));
    }
    if trimmed.is_empty() {
        return Err(Error::ImageLoad("empty image reference".into()));
    }
    Ok(Path::new(trimmed))
}

/// Decode synchronously on the calling thread.
pub fn decode_image(reference: &str) -> Result<DecodedImage, Error> {
    let path = resolve(reference)?;
    let img = image::open(path)
        .map_err(|e| Error::ImageLoad(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let decoded = DecodedImage::from(img);
    if decoded.width == 0 || decoded.height == 0 {
        return Err(Error::ImageLoad(format!("{}: image has zero area", path.display())));
    }
    log::info!("decoded {} ({}x{})", path.display(), decoded.width, decoded.height);
    Ok(decoded)
}

/// Copy a raster into an `image` buffer, e.g. to save the mask as PNG.
pub fn to_rgba_image(raster: &Raster) -> Option<RgbaImage> {
    RgbaImage::from_raw(raster.width(), raster.height(), raster.read_all().to_vec())
}

/// The deferred result of one `ImageLoader::request`.
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub reference: String,
    pub result: Result<DecodedImage, Error>,
}

/// Runs decodes off the event thread. There is no cancellation: every request
/// finishes, and `poll` drops completions older than one already delivered.
pub struct ImageLoader {
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
    issued: u64,
    delivered: u64,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, issued: 0, delivered: 0 }
    }

    /// Start decoding `reference` in the background. Returns its generation.
    pub fn request(&mut self, reference: impl Into<String>) -> u64 {
        self.issued += 1;
        let generation = self.issued;
        let reference = reference.into();
        let tx = self.tx.clone();
        log::debug!("load #{generation} requested: {reference}");

        let worker_ref = reference.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("image-decode-{generation}"))
            .spawn(move || {
                let result = decode_image(&worker_ref);
                // The receiver is gone only when the painter was dropped.
                let _ = tx.send(LoadCompletion { generation, reference: worker_ref, result });
            });

        if let Err(e) = spawned {
            let _ = self.tx.send(LoadCompletion {
                generation,
                reference,
                result: Err(Error::ImageLoad(format!("spawn decode worker: {e}"))),
            });
        }
        generation
    }

    /// True while some requested load has not been delivered or superseded.
    pub fn pending(&self) -> bool {
        self.delivered < self.issued
    }

    // Deliver in order of arrival, skipping anything older than what was already delivered.
    fn accept(&mut self, c: LoadCompletion) -> Option<LoadCompletion> {
        if c.generation < self.delivered {
            log::warn!(
                "dropping stale load #{} ({}); #{} already delivered",
                c.generation,
                c.reference,
                self.delivered
            );
            return None;
        }
        self.delivered = c.generation;
        Some(c)
    }

    /// Non-blocking: everything that finished since the last call, stale ones removed.
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        let mut out = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            if let Some(c) = self.accept(c) {
                out.push(c);
            }
        }
        out
    }

    /// Block up to `timeout` for the next non-stale completion.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(c) => {
                    if let Some(c) = self.accept(c) {
                        return Some(c);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_png(dir: &tempfile::TempDir, name: &str, w: u32, h: u32, px: [u8; 4]) -> String {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(w, h, Rgba(px)).save(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 3, 2, [10, 20, 30, 255]);
        let img = decode_image(&path).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixels.len(), 24);
        assert_eq!(&img.pixels[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn file_url_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "b.png", 1, 1, [0, 0, 0, 255]);
        assert!(decode_image(&format!("file://{path}")).is_ok());
    }

    #[test]
    fn failures_are_load_errors() {
        assert!(matches!(decode_image(""), Err(Error::ImageLoad(_))));
        assert!(matches!(decode_image("https://example.com/x.png"), Err(Error::ImageLoad(_))));
        assert!(matches!(decode_image("/definitely/not/here.png"), Err(Error::ImageLoad(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(decode_image(&path.to_string_lossy()), Err(Error::ImageLoad(_))));
    }

    #[test]
    fn background_load_delivers_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "c.png", 4, 5, [1, 2, 3, 255]);
        let mut loader = ImageLoader::new();
        let generation = loader.request(path);
        assert!(loader.pending());
        let done = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(done.generation, generation);
        let img = done.result.unwrap();
        assert_eq!((img.width, img.height), (4, 5));
        assert!(!loader.pending());
    }

    #[test]
    fn older_completion_after_newer_is_dropped() {
        let mut loader = ImageLoader::new();
        let ok = |generation| LoadCompletion {
            generation,
            reference: format!("img{generation}"),
            result: Ok(DecodedImage { width: 1, height: 1, pixels: vec![0; 4] }),
        };
        loader.issued = 2;
        loader.tx.send(ok(2)).unwrap();
        loader.tx.send(ok(1)).unwrap();
        let got = loader.poll();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].generation, 2);
    }

    #[test]
    fn raster_exports_to_image() {
        let r = Raster::filled(2, 3, [5, 6, 7, 8]);
        let img = to_rgba_image(&r).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
        assert_eq!(img.get_pixel(1, 2), &Rgba([5, 6, 7, 8]));
    }
}
