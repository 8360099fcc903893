//! XCursor theme loading.

use std::collections::HashMap;
use std::fs;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use xcursor::parser::{parse_xcursor, Image};
use xcursor::CursorTheme;

/// Icons tried in order when loading the pointer image.
const CURSOR_NAMES: [&str; 2] = ["left_ptr", "default"];

/// A cursor image ready for upload into an ARGB8888 shm buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    pub width: u32,
    pub height: u32,
    pub xhot: u32,
    pub yhot: u32,
    /// Premultiplied ARGB8888 in native byte order.
    pub pixels: Vec<u8>,
}

pub struct CursorManager {
    theme: CursorTheme,
    theme_name: String,
    size: u8,
    /// Loaded images per scale; `None` when loading failed.
    cache: HashMap<i32, Option<Rc<CursorImage>>>,
}

impl CursorManager {
    pub fn new(theme: &str, size: u8) -> Self {
        Self {
            theme: CursorTheme::load(theme),
            theme_name: theme.to_owned(),
            size,
            cache: HashMap::new(),
        }
    }

    /// Returns the pointer image for `scale`, loading it the first time.
    pub fn get(&mut self, scale: i32) -> Option<Rc<CursorImage>> {
        let scale = scale.max(1);
        if let Some(image) = self.cache.get(&scale) {
            return image.clone();
        }

        let size = u32::from(self.size) * scale.unsigned_abs();
        let image = match self.load(size) {
            Ok(image) => Some(Rc::new(image)),
            Err(err) => {
                warn!(
                    "error loading cursor from theme {:?} at size {size}: {err:?}",
                    self.theme_name
                );
                None
            }
        };

        self.cache.insert(scale, image.clone());
        image
    }

    fn load(&self, size: u32) -> anyhow::Result<CursorImage> {
        let _span = tracy_client::span!("CursorManager::load");

        let path = CURSOR_NAMES
            .iter()
            .find_map(|name| self.theme.load_icon(name))
            .ok_or_else(|| anyhow!("no pointer cursor in theme"))?;

        let data = fs::read(&path).with_context(|| format!("error reading {path:?}"))?;
        let images = parse_xcursor(&data).ok_or_else(|| anyhow!("error parsing {path:?}"))?;
        let image = nearest_image(&images, size).ok_or_else(|| anyhow!("{path:?} is empty"))?;

        debug!(
            "loaded cursor {path:?} at {}×{} for size {size}",
            image.width, image.height
        );

        Ok(CursorImage {
            width: image.width,
            height: image.height,
            xhot: image.xhot,
            yhot: image.yhot,
            pixels: rgba_to_argb8888(&image.pixels_rgba),
        })
    }
}

/// Picks the first frame of the image whose nominal size is closest to `size`.
fn nearest_image(images: &[Image], size: u32) -> Option<&Image> {
    images
        .iter()
        .min_by_key(|image| (i64::from(size) - i64::from(image.size)).abs())
}

/// Converts straight RGBA bytes to premultiplied little-endian ARGB8888.
fn rgba_to_argb8888(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let [r, g, b, a] = [px[0], px[1], px[2], px[3]];
            let premul = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
            [premul(b), premul(g), premul(r), a]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: u32) -> Image {
        Image {
            size,
            width: size,
            height: size,
            xhot: 1,
            yhot: 2,
            delay: 0,
            pixels_rgba: vec![0; (size * size * 4) as usize],
            pixels_argb: vec![0; (size * size * 4) as usize],
        }
    }

    #[test]
    fn picks_nearest_size() {
        let images = [image(24), image(32), image(48)];
        assert_eq!(nearest_image(&images, 24).unwrap().size, 24);
        assert_eq!(nearest_image(&images, 30).unwrap().size, 32);
        assert_eq!(nearest_image(&images, 96).unwrap().size, 48);
        assert!(nearest_image(&[], 24).is_none());
    }

    #[test]
    fn converts_to_premultiplied_bgra_bytes() {
        let rgba = [255, 128, 0, 255, 255, 255, 255, 0, 200, 100, 50, 128];
        assert_eq!(
            rgba_to_argb8888(&rgba),
            [0, 128, 255, 255, 0, 0, 0, 0, 25, 50, 100, 128]
        );
    }
}
