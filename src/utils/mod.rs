use std::path::PathBuf;

use directories::ProjectDirs;
use layerbar_config::Color;

/// `$XDG_CONFIG_HOME/layerbar/config.kdl`, if the home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "layerbar")?;
    Some(dirs.config_dir().join("config.kdl"))
}

/// Packs a color into one premultiplied `wl_shm` ARGB8888 pixel.
pub fn argb8888_premultiplied(color: Color) -> u32 {
    let [r, g, b, a] = color.to_array_unpremul().map(|c| c.clamp(0., 1.));
    let channel = |c: f32| (c * a * 255.).round() as u32;
    let alpha = (a * 255.).round() as u32;
    (alpha << 24) | (channel(r) << 16) | (channel(g) << 8) | channel(b)
}
