//! Configuration for layerbar.
//!
//! The config file is KDL, decoded with `knuffel`. Every node is optional; an empty file
//! yields [`Config::default()`].

#[macro_use]
extern crate tracing;

use std::path::Path;

use miette::{Context, IntoDiagnostic};

pub mod appearance;
pub mod input;

pub use crate::appearance::*;
pub use crate::input::{Cursor, Touch};

pub const DEFAULT_NAMESPACE: &str = "wlroots";

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Config {
    /// Namespace the layer surfaces announce to the compositor.
    #[knuffel(child, unwrap(argument), default = String::from(DEFAULT_NAMESPACE))]
    pub namespace: String,
    #[knuffel(child, unwrap(argument, str), default)]
    pub layer: Layer,
    /// Only put a bar on the output with this announcement index.
    #[knuffel(child, unwrap(argument))]
    pub output: Option<usize>,
    #[knuffel(child, default)]
    pub height: Height,
    #[knuffel(child, unwrap(argument, str), default = DEFAULT_REGULAR_COLOR)]
    pub regular_color: Color,
    #[knuffel(child, unwrap(argument, str), default = DEFAULT_EXTENDED_COLOR)]
    pub extended_color: Color,
    #[knuffel(child, unwrap(argument), default = 1.)]
    pub opacity: f64,
    #[knuffel(child, default)]
    pub margin: Margin,
    #[knuffel(child)]
    pub animate: bool,
    #[knuffel(child)]
    pub keyboard_interactive: bool,
    #[knuffel(child, default)]
    pub cursor: Cursor,
    #[knuffel(child, default)]
    pub touch: Touch,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: String::from(DEFAULT_NAMESPACE),
            layer: Layer::default(),
            output: None,
            height: Height::default(),
            regular_color: DEFAULT_REGULAR_COLOR,
            extended_color: DEFAULT_EXTENDED_COLOR,
            opacity: 1.,
            margin: Margin::default(),
            animate: false,
            keyboard_interactive: false,
            cursor: Cursor::default(),
            touch: Touch::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let _span = tracy_client::span!("Config::load");

        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let mut config: Self = knuffel::parse(filename, text)?;
        config.sanitize();
        Ok(config)
    }

    fn sanitize(&mut self) {
        if !(0. ..=1.).contains(&self.opacity) {
            warn!("opacity {} is out of range, clamping to [0, 1]", self.opacity);
            self.opacity = self.opacity.clamp(0., 1.);
        }

        if self.touch.gesture_step_percent <= 0 {
            warn!(
                "gesture-step-percent must be positive, got {}",
                self.touch.gesture_step_percent
            );
            self.touch.gesture_step_percent = input::DEFAULT_GESTURE_STEP_PERCENT;
        }

        if self.height.regular == 0 {
            warn!("regular bar height must be non-zero");
            self.height.regular = DEFAULT_REGULAR_HEIGHT;
        }
    }
}
