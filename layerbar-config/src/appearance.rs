use std::str::FromStr;

use miette::{miette, IntoDiagnostic};

pub const DEFAULT_REGULAR_HEIGHT: u32 = 40;
pub const DEFAULT_EXTENDED_HEIGHT: u32 = 1080;

pub const DEFAULT_REGULAR_COLOR: Color = Color::new_unpremul(0.5, 0.5, 0.5, 1.);
pub const DEFAULT_EXTENDED_COLOR: Color = Color::new_unpremul(0.2, 0.2, 0.2, 1.);

/// RGB color in [0, 1] with unpremultiplied alpha.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new_unpremul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8_unpremul(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_array_unpremul([r, g, b, a].map(|x| x as f32 / 255.))
    }

    pub fn from_array_unpremul([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array_unpremul(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the color with its alpha multiplied by `alpha`.
    pub fn with_opacity(self, alpha: f32) -> Self {
        Self {
            a: (self.a * alpha).clamp(0., 1.),
            ..self
        }
    }
}

impl FromStr for Color {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = csscolorparser::parse(s).into_diagnostic()?.to_array();
        Ok(Self::from_array_unpremul(color))
    }
}

/// Layer-shell layer the bar surface is placed on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Bottom,
    #[default]
    Top,
    Overlay,
}

impl FromStr for Layer {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "background" => Ok(Self::Background),
            "bottom" => Ok(Self::Bottom),
            "top" => Ok(Self::Top),
            "overlay" => Ok(Self::Overlay),
            _ => Err(miette!(
                r#"invalid layer, can be "background", "bottom", "top" or "overlay""#
            )),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Height {
    #[knuffel(property, default = DEFAULT_REGULAR_HEIGHT)]
    pub regular: u32,
    #[knuffel(property, default = DEFAULT_EXTENDED_HEIGHT)]
    pub extended: u32,
}

impl Default for Height {
    fn default() -> Self {
        Self {
            regular: DEFAULT_REGULAR_HEIGHT,
            extended: DEFAULT_EXTENDED_HEIGHT,
        }
    }
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Margin {
    #[knuffel(property, default)]
    pub top: i32,
    #[knuffel(property, default)]
    pub right: i32,
    #[knuffel(property, default)]
    pub bottom: i32,
    #[knuffel(property, default)]
    pub left: i32,
}
