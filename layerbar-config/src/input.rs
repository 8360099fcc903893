pub const DEFAULT_XCURSOR_THEME: &str = "default";
pub const DEFAULT_XCURSOR_SIZE: u8 = 24;
pub const DEFAULT_TAP_TIMEOUT_MS: u32 = 500;
pub const DEFAULT_GESTURE_STEP_PERCENT: i32 = 20;

#[derive(knuffel::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    #[knuffel(child, unwrap(argument), default = String::from(DEFAULT_XCURSOR_THEME))]
    pub xcursor_theme: String,
    #[knuffel(child, unwrap(argument), default = DEFAULT_XCURSOR_SIZE)]
    pub xcursor_size: u8,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            xcursor_theme: String::from(DEFAULT_XCURSOR_THEME),
            xcursor_size: DEFAULT_XCURSOR_SIZE,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    /// A contact lifted sooner than this after going down counts as a tap.
    #[knuffel(child, unwrap(argument), default = DEFAULT_TAP_TIMEOUT_MS)]
    pub tap_timeout_ms: u32,
    /// Horizontal travel, in percent of the output width, per gesture step.
    #[knuffel(child, unwrap(argument), default = DEFAULT_GESTURE_STEP_PERCENT)]
    pub gesture_step_percent: i32,
}

impl Default for Touch {
    fn default() -> Self {
        Self {
            tap_timeout_ms: DEFAULT_TAP_TIMEOUT_MS,
            gesture_step_percent: DEFAULT_GESTURE_STEP_PERCENT,
        }
    }
}
