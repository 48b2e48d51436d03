//! sRGB colors with a separate 8-bit opacity.

/// RGBA color with 8-bit components, straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Keywords accepted for the canvas background.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::RED),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::BLUE),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("navy", Color::rgb(0, 0, 128)),
    ("teal", Color::rgb(0, 128, 128)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("silver", Color::rgb(192, 192, 192)),
    ("ivory", Color::rgb(255, 255, 240)),
    ("beige", Color::rgb(245, 245, 220)),
];

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `RRGGBB` or `RGB` hex digits, with an optional leading `#`.
    /// Short form doubles each digit.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let value = u32::from_str_radix(digits, 16).ok()?;
        let [r, g, b] = match digits.len() {
            6 => {
                let [_, r, g, b] = value.to_be_bytes();
                [r, g, b]
            }
            3 => {
                let nibble = |shift: u32| ((value >> shift) & 0xf) as u8 * 0x11;
                [nibble(8), nibble(4), nibble(0)]
            }
            _ => return None,
        };
        Some(Self::rgb(r, g, b))
    }

    /// Hex parse with opaque black for anything malformed.
    pub fn from_hex_or_black(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or(Self::BLACK)
    }

    /// Hex digits or one of a small set of color keywords, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_hex(value).or_else(|| {
            NAMED_COLORS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(value.trim()))
                .map(|&(_, color)| color)
        })
    }

    /// Clamp an arbitrary integer opacity into `0..=255`.
    pub fn clamp_alpha(alpha: i64) -> u8 {
        alpha.clamp(0, 255) as u8
    }

    pub fn with_alpha(self, alpha: i64) -> Self {
        Self {
            a: Self::clamp_alpha(alpha),
            ..self
        }
    }

    /// Source-over: `self` painted on top of `dst`, rounded per channel.
    pub fn blend_over(self, dst: Color) -> Color {
        match self.a {
            255 => return self,
            0 => return dst,
            _ => {}
        }

        let src_a = f32::from(self.a) / 255.0;
        let dst_a = f32::from(dst.a) / 255.0 * (1.0 - src_a);
        let out_a = src_a + dst_a;
        let mix = |s: u8, d: u8| {
            ((f32::from(s) * src_a + f32::from(d) * dst_a) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };

        Color::rgba(
            mix(self.r, dst.r),
            mix(self.g, dst.g),
            mix(self.b, dst.b),
            (out_a * 255.0).round() as u8,
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}
