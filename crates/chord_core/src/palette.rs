use serde::Serialize;

/// Qualitative ten-color palette (Tableau10), indexed by entity position.
pub const TABLEAU10: [Rgb; 10] = [
    Rgb::new(0x4e, 0x79, 0xa7),
    Rgb::new(0xf2, 0x8e, 0x2c),
    Rgb::new(0xe1, 0x57, 0x59),
    Rgb::new(0x76, 0xb7, 0xb2),
    Rgb::new(0x59, 0xa1, 0x4f),
    Rgb::new(0xed, 0xc9, 0x49),
    Rgb::new(0xaf, 0x7a, 0xa1),
    Rgb::new(0xff, 0x9d, 0xa7),
    Rgb::new(0x9c, 0x75, 0x5f),
    Rgb::new(0xba, 0xb0, 0xab),
];

const DARKER: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Stable color for the entity at `index`; cycles after ten entities.
    pub const fn for_index(index: usize) -> Self {
        TABLEAU10[index % TABLEAU10.len()]
    }

    /// Darkens by `0.7^k`, the usual stroke treatment for arcs and ribbons.
    pub fn darker(self, k: f64) -> Self {
        let factor = DARKER.powf(k);
        self.map(|channel| f64::from(channel) * factor)
    }

    /// Blends toward `background` so `opacity` survives on surfaces without alpha.
    pub fn fade(self, opacity: f64, background: Self) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| {
            let (fg, bg) = (f64::from(fg), f64::from(bg));
            fg.mul_add(opacity, bg * (1.0 - opacity))
        };

        Self {
            r: to_channel(mix(self.r, background.r)),
            g: to_channel(mix(self.g, background.g)),
            b: to_channel(mix(self.b, background.b)),
        }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn map(self, f: impl Fn(u8) -> f64) -> Self {
        Self {
            r: to_channel(f(self.r)),
            g: to_channel(f(self.g)),
            b: to_channel(f(self.b)),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
