//! Named sequential and diverging color palettes, sampled into as many colors as a classification
//! has buckets.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Palette {
    YlOrRd,
    YlGn,
    Greens,
    Blues,
    RdYlGn,
    Viridis,
}

impl Palette {
    /// Anchor colors from light/low to dark/high
    fn stops(&self) -> &'static [u32] {
        match self {
            Palette::YlOrRd => &[
                0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026,
                0x800026,
            ],
            Palette::YlGn => &[
                0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837,
                0x004529,
            ],
            Palette::Greens => &[
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            Palette::Blues => &[
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            Palette::RdYlGn => &[
                0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
                0x66bd63, 0x1a9850, 0x006837,
            ],
            Palette::Viridis => &[
                0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58,
                0xb5de2b, 0xfde725,
            ],
        }
    }

    /// Sample `n` colors evenly spaced along the palette, interpolating between anchors.
    pub fn colors(&self, n: usize) -> Vec<RGBColor> {
        let stops = self.stops();
        (0..n)
            .map(|i| {
                let t = if n == 1 {
                    0.5
                } else {
                    i as f64 / (n - 1) as f64
                };
                let position = t * (stops.len() - 1) as f64;
                let lower = position.floor() as usize;
                let upper = (lower + 1).min(stops.len() - 1);
                lerp(
                    to_rgb(stops[lower]),
                    to_rgb(stops[upper]),
                    position - lower as f64,
                )
            })
            .collect()
    }
}

fn to_rgb(hex: u32) -> RGBColor {
    RGBColor((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}
