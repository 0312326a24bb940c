//! Chart Palette Module
//! Fixed dashboard colors and the ordinal color scale used for series keys.

use std::fmt;

/// An opaque RGB color, rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const HEADING: Rgb = Rgb(0x40, 0x40, 0x40);
pub const SUBHEADING: Rgb = Rgb(0x80, 0x80, 0x80);
pub const SUBHEADING_MINOR: Rgb = Rgb(0xAA, 0xAA, 0xAA);
pub const MAX_LINE: Rgb = Rgb(0x80, 0x80, 0x80);
pub const COMMIT_LINE: Rgb = Rgb(0xDC, 0x14, 0x3C); // Crimson
pub const MOUSE_LINE: Rgb = Rgb(0xB9, 0xD3, 0xA4);

/// Series colors, in assignment order.
pub const CATEGORY10: [Rgb; 10] = [
    Rgb(31, 119, 180),  // Blue
    Rgb(255, 127, 14),  // Orange
    Rgb(44, 160, 44),   // Green
    Rgb(214, 39, 40),   // Red
    Rgb(148, 103, 189), // Purple
    Rgb(140, 86, 75),   // Brown
    Rgb(227, 119, 194), // Pink
    Rgb(127, 127, 127), // Grey
    Rgb(188, 189, 34),  // Olive
    Rgb(23, 190, 207),  // Cyan
];

/// Breaker marker colors, keyed by rating.
pub const BREAKER_PALETTE: [Rgb; 6] = [
    Rgb(0xFF, 0xC0, 0x00),
    Rgb(0xFF, 0x00, 0x00),
    Rgb(0xFF, 0xFF, 0x00),
    Rgb(0xC0, 0xFF, 0x00),
    Rgb(0xC0, 0xC0, 0x00),
    Rgb(0xC0, 0x00, 0x00),
];

/// Maps keys to palette entries in first-seen order. Unknown keys extend the
/// domain, so the same key always gets the same color within one chart.
#[derive(Debug, Clone)]
pub struct OrdinalColors {
    palette: &'static [Rgb],
    domain: Vec<String>,
}

impl OrdinalColors {
    pub fn new(palette: &'static [Rgb]) -> Self {
        Self {
            palette,
            domain: Vec::new(),
        }
    }

    pub fn category10() -> Self {
        Self::new(&CATEGORY10)
    }

    pub fn color(&mut self, key: &str) -> Rgb {
        let index = match self.domain.iter().position(|k| k == key) {
            Some(index) => index,
            None => {
                self.domain.push(key.to_string());
                self.domain.len() - 1
            }
        };
        self.palette[index % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_formatting() {
        assert_eq!(COMMIT_LINE.hex(), "#dc143c");
        assert_eq!(CATEGORY10[0].to_string(), "#1f77b4");
    }

    #[test]
    fn test_ordinal_colors_are_stable_and_wrap() {
        let mut colors = OrdinalColors::category10();
        let first = colors.color("A1");
        assert_eq!(colors.color("B1"), CATEGORY10[1]);
        assert_eq!(colors.color("A1"), first);

        for i in 0..9 {
            colors.color(&format!("extra-{i}"));
        }
        // 11th distinct key wraps to the palette start
        assert_eq!(colors.color("extra-8"), CATEGORY10[0]);
    }
}
