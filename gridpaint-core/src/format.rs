use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// A 24-bit color. Formats as `#rrggbb`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self { r: b[0], g: b[1], b: b[2] }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// `#rrggbb`, lowercase, two digits per channel.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = FormatError;

    /// Accepts `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(FormatError::BadColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| FormatError::BadColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// How the four codepoint bytes of a cell combine into a number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodepointLayout {
    /// Bit-exact with the buffers produced by existing producers: a non-zero
    /// fourth byte contributes `2^24 + b3`, not `b3 << 24`.
    #[default]
    Legacy,
    /// Plain little-endian `u32`.
    LittleEndian,
}

impl CodepointLayout {
    pub fn decode(self, b: [u8; 4]) -> u32 {
        match self {
            CodepointLayout::Legacy => {
                let low = u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16;
                if b[3] != 0 {
                    low + (1 << 24) + u32::from(b[3])
                } else {
                    low
                }
            }
            CodepointLayout::LittleEndian => u32::from_le_bytes(b),
        }
    }

    /// Legacy drops the fourth byte, so it only carries values below 2^24.
    pub fn encode(self, codepoint: u32) -> [u8; 4] {
        match self {
            CodepointLayout::Legacy => {
                let b = codepoint.to_le_bytes();
                [b[0], b[1], b[2], 0]
            }
            CodepointLayout::LittleEndian => codepoint.to_le_bytes(),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            CodepointLayout::Legacy => 0,
            CodepointLayout::LittleEndian => 1,
        }
    }

    pub fn from_u8(v: u8) -> Result<Self, FormatError> {
        match v {
            0 => Ok(CodepointLayout::Legacy),
            1 => Ok(CodepointLayout::LittleEndian),
            other => Err(FormatError::UnknownLayout(other)),
        }
    }
}

/// One grid slot: a raw codepoint plus foreground and background colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub codepoint: u32,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    /// codepoint:4 + fg:3 + bg:3 + padding:2
    pub const SIZE: usize = 12;

    pub fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self { codepoint: ch as u32, fg, bg }
    }

    pub fn blank(bg: Rgb) -> Self {
        Self::new(' ', Rgb::BLACK, bg)
    }

    pub fn from_bytes(b: &[u8], layout: CodepointLayout) -> Self {
        Self {
            codepoint: layout.decode([b[0], b[1], b[2], b[3]]),
            fg: Rgb::from_bytes(&b[4..7]),
            bg: Rgb::from_bytes(&b[7..10]),
        }
    }

    pub fn to_bytes(&self, layout: CodepointLayout) -> [u8; Cell::SIZE] {
        let cp = layout.encode(self.codepoint);
        let fg = self.fg.to_bytes();
        let bg = self.bg.to_bytes();
        [cp[0], cp[1], cp[2], cp[3], fg[0], fg[1], fg[2], bg[0], bg[1], bg[2], 0, 0]
    }

    /// The character to draw. Values that are not Unicode scalar values
    /// render as U+FFFD.
    pub fn glyph(&self) -> char {
        char::from_u32(self.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn is_blank(&self) -> bool {
        self.codepoint == ' ' as u32
    }
}

/// An owned, row-major cell buffer in the 12-byte wire layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellBuffer {
    cols: usize,
    rows: usize,
    layout: CodepointLayout,
    bytes: Vec<u8>,
}

impl CellBuffer {
    pub fn new(cols: usize, rows: usize, layout: CodepointLayout) -> Self {
        Self {
            cols,
            rows,
            layout,
            bytes: vec![0u8; cols * rows * Cell::SIZE],
        }
    }

    pub fn filled(cols: usize, rows: usize, layout: CodepointLayout, cell: Cell) -> Self {
        let mut buf = Self::new(cols, rows, layout);
        buf.fill(cell);
        buf
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn layout(&self) -> CodepointLayout {
        self.layout
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(x < self.cols && y < self.rows, "cell ({x}, {y}) outside {}x{} grid", self.cols, self.rows);
        (y * self.cols + x) * Cell::SIZE
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        let off = self.offset(x, y);
        Cell::from_bytes(&self.bytes[off..off + Cell::SIZE], self.layout)
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let off = self.offset(x, y);
        self.bytes[off..off + Cell::SIZE].copy_from_slice(&cell.to_bytes(self.layout));
    }

    pub fn fill(&mut self, cell: Cell) {
        let raw = cell.to_bytes(self.layout);
        for chunk in self.bytes.chunks_exact_mut(Cell::SIZE) {
            chunk.copy_from_slice(&raw);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

pub const MAGIC: &[u8; 4] = b"GRID";
pub const VERSION: u16 = 1;
pub const HEADER_SIZE: usize = 32;

/// Snapshot header: fixed 32 bytes at the start of a .grid file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridHeader {
    // magic: [u8; 4] = "GRID"
    // version: u16
    pub cols: u16,
    pub rows: u16,
    pub font_width: u16,
    pub font_height: u16,
    pub layout: CodepointLayout,
}

impl GridHeader {
    pub fn body_len(&self) -> usize {
        self.cols as usize * self.rows as usize * Cell::SIZE
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4..6].copy_from_slice(&VERSION.to_le_bytes());
        buf[6..8].copy_from_slice(&self.cols.to_le_bytes());
        buf[8..10].copy_from_slice(&self.rows.to_le_bytes());
        buf[10..12].copy_from_slice(&self.font_width.to_le_bytes());
        buf[12..14].copy_from_slice(&self.font_height.to_le_bytes());
        buf[14] = self.layout.to_u8();
        // bytes 15..32 reserved
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, FormatError> {
        if &buf[0..4] != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        Ok(Self {
            cols: u16::from_le_bytes([buf[6], buf[7]]),
            rows: u16::from_le_bytes([buf[8], buf[9]]),
            font_width: u16::from_le_bytes([buf[10], buf[11]]),
            font_height: u16::from_le_bytes([buf[12], buf[13]]),
            layout: CodepointLayout::from_u8(buf[14])?,
        })
    }
}
