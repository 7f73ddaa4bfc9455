use super::error::{Error, Result};
use std::{fmt, str::FromStr};

/// Order in which packed bytes are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl FromStr for ByteOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "big" => Ok(Self::Big),
            "little" => Ok(Self::Little),
            other => Err(Error::InvalidByteOrder(other.to_owned())),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Big => "big",
            Self::Little => "little",
        })
    }
}

/// Character encoding of text fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    #[default]
    Utf16,
}

const UTF16_BOM_LE: [u8; 2] = [0xff, 0xfe];
const UTF16_BOM_BE: [u8; 2] = [0xfe, 0xff];

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
        }
    }

    /// Width of one code unit in bits.
    pub fn code_unit_bits(self) -> usize {
        match self {
            Self::Utf8 => 8,
            Self::Utf16 => 16,
        }
    }

    /// UTF-16 output starts with a byte-order mark and uses little-endian units.
    pub fn encode(self, s: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => s.as_bytes().to_vec(),
            Self::Utf16 => {
                let mut out = Vec::with_capacity(2 + s.len() * 2);
                out.extend_from_slice(&UTF16_BOM_LE);
                for unit in s.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::Utf16 => {
                let (body, from_bytes): (&[u8], fn([u8; 2]) -> u16) =
                    match bytes.get(..2) {
                        Some(bom) if bom == UTF16_BOM_BE => (&bytes[2..], u16::from_be_bytes),
                        Some(bom) if bom == UTF16_BOM_LE => (&bytes[2..], u16::from_le_bytes),
                        _ => (bytes, u16::from_le_bytes),
                    };
                if body.len() % 2 != 0 {
                    return None;
                }
                let units = body
                    .chunks_exact(2)
                    .map(|c| from_bytes([c[0], c[1]]))
                    .collect::<Vec<_>>();
                String::from_utf16(&units).ok()
            }
        }
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("UTF-8") {
            Ok(Self::Utf8)
        } else if s.eq_ignore_ascii_case("UTF-16") {
            Ok(Self::Utf16)
        } else {
            Err(Error::UnsupportedEncoding(s.to_owned()))
        }
    }
}

/// Side on which a text field is filled up to its declared length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillPlacement {
    #[default]
    Prefix,
    Suffix,
}

impl FromStr for FillPlacement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prefix" => Ok(Self::Prefix),
            "suffix" => Ok(Self::Suffix),
            other => Err(Error::InvalidFillPlacement(other.to_owned())),
        }
    }
}

/// Settings of a text field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextOptions {
    encoding: TextEncoding,
    fill_byte: u8,
    fill: FillPlacement,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default(),
            fill_byte: 0,
            fill: FillPlacement::default(),
        }
    }
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn fill(mut self, fill: FillPlacement) -> Self {
        self.fill = fill;
        self
    }

    /// Sets the fill character, which has to encode to exactly one UTF-8 byte.
    pub fn fill_char(mut self, c: char) -> Result<Self> {
        if c.len_utf8() != 1 {
            return Err(Error::InvalidFillChar(c));
        }
        self.fill_byte = c as u8;
        Ok(self)
    }

    pub fn text_encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn fill_placement(&self) -> FillPlacement {
        self.fill
    }

    pub fn fill_byte(&self) -> u8 {
        self.fill_byte
    }
}
