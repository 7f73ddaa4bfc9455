use super::{
    config::TextOptions,
    error::{Error, Result},
    kind::{decode_text, raw_uint, Encoded, Kind},
    value::Value,
};
use bytes::Bytes;
use chrono::TimeDelta;
use std::fmt;

/// Prefix of names the coder gives to unnamed fields.
pub const RESERVED_PREFIX: &str = "___";

/// Bit width of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    Fixed(usize),
    /// Resolved once the value has been encoded.
    Auto,
}

impl Width {
    pub fn fixed(self) -> Option<usize> {
        match self {
            Self::Fixed(nbits) => Some(nbits),
            Self::Auto => None,
        }
    }
}

impl From<usize> for Width {
    fn from(nbits: usize) -> Self {
        Self::Fixed(nbits)
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(nbits) => write!(f, "{nbits}"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    User(String),
    /// Assigned by the coder, rendered as `___<n>`.
    Synthetic(usize),
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) => f.write_str(name),
            Self::Synthetic(n) => write!(f, "{RESERVED_PREFIX}{n}"),
        }
    }
}

/// A single typed schema unit.
///
/// The encoded value is kept in sync with the value: every assignment
/// re-encodes, and a failing assignment leaves the field untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: Option<FieldName>,
    width: Width,
    kind: Kind,
    value: Option<Value>,
    encoded: Option<Encoded>,
}

impl Field {
    pub fn new(kind: Kind, width: impl Into<Width>) -> Result<Self> {
        kind.check()?;
        Ok(Self {
            name: None,
            width: kind.resolve_width(width.into())?,
            kind,
            value: None,
            encoded: None,
        })
    }

    pub fn bool(width: impl Into<Width>) -> Result<Self> {
        Self::new(Kind::Bool, width)
    }

    pub fn int(width: impl Into<Width>) -> Result<Self> {
        Self::new(Kind::Int, width)
    }

    pub fn uint(width: impl Into<Width>) -> Result<Self> {
        Self::new(Kind::Uint, width)
    }

    pub fn float(width: impl Into<Width>, frac: u8) -> Result<Self> {
        Self::new(Kind::Float { frac }, width)
    }

    pub fn ufloat(width: impl Into<Width>, frac: u8) -> Result<Self> {
        Self::new(Kind::Ufloat { frac }, width)
    }

    pub fn text(width: impl Into<Width>, opts: TextOptions) -> Result<Self> {
        Self::new(Kind::Text(opts), width)
    }

    pub fn datetime(width: impl Into<Width>, precision: TimeDelta) -> Result<Self> {
        Self::new(Kind::DateTime { precision }, width)
    }

    pub fn named(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.starts_with(RESERVED_PREFIX) {
            return Err(Error::ReservedName(name));
        }
        self.name = Some(FieldName::User(name));
        Ok(self)
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Result<Self> {
        self.set_value(value)?;
        Ok(self)
    }

    pub fn name(&self) -> Option<&FieldName> {
        self.name.as_ref()
    }

    pub(crate) fn assign_name(&mut self, name: FieldName) {
        self.name = Some(name);
    }

    pub(crate) fn label(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| format!("<{}>", self.kind.name()), ToString::to_string)
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn nbits(&self) -> Option<usize> {
        self.width.fixed()
    }

    /// Changes the width, re-encoding the current value for it. Fails without
    /// touching the field if the value does not fit.
    pub fn set_width(&mut self, width: impl Into<Width>) -> Result<()> {
        let width = self.kind.resolve_width(width.into())?;
        match &self.value {
            Some(value) => {
                let (width, encoded) = self.encode_at(value, width)?;
                self.width = width;
                self.encoded = Some(encoded);
            }
            None => self.width = width,
        }
        Ok(())
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let (width, encoded) = self.encode_at(&value, self.width)?;

        self.width = width;
        self.value = Some(value);
        self.encoded = Some(encoded);
        Ok(())
    }

    /// Encodes `value` at `width`, resolving an auto width from the encoded length.
    fn encode_at(&self, value: &Value, width: Width) -> Result<(Width, Encoded)> {
        let encoded = self.kind.encode(value, width)?;
        let width = match (width, &encoded) {
            (Width::Auto, Encoded::Bytes(bytes)) => {
                let nbits = auto_width(bytes.len()).ok_or(Error::WidthOverflow(bytes.len()))?;
                self.kind.validate_capacity(&encoded, nbits, value)?;
                Width::Fixed(nbits)
            }
            (width, _) => width,
        };
        Ok((width, encoded))
    }

    pub fn encoded(&self) -> Option<&Encoded> {
        self.encoded.as_ref()
    }

    /// Decodes bits extracted from a payload, right-aligned in big-endian bytes.
    pub fn decode(&mut self, raw: &[u8]) -> Result<&Value> {
        let nbits = self.resolved_nbits()?;
        let (value, encoded) = match &self.kind {
            Kind::Text(opts) => {
                let value = decode_text(opts, raw).ok_or_else(|| Error::MalformedText {
                    field: self.label(),
                    encoding: opts.text_encoding().name(),
                })?;
                (value, Encoded::Bytes(Bytes::copy_from_slice(raw)))
            }
            kind => {
                let raw = raw_uint(raw, nbits)?;
                (kind.decode_uint(raw, nbits)?, Encoded::Uint(raw))
            }
        };
        self.encoded = Some(encoded);
        Ok(self.value.insert(value))
    }

    /// Decodes a raw unsigned value of a numeric field.
    pub fn decode_uint(&mut self, raw: u64) -> Result<&Value> {
        let nbits = self.resolved_nbits()?;
        let value = self.kind.decode_uint(raw, nbits)?;
        self.encoded = Some(Encoded::Uint(raw));
        Ok(self.value.insert(value))
    }

    pub(crate) fn resolved_nbits(&self) -> Result<usize> {
        self.nbits()
            .ok_or_else(|| Error::UnresolvedWidth(self.label()))
    }
}

/// Width given to an auto-width field holding `len` encoded bytes: `2^len * 8`.
fn auto_width(len: usize) -> Option<usize> {
    u32::try_from(len)
        .ok()
        .and_then(|len| 1_usize.checked_shl(len))
        .and_then(|w| w.checked_mul(8))
}
