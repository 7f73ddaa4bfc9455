use super::{
    bits::{be_to_u64, Word},
    config::{FillPlacement, TextEncoding, TextOptions},
    error::{Error, Result},
    field::Width,
    value::Value,
};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

/// Widest field a numeric variant can pack.
pub const MAX_NUMERIC_BITS: usize = 64;

/// Encoded representation of a value, ready for bit packing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Encoded {
    Uint(u64),
    /// Big-endian byte string, used by text fields.
    Bytes(Bytes),
}

impl Encoded {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(v) => Some(v),
            Self::Uint(_) => None,
        }
    }
}

impl Word for Encoded {
    fn window(&self, shift: usize, count: usize) -> u8 {
        match self {
            Self::Uint(v) => v.window(shift, count),
            Self::Bytes(v) => v[..].window(shift, count),
        }
    }
}

/// Field variant together with its variant-specific parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Bool,
    /// Two's complement signed integer.
    Int,
    Uint,
    /// Signed fixed-point decimal with `frac` fractional digits.
    Float { frac: u8 },
    Ufloat { frac: u8 },
    Text(TextOptions),
    /// Instant since the Unix epoch, counted in units of `precision`.
    DateTime { precision: TimeDelta },
}

fn mask(nbits: usize) -> u128 {
    (1_u128 << nbits.min(MAX_NUMERIC_BITS)) - 1
}

fn scale(frac: u8) -> f64 {
    10_f64.powi(i32::from(frac))
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Uint => "Uint",
            Self::Float { .. } => "Float",
            Self::Ufloat { .. } => "Ufloat",
            Self::Text(_) => "Text",
            Self::DateTime { .. } => "DateTime",
        }
    }

    pub fn allows_auto_width(&self) -> bool {
        matches!(self, Self::Bool | Self::Text(_))
    }

    pub(crate) fn check(&self) -> Result<()> {
        match self {
            Self::DateTime { precision } => match precision.num_microseconds() {
                Some(us) if us >= 1 => Ok(()),
                _ => Err(Error::InvalidPrecision),
            },
            _ => Ok(()),
        }
    }

    /// Validates a declared width, resolving auto width where the variant has a default.
    pub(crate) fn resolve_width(&self, width: Width) -> Result<Width> {
        match width {
            Width::Fixed(0) => Err(Error::ZeroWidth),
            Width::Fixed(nbits) if nbits > MAX_NUMERIC_BITS && !matches!(self, Self::Text(_)) => {
                Err(Error::WidthTooLarge {
                    kind: self.name(),
                    nbits,
                    max: MAX_NUMERIC_BITS,
                })
            }
            Width::Fixed(_) => Ok(width),
            Width::Auto if matches!(self, Self::Bool) => Ok(Width::Fixed(1)),
            Width::Auto if self.allows_auto_width() => Ok(width),
            Width::Auto => Err(Error::AutoWidthForbidden(self.name())),
        }
    }

    /// Fails with an overflow error if `encoded` does not fit in `nbits`.
    pub fn validate_capacity(&self, encoded: &Encoded, nbits: usize, value: &Value) -> Result<()> {
        let fits = match (self, encoded) {
            // byte length scaled by 256, not by 8
            (Self::Text(_), Encoded::Bytes(b)) => {
                b.len().checked_mul(256).is_some_and(|len| len <= nbits)
            }
            (_, Encoded::Uint(v)) => u128::from(*v) <= mask(nbits),
            (_, Encoded::Bytes(b)) => b.len() * 8 <= nbits,
        };
        if fits {
            Ok(())
        } else {
            Err(Error::overflow(value, nbits))
        }
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::TypeMismatch {
            kind: self.name(),
            value: value.to_string(),
        }
    }

    fn negative(&self, value: &Value) -> Error {
        Error::Negative {
            kind: self.name(),
            value: value.to_string(),
        }
    }

    fn decimal(&self, value: &Value, frac: u8) -> Result<i128> {
        let v = value.as_f64().ok_or_else(|| self.mismatch(value))?;
        if !v.is_finite() {
            return Err(Error::NonFinite(v));
        }
        Ok((v * scale(frac)).round_ties_even() as i128)
    }

    /// Encodes `value` for a field of width `width`. Text fields of fixed
    /// width are filled up to `nbits / 8` bytes.
    pub fn encode(&self, value: &Value, width: Width) -> Result<Encoded> {
        if let Self::Text(opts) = self {
            return self.encode_text(opts, value, width);
        }
        let Width::Fixed(nbits) = width else {
            return Err(Error::AutoWidthForbidden(self.name()));
        };

        let enc = u64::try_from(self.encode_numeric(value, nbits)?)
            .map_err(|_| Error::overflow(value, nbits))?;
        let encoded = Encoded::Uint(enc);
        self.validate_capacity(&encoded, nbits, value)?;
        Ok(encoded)
    }

    fn encode_numeric(&self, value: &Value, nbits: usize) -> Result<i128> {
        Ok(match self {
            Self::Bool => i128::from(value.is_truthy()),
            // capacity decides, so unsigned input is taken at full range
            Self::Int => match value {
                Value::Int(v) => twos_complement(i128::from(*v), nbits),
                Value::Uint(v) => i128::from(*v),
                _ => return Err(self.mismatch(value)),
            },
            Self::Float { frac } => twos_complement(self.decimal(value, *frac)?, nbits),
            Self::Uint => match value {
                Value::Int(v) if *v < 0 => return Err(self.negative(value)),
                _ => i128::from(value.as_u64().ok_or_else(|| self.mismatch(value))?),
            },
            Self::Ufloat { frac } => {
                if value.as_f64().is_some_and(|v| v < 0.0) {
                    return Err(self.negative(value));
                }
                self.decimal(value, *frac)?
            }
            Self::DateTime { precision } => {
                let dt = value.as_datetime().ok_or_else(|| self.mismatch(value))?;
                let micros = dt.timestamp_micros();
                if micros < 0 {
                    return Err(self.negative(value));
                }
                let unit = precision.num_microseconds().ok_or(Error::InvalidPrecision)?;
                i128::from(micros / unit.max(1))
            }
            Self::Text(_) => return Err(self.mismatch(value)),
        })
    }

    fn encode_text(&self, opts: &TextOptions, value: &Value, width: Width) -> Result<Encoded> {
        let s = value.as_str().ok_or_else(|| self.mismatch(value))?;
        let mut raw = opts.text_encoding().encode(s);
        if let Width::Fixed(nbits) = width {
            self.validate_capacity(&Encoded::Bytes(Bytes::from(raw.clone())), nbits, value)?;
            let gap = (nbits / 8).saturating_sub(raw.len());
            if gap > 0 {
                let fill = std::iter::repeat(opts.fill_byte()).take(gap);
                match opts.fill_placement() {
                    FillPlacement::Prefix => {
                        raw.splice(0..0, fill);
                    }
                    FillPlacement::Suffix => raw.extend(fill),
                }
            }
        }
        Ok(Encoded::Bytes(Bytes::from(raw)))
    }

    /// Decodes a raw unsigned value of a numeric field.
    pub fn decode_uint(&self, raw: u64, nbits: usize) -> Result<Value> {
        Ok(match self {
            Self::Bool => Value::Bool(raw != 0),
            Self::Int => Value::Int(signed(raw, nbits)? as i64),
            Self::Float { frac } => Value::Decimal(signed(raw, nbits)? as f64 / scale(*frac)),
            Self::Uint => Value::Uint(raw),
            Self::Ufloat { frac } => Value::Decimal(raw as f64 / scale(*frac)),
            Self::DateTime { precision } => {
                let unit = precision.num_microseconds().ok_or(Error::InvalidPrecision)?;
                let dt = i64::try_from(raw)
                    .ok()
                    .and_then(|raw| raw.checked_mul(unit))
                    .and_then(DateTime::<Utc>::from_timestamp_micros)
                    .ok_or_else(|| Error::overflow(raw, nbits))?;
                Value::DateTime(dt)
            }
            Self::Text(_) => {
                return Err(Error::TypeMismatch {
                    kind: self.name(),
                    value: raw.to_string(),
                })
            }
        })
    }
}

/// Reads the big-endian bytes of a numeric field as one unsigned value.
pub(crate) fn raw_uint(raw: &[u8], nbits: usize) -> Result<u64> {
    let split = raw.len().saturating_sub(8);
    if raw[..split].iter().any(|&b| b != 0) {
        return Err(Error::overflow(format!("0x{}", hex::encode(raw)), nbits));
    }
    Ok(be_to_u64(&raw[split..]))
}

fn twos_complement(v: i128, nbits: usize) -> i128 {
    if v < 0 {
        v + (1_i128 << nbits)
    } else {
        v
    }
}

/// Undoes the two's complement bias; a high-bit pattern that still comes out
/// non-negative is an overflow.
fn signed(raw: u64, nbits: usize) -> Result<i128> {
    let raw_wide = i128::from(raw);
    let modulus = 1_i128 << nbits;
    if raw_wide >= modulus / 2 {
        let v = raw_wide - modulus;
        if v >= 0 {
            return Err(Error::overflow(raw, nbits));
        }
        Ok(v)
    } else {
        Ok(raw_wide)
    }
}

/// Strips the fill run and decodes the text, `None` if it is not valid in
/// the configured encoding.
pub(crate) fn decode_text(opts: &TextOptions, raw: &[u8]) -> Option<Value> {
    let fill = opts.fill_byte();
    let mut body = match opts.fill_placement() {
        FillPlacement::Prefix => {
            let start = raw.iter().position(|&b| b != fill).unwrap_or(raw.len());
            raw[start..].to_vec()
        }
        FillPlacement::Suffix => {
            let end = raw.iter().rposition(|&b| b != fill).map_or(0, |i| i + 1);
            raw[..end].to_vec()
        }
    };
    // a suffix run may have eaten the high byte of the last code unit
    if opts.text_encoding() == TextEncoding::Utf16
        && opts.fill_placement() == FillPlacement::Suffix
        && body.len() % 2 != 0
    {
        body.push(fill);
    }
    opts.text_encoding().decode(&body).map(Value::Text)
}
