/// Broad class of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed parameters or values, reported before any bits are produced.
    Validation,
    /// An encoded value does not fit its declared width.
    Overflow,
    /// A payload handed to the decoder cannot be read against the schema.
    Malformed,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{value} cannot fit in {nbits} bits")]
    Overflow { value: String, nbits: usize },
    #[error("auto width for {0} encoded bytes exceeds the addressable bit range")]
    WidthOverflow(usize),
    #[error("field name cannot start with `___`: {0}")]
    ReservedName(String),
    #[error("field width must be at least 1 bit")]
    ZeroWidth,
    #[error("{kind} field cannot be wider than {max} bits, got {nbits}")]
    WidthTooLarge {
        kind: &'static str,
        nbits: usize,
        max: usize,
    },
    #[error("{0} field requires fixed number of bits")]
    AutoWidthForbidden(&'static str),
    #[error("field `{0}` has no resolved width")]
    UnresolvedWidth(String),
    #[error("encoding {0} is not supported")]
    UnsupportedEncoding(String),
    #[error("fill type must be either `prefix` or `suffix`, got `{0}`")]
    InvalidFillPlacement(String),
    #[error("fill character must encode to a single byte, got {0:?}")]
    InvalidFillChar(char),
    #[error("byte order must be either `big` or `little`, got `{0}`")]
    InvalidByteOrder(String),
    #[error("{kind} field cannot hold {value}")]
    TypeMismatch { kind: &'static str, value: String },
    #[error("{kind} field value needs to be positive, got {value}")]
    Negative { kind: &'static str, value: String },
    #[error("{0} is not a finite number")]
    NonFinite(f64),
    #[error("precision must be at least one microsecond")]
    InvalidPrecision,
    #[error("all fields need to have a value for encoding, `{0}` has none")]
    MissingValue(String),
    #[error("payload too short: field `{field}` needs byte {needed}, payload has {len}")]
    PayloadTooShort {
        field: String,
        needed: usize,
        len: usize,
    },
    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("field `{field}` does not hold valid {encoding} text")]
    MalformedText {
        field: String,
        encoding: &'static str,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Overflow { .. } | Self::WidthOverflow(_) => ErrorKind::Overflow,
            Self::PayloadTooShort { .. } | Self::InvalidHex(_) | Self::MalformedText { .. } => {
                ErrorKind::Malformed
            }
            _ => ErrorKind::Validation,
        }
    }

    pub fn is_overflow(&self) -> bool {
        self.kind() == ErrorKind::Overflow
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub(crate) fn overflow(value: impl ToString, nbits: usize) -> Self {
        Self::Overflow {
            value: value.to_string(),
            nbits,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
