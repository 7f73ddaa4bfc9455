//! Bit-level packing of typed fields into byte buffers.
//!
//! A [`Coder`] owns an ordered list of [`Field`]s. [`Coder::encode`] packs
//! every field's encoded value MSB-first, at its declared bit width, into a
//! byte buffer; [`Coder::decode`] walks a buffer with the same schema and
//! hands each field its bits back.

pub mod bits;
mod coder;
mod config;
mod error;
mod field;
mod kind;
mod value;

pub use self::{
    bits::{Reader as BitsReader, Writer as BitsWriter},
    coder::{Coder, Payload, Values},
    config::{ByteOrder, FillPlacement, TextEncoding, TextOptions},
    error::{Error, ErrorKind, Result},
    field::{Field, FieldName, Width, RESERVED_PREFIX},
    kind::{Encoded, Kind, MAX_NUMERIC_BITS},
    value::Value,
};
