use super::{
    bits,
    config::ByteOrder,
    error::{Error, Result},
    field::{Field, FieldName},
    value::Value,
};
use bytes::{Bytes, BytesMut};
use derive_more::Deref;
use indexmap::IndexMap;
use std::{borrow::Cow, cell::OnceCell};

/// Payload accepted by [`Coder::decode`]: raw bytes or their hex representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload<'a> {
    Bytes(&'a [u8]),
    /// Hex digits, optionally separated by whitespace.
    Hex(&'a str),
}

impl<'a> Payload<'a> {
    fn to_bytes(self) -> Result<Cow<'a, [u8]>> {
        match self {
            Self::Bytes(b) => Ok(Cow::Borrowed(b)),
            Self::Hex(s) => {
                let digits = s.split_whitespace().collect::<String>();
                Ok(Cow::Owned(hex::decode(digits)?))
            }
        }
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Bytes> for Payload<'a> {
    fn from(b: &'a Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(s: &'a str) -> Self {
        Self::Hex(s)
    }
}

/// Field values in field order, as captured by [`Coder::list`].
#[derive(Clone, Debug, PartialEq, Deref)]
pub struct Values(Vec<Option<Value>>);

/// Packs an ordered set of fields into bytes and back.
///
/// Construction appends an unsigned, zero-valued padding field of
/// `sum(fixed widths) % 8` bits when that sum is not byte-aligned, and names
/// every unnamed field `___1`, `___2`, ... in order.
#[derive(Clone, Debug)]
pub struct Coder {
    fields: Vec<Field>,
    byte_order: ByteOrder,
    list: OnceCell<Values>,
}

impl Coder {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        Self::with_byte_order(fields, ByteOrder::Big)
    }

    pub fn with_byte_order(
        fields: impl IntoIterator<Item = Field>,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        let mut fields = fields.into_iter().collect::<Vec<_>>();

        let remaining_bits = fields
            .iter()
            .filter_map(Field::nbits)
            .fold(0, |acc, nbits| (acc + nbits % 8) % 8);
        if remaining_bits != 0 {
            fields.push(Field::uint(remaining_bits)?.with_value(0_u64)?);
        }

        let mut counter = 1;
        for field in fields.iter_mut().filter(|f| f.name().is_none()) {
            field.assign_name(FieldName::Synthetic(counter));
            counter += 1;
        }

        tracing::debug!(
            fields = fields.len(),
            padding = remaining_bits,
            %byte_order,
            "coder created"
        );

        Ok(Self {
            fields,
            byte_order,
            list: OnceCell::new(),
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Fields in packing order, padding field included.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.label() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of all resolved field widths.
    pub fn total_bits(&self) -> usize {
        self.fields
            .iter()
            .filter_map(Field::nbits)
            .fold(0, usize::saturating_add)
    }

    /// Field name to value map, rebuilt on every call.
    pub fn map(&self) -> IndexMap<String, Option<Value>> {
        self.fields
            .iter()
            .map(|f| (f.label(), f.value().cloned()))
            .collect()
    }

    /// Field values, captured on the first call; later mutations of the
    /// fields are not reflected.
    pub fn list(&self) -> &Values {
        self.list
            .get_or_init(|| Values(self.fields.iter().map(|f| f.value().cloned()).collect()))
    }

    pub fn validate_fields_for_encoding(&self) -> Result<()> {
        match self.fields.iter().find(|f| f.encoded().is_none()) {
            Some(field) => Err(Error::MissingValue(field.label())),
            None => Ok(()),
        }
    }

    /// Packs every field's encoded value into bytes.
    pub fn encode(&self) -> Result<Bytes> {
        self.validate_fields_for_encoding()?;

        let mut writer = bits::Writer::new(BytesMut::with_capacity(
            self.total_bits().div_ceil(8),
        ));
        for field in &self.fields {
            let nbits = field.resolved_nbits()?;
            let encoded = field
                .encoded()
                .ok_or_else(|| Error::MissingValue(field.label()))?;
            tracing::trace!(field = %field.label(), nbits, "packing field");
            writer.write(nbits, encoded);
        }

        let mut bytes = writer.finish();
        if self.byte_order == ByteOrder::Little {
            bytes.reverse();
        }
        tracing::debug!(bytes = bytes.len(), byte_order = %self.byte_order, "encoded");

        Ok(bytes.freeze())
    }

    /// Unpacks `payload` into the fields. Trailing bytes the schema does not
    /// consume are ignored. On error no field is modified.
    pub fn decode<'a>(&mut self, payload: impl Into<Payload<'a>>) -> Result<()> {
        let mut pld = payload.into().to_bytes()?;
        if self.byte_order == ByteOrder::Little {
            pld.to_mut().reverse();
        }

        let mut fields = self.fields.clone();
        let mut reader = bits::Reader::new(&pld);
        for field in &mut fields {
            let nbits = field.resolved_nbits()?;
            let raw = reader
                .read(nbits)
                .map_err(|e| Error::PayloadTooShort {
                    field: field.label(),
                    needed: e.needed,
                    len: e.len,
                })?;
            field.decode(&raw)?;
            tracing::trace!(field = %field.label(), nbits, value = ?field.value(), "unpacked field");
        }
        tracing::debug!(
            bytes = pld.len(),
            unused = reader.non_read_bytes(),
            byte_order = %self.byte_order,
            "decoded"
        );

        self.fields = fields;
        Ok(())
    }

    pub fn decode_hex(&mut self, payload: &str) -> Result<()> {
        self.decode(Payload::Hex(payload))
    }
}
