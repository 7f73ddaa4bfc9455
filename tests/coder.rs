use bitscoder::*;
use chrono::{DateTime, TimeDelta};
use hex_literal::hex;

fn named(field: Result<Field>, name: &str) -> Field {
    field.unwrap().named(name).unwrap()
}

#[test]
fn encode_signed_fields() {
    let fields = vec![
        Field::int(3).unwrap().with_value(1).unwrap(),
        Field::int(8).unwrap().with_value(9).unwrap(),
        Field::int(5).unwrap().with_value(3).unwrap(),
    ];
    let expected = 0b001_00001001_00011_u16;

    let coder = Coder::new(fields.clone()).unwrap();
    assert_eq!(&coder.encode().unwrap()[..], expected.to_be_bytes());

    let coder = Coder::with_byte_order(fields, ByteOrder::Little).unwrap();
    assert_eq!(&coder.encode().unwrap()[..], expected.to_le_bytes());
}

#[test]
fn encode_after_filled_byte() {
    let coder = Coder::new(vec![
        Field::float(7, 1).unwrap().with_value(-1.3).unwrap(),
        Field::bool(1).unwrap().with_value(true).unwrap(),
        Field::int(8).unwrap().with_value(-3).unwrap(),
    ])
    .unwrap();
    assert_eq!(&coder.encode().unwrap()[..], hex!("e700fd"));
}

#[test]
fn encode_with_padding() {
    let coder = Coder::new(vec![
        Field::ufloat(5, 1).unwrap().with_value(1.3).unwrap(),
        Field::uint(8).unwrap().with_value(9_u8).unwrap(),
        Field::int(4).unwrap().with_value(-3).unwrap(),
    ])
    .unwrap();
    // 17 bits of fields, so 17 % 8 = 1 bit of padding
    assert_eq!(coder.fields()[3].nbits(), Some(1));
    assert_eq!(&coder.encode().unwrap()[..], hex!("684e80"));
}

#[test]
fn position_report() -> anyhow::Result<()> {
    let fields = vec![
        Field::int(6)?.named("temperature")?.with_value(21)?,
        Field::bool(1)?.named("is_nice")?.with_value(true)?,
        Field::float(18, 3)?.named("lat")?.with_value(78.234)?,
        Field::float(18, 3)?.named("lon")?.with_value(-33.111)?,
    ];
    let coder = Coder::new(fields.clone())?;
    let out = coder.encode()?;
    assert_eq!(&out[..], hex!("5698cd6fd520"));

    let mut decoder = Coder::new(fields.into_iter().map(|f| {
        let mut empty = Field::new(*f.kind(), f.width()).unwrap();
        if let Some(FieldName::User(name)) = f.name() {
            empty = empty.named(name.clone()).unwrap();
        }
        empty
    }))?;
    decoder.decode(&out)?;
    assert_eq!(decoder.map(), coder.map());
    assert_eq!(decoder.map()["lon"], Some(Value::Decimal(-33.111)));

    Ok(())
}

#[test]
fn decode_hex_payload() {
    let mut coder = Coder::new(vec![
        named(Field::int(7), "a"),
        named(Field::ufloat(8, 2), "b"),
        named(Field::bool(1), "c"),
        named(Field::int(6), "d"),
    ])
    .unwrap();
    coder.decode("e9a7003000").unwrap();

    let map = coder.map();
    assert_eq!(
        map.into_iter().collect::<Vec<_>>(),
        vec![
            ("a".to_string(), Some(Value::Int(-12))),
            ("b".to_string(), Some(Value::Decimal(2.11))),
            ("c".to_string(), Some(Value::Bool(true))),
            ("d".to_string(), Some(Value::Int(12))),
            ("___1".to_string(), Some(Value::Uint(0))),
        ]
    );
}

#[test]
fn byte_order_symmetry() -> anyhow::Result<()> {
    let fields = || -> Result<Vec<Field>> {
        Ok(vec![
            Field::uint(12)?.named("id")?,
            Field::int(9)?.named("delta")?,
            Field::ufloat(16, 2)?.named("level")?,
            Field::bool(Width::Auto)?.named("alarm")?,
        ])
    };

    let mut big = Coder::new(fields()?)?;
    for (name, value) in [
        ("id", Value::Uint(0xabc)),
        ("delta", Value::Int(-200)),
        ("level", Value::Decimal(321.07)),
        ("alarm", Value::Bool(true)),
    ] {
        big.field_mut(name).unwrap().set_value(value)?;
    }
    let out = big.encode()?;

    let mut reversed = out.to_vec();
    reversed.reverse();
    let mut little = Coder::with_byte_order(fields()?, ByteOrder::Little)?;
    little.decode(&reversed)?;
    assert_eq!(little.map(), big.map());
    assert_eq!(&little.encode()?[..], &reversed[..]);

    Ok(())
}

#[test]
fn all_variants_round_trip() -> anyhow::Result<()> {
    let utf8 = TextOptions::new().encoding(TextEncoding::Utf8);
    let at = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
    let fields = vec![
        Field::bool(1)?.named("bool")?.with_value(false)?,
        Field::int(13)?.named("int")?.with_value(-4096)?,
        Field::uint(64)?.named("uint")?.with_value(u64::MAX)?,
        Field::float(20, 4)?.named("float")?.with_value(-12.3456)?,
        Field::ufloat(10, 1)?.named("ufloat")?.with_value(102.3)?,
        Field::text(256 * 3, utf8)?.named("text")?.with_value("hé")?,
        Field::datetime(31, TimeDelta::seconds(1))?
            .named("at")?
            .with_value(at)?,
    ];
    let coder = Coder::new(fields.clone())?;
    let out = coder.encode()?;

    let mut decoder = Coder::new(fields)?;
    decoder.decode(&out)?;
    assert_eq!(decoder.list(), coder.list());
    assert_eq!(decoder.map()["text"], Some(Value::Text("hé".into())));
    assert_eq!(decoder.map()["at"], Some(Value::DateTime(at)));
    assert_eq!(decoder.encode()?, out);

    Ok(())
}

#[test]
fn capacity_boundaries() {
    let mut field = Field::uint(8).unwrap();
    field.set_value(255_u8).unwrap();
    let err = field.set_value(256_u16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
    assert_eq!(err.to_string(), "256 cannot fit in 8 bits");

    let mut field = Field::int(4).unwrap();
    field.set_value(-8).unwrap();
    assert_eq!(field.encoded(), Some(&Encoded::Uint(8)));
    assert_eq!(field.set_value(-17).unwrap_err().kind(), ErrorKind::Overflow);

    let mut field = Field::text(256 * 2, TextOptions::new().encoding(TextEncoding::Utf8)).unwrap();
    field.set_value("ab").unwrap();
    assert!(field.set_value("abc").unwrap_err().is_overflow());
    assert_eq!(field.value(), Some(&Value::Text("ab".into())));
}

#[test]
fn text_between_fields() {
    let utf8 = TextOptions::new().encoding(TextEncoding::Utf8);
    let mut coder = Coder::new(vec![
        named(Field::uint(4), "a"),
        named(Field::uint(4), "b"),
        named(Field::text(256 * 2, utf8), "t"),
    ])
    .unwrap();
    coder.field_mut("a").unwrap().set_value(0xa_u8).unwrap();
    coder.field_mut("b").unwrap().set_value(0xb_u8).unwrap();
    coder.field_mut("t").unwrap().set_value("hi").unwrap();

    let out = coder.encode().unwrap();
    assert_eq!(out.len(), 66);
    assert_eq!(&out[..2], hex!("ab00"));
    assert_eq!(&out[64..], b"hi");

    coder.field_mut("t").unwrap().set_value("").unwrap();
    coder.decode(&out).unwrap();
    assert_eq!(coder.map()["t"], Some(Value::Text("hi".into())));
}

#[test]
fn auto_width_text() {
    let utf8 = TextOptions::new().encoding(TextEncoding::Utf8);
    let mut coder = Coder::new(vec![
        named(Field::uint(8), "n"),
        named(Field::text(Width::Auto, utf8), "t"),
    ])
    .unwrap();
    assert_eq!(coder.len(), 2);
    assert_eq!(
        coder.encode(),
        Err(Error::MissingValue("n".into()))
    );

    coder.field_mut("n").unwrap().set_value(8_u8).unwrap();
    coder.field_mut("t").unwrap().set_value("abcdefgh").unwrap();
    assert_eq!(coder.field("t").unwrap().nbits(), Some(2048));
    assert_eq!(coder.total_bits(), 2056);

    let out = coder.encode().unwrap();
    assert_eq!(out.len(), 258);
    assert_eq!(&out[..2], hex!("0800"));
    assert_eq!(&out[250..], b"abcdefgh");

    coder.decode(&out).unwrap();
    assert_eq!(coder.map()["t"], Some(Value::Text("abcdefgh".into())));

    let mut unresolved = Coder::new(vec![named(Field::text(Width::Auto, utf8), "t")]).unwrap();
    assert_eq!(
        unresolved.decode(&out),
        Err(Error::UnresolvedWidth("t".into()))
    );
}

#[test]
fn short_payload() {
    let mut coder = Coder::new(vec![named(Field::uint(16), "a"), named(Field::uint(8), "b")]).unwrap();
    let err = coder.decode(&hex!("0102")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
    assert_eq!(coder.map()["a"], None);

    // trailing bytes are ignored
    coder.decode(&hex!("010203ff")).unwrap();
    assert_eq!(coder.map()["b"], Some(Value::Uint(3)));
}
