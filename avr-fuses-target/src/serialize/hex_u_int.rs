use super::serialize_u_int::SerializeUnsignedInt;
use serde::{self, de, Deserializer, Serializer};
use std::fmt;

pub(crate) fn serialize<T, S>(register_value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: std::fmt::LowerHex + SerializeUnsignedInt,
{
    // We serialize the value as hex strings when generating human-readable formats such as YAML,
    let check_for_human_readable = serializer.is_human_readable();
    if check_for_human_readable {
        serializer.serialize_str(format!("{:#04x}", register_value).as_str())
    } else {
        register_value.serialize_int(serializer)
    }
}

/// Accepts plain integers as well as `"0x.."`, `"0b.."` and decimal strings,
/// so that files written by [`serialize`] can be read back.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    struct U8Visitor;

    impl<'de> de::Visitor<'de> for U8Visitor {
        type Value = u8;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "an 8-bit value, either as number or as hex string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            u8::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u8::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            let parsed = if let Some(hex) = v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
                u8::from_str_radix(hex, 16)
            } else if let Some(bin) = v.strip_prefix("0b") {
                u8::from_str_radix(bin, 2)
            } else {
                v.parse()
            };

            parsed.map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    if deserializer.is_human_readable() {
        deserializer.deserialize_any(U8Visitor)
    } else {
        deserializer.deserialize_u8(U8Visitor)
    }
}
