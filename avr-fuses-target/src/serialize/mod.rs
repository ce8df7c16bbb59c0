mod hex_option;
mod hex_u_int;
mod serialize_u_int;

pub(crate) use hex_option::deserialize as hex_option_u8;
pub(crate) use hex_option::serialize as hex_option;
pub(crate) use hex_u_int::deserialize as hex_u8;
pub(crate) use hex_u_int::serialize as hex_u_int;
