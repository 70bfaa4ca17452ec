/// Conversions between unsigned integers and the gateway's `0x`-prefixed hex text.
pub trait HexText: Sized {
    /// Returns `self` as lowercase hex with a `0x` prefix.
    fn to_hex_text(self) -> String;

    /// Parses hex text with or without a `0x`/`0X` prefix.
    fn from_hex_text(text: &str) -> Option<Self>;
}

macro_rules! impl_hex_text {
    ($($t:ty)*) => ($(
        impl HexText for $t {
            fn to_hex_text(self) -> String {
                format!("{:#x}", self)
            }

            fn from_hex_text(text: &str) -> Option<$t> {
                let text = text.trim();
                let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
                // `from_str_radix` tolerates a leading sign.
                if digits.is_empty() || digits.starts_with('+') {
                    return None;
                }
                <$t>::from_str_radix(digits, 16).ok()
            }
        }
    )*)
}

impl_hex_text! { u8 u16 u32 u64 }
