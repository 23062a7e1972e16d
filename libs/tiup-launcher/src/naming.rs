use std::time::{SystemTime, UNIX_EPOCH};

const BASE62_DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: u128 = 62;

/// Encode `value` in base62, most significant digit first.
#[must_use]
pub fn base62(mut value: u128) -> String {
    if value == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value.rem_euclid(BASE)).unwrap_or_default();
        digits.push(char::from(BASE62_DIGITS[digit]));
        value = value.div_euclid(BASE);
    }
    digits.iter().rev().collect()
}

/// Instance name derived from the current nanosecond timestamp.
///
/// Names are unique only among invocations that do not start in the same
/// nanosecond. They are predictable and must not be used as secrets.
#[must_use]
pub fn instance_name_from_clock() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    base62(nanos)
}
