//! Argument scanning.
//!
//! Fields are whitespace separated. Numbers are read from the longest
//! numeric prefix of a field, so `10ms` scans as `10`, matching the
//! firmware's historical `sscanf` behaviour.

use core::cmp::Ordering;

/// Whitespace-separated fields of an argument tail.
pub fn fields(tail: &str) -> core::str::SplitAsciiWhitespace<'_> {
    tail.split_ascii_whitespace()
}

/// Unsigned 16-bit integer from the digit prefix of `field`.
///
/// Values too large for `u16` saturate to `u16::MAX`, which every caller
/// then rejects with its range message.
pub fn parse_u16(field: &str) -> Option<u16> {
    let digits = field.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let mut value: u32 = 0;
    for b in field[..digits].bytes() {
        value = (value * 10 + u32::from(b - b'0')).min(u32::from(u16::MAX));
    }
    Some(value as u16)
}

/// Finite float from the longest numeric prefix of `field`.
pub fn parse_f32(field: &str) -> Option<f32> {
    let b = field.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_digits = count_digits(&b[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if b.get(i) == Some(&b'.') {
        frac_digits = count_digits(&b[i + 1..]);
        i += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&b[j.min(b.len())..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    field[..i].parse::<f32>().ok().filter(|v| v.is_finite())
}

fn count_digits(b: &[u8]) -> usize {
    b.iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Case-insensitive comparison of at most `n` bytes, where bytes past the
/// end of either string compare as NUL.
pub fn ncase_cmp(a: &str, b: &str, n: usize) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    for i in 0..n {
        let x = a.get(i).map_or(0, u8::to_ascii_lowercase);
        let y = b.get(i).map_or(0, u8::to_ascii_lowercase);
        match x.cmp(&y) {
            Ordering::Equal if x == 0 => return Ordering::Equal,
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// `true` when the first `n` bytes of `a` and `b` agree, ignoring case.
pub fn ncase_eq(a: &str, b: &str, n: usize) -> bool {
    ncase_cmp(a, b, n) == Ordering::Equal
}
