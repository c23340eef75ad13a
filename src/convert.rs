use rug::{Integer, Rational};

use crate::errors::*;
use crate::value::*;

/// First glyph of each contiguous ten digit block accepted in numbers:
/// Arabic-Indic, Extended Arabic-Indic, NKo, Devanagari, Bengali, Gurmukhi,
/// Gujarati, Oriya, Tamil, Telugu, Kannada, Malayalam, Thai, Lao, Tibetan,
/// Myanmar, Myanmar Shan, Khmer, Mongolian, Limbu, New Tai Lue, Balinese,
/// Sundanese, Lepcha, Ol Chiki, Vai, Saurashtra, Kayah Li, Cham, Osmanya
const SCRIPT_ZEROS: [char; 30] = [
    '\u{0660}', '\u{06F0}', '\u{07C0}', '\u{0966}', '\u{09E6}', '\u{0A66}', '\u{0AE6}', '\u{0B66}', '\u{0BE6}',
    '\u{0C66}', '\u{0CE6}', '\u{0D66}', '\u{0E50}', '\u{0ED0}', '\u{0F20}', '\u{1040}', '\u{1090}', '\u{17E0}',
    '\u{1810}', '\u{1946}', '\u{19D0}', '\u{1B50}', '\u{1BB0}', '\u{1C40}', '\u{1C50}', '\u{A620}', '\u{A8D0}',
    '\u{A900}', '\u{AA50}', '\u{104A0}',
];

/// Hangzhou numerals: the ideographic zero is not next to the others
const HANGZHOU_DIGITS: [char; 10] = ['〇', '〡', '〢', '〣', '〤', '〥', '〦', '〧', '〨', '〩'];

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

const FRACTIONS: [(char, i32, u32); 15] = [
    ('½', 1, 2),
    ('⅓', 1, 3),
    ('⅔', 2, 3),
    ('¼', 1, 4),
    ('¾', 3, 4),
    ('⅕', 1, 5),
    ('⅖', 2, 5),
    ('⅗', 3, 5),
    ('⅘', 4, 5),
    ('⅙', 1, 6),
    ('⅚', 5, 6),
    ('⅛', 1, 8),
    ('⅜', 3, 8),
    ('⅝', 5, 8),
    ('⅞', 7, 8),
];

/// Largest base whose digits can be written: 0-9 and a-f
pub const MAX_BASE: u32 = 16;

/// Value of a digit in any supported script, `None` if `c` is not a digit
/// or is too big for `base`
pub fn digit_value(c: char, base: u32) -> Option<u32> {
    let value = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'a'..='f' => c as u32 - 'a' as u32 + 10,
        'A'..='F' => c as u32 - 'A' as u32 + 10,
        _ => {
            let code = c as u32;
            SCRIPT_ZEROS
                .iter()
                .map(|z| *z as u32)
                .find(|z| code >= *z && code < *z + 10)
                .map(|z| code - z)
                .or_else(|| HANGZHOU_DIGITS.iter().position(|d| *d == c).map(|p| p as u32))?
        }
    };
    if value < base {
        Some(value)
    } else {
        None
    }
}

fn is_minus(c: char) -> bool {
    c == '-' || c == '−'
}

fn script_to_i64(text: &str, digits: &[char; 10], minus: char) -> Option<i64> {
    let (negative, body) = match text.strip_prefix(minus) {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for c in body.chars() {
        let d = digits.iter().position(|x| *x == c)?;
        value = value.checked_mul(10)?.checked_add(d as i64)?;
    }
    Some(if negative { -value } else { value })
}

/// Decodes a superscript integer such as `⁻¹²`
pub fn superscript_to_i64(text: &str) -> Option<i64> {
    script_to_i64(text, &SUPERSCRIPT_DIGITS, '⁻')
}

/// Decodes a subscript integer such as `₁₆`
pub fn subscript_to_i64(text: &str) -> Option<i64> {
    script_to_i64(text, &SUBSCRIPT_DIGITS, '₋')
}

/// accumulates digits starting at `pos`, returns the number and how many digits were read
fn read_digits(chars: &[char], pos: &mut usize, base: u32) -> (Integer, Integer, usize) {
    let mut value = Integer::new();
    let mut scale = Integer::from(1);
    let mut count = 0;
    while let Some(d) = chars.get(*pos).and_then(|c| digit_value(*c, base)) {
        value *= base;
        value += d;
        scale *= base;
        count += 1;
        *pos += 1;
    }
    (value, scale, count)
}

/// Parses `D°M'S"` as `D + M/60 + S/3600`. Minutes and seconds are optional
/// and unsigned, a sign belongs to the degrees only
fn parse_sexagesimal(text: &str, ctx: &Context) -> MathResult {
    let err = || MathError::Parse(text.to_string());
    let (degrees, rest) = text.split_once('°').ok_or_else(err)?;
    let negative = degrees.starts_with(is_minus);
    let degrees = degrees.trim_start_matches(|c| is_minus(c) || c == '+');
    let mut value = parse_rational(degrees, 10).ok_or_else(err)?;
    if negative {
        value = -value;
    }

    if !rest.is_empty() {
        let (minutes, seconds) = match rest.split_once(['\'', '′']) {
            Some((m, s)) => (m, s),
            None => (rest, ""),
        };
        value += parse_rational(minutes, 10).ok_or_else(err)? / Rational::from(60);
        if !seconds.is_empty() {
            let seconds = seconds.strip_suffix(['"', '″']).unwrap_or(seconds);
            value += parse_rational(seconds, 10).ok_or_else(err)? / Rational::from(3600);
        }
    }

    Ok(ctx.from_rational(&value))
}

/// unsigned number with an optional fraction part, as an exact rational
fn parse_rational(text: &str, base: u32) -> Option<Rational> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let (int, _, mut count) = read_digits(&chars, &mut pos, base);
    let mut value = Rational::from(int);
    if chars.get(pos) == Some(&'.') {
        pos += 1;
        let (num, den, n) = read_digits(&chars, &mut pos, base);
        count += n;
        value += Rational::from((num, den));
    }
    if pos != chars.len() || count == 0 {
        return None;
    }
    Some(value)
}

/// Parses a number.
///
/// Accepted forms: an optional sign (`+`, `-` or `−`), digits in any supported
/// script, an optional `.` with fraction digits, an optional vulgar fraction
/// glyph (`1½`), and an optional subscript base suffix (`ff₁₆`) that
/// overrides `default_base`. `12°30'15"` is read as degrees, minutes, and
/// seconds. The value is built exactly and rounded once to the context
/// precision
pub fn parse(text: &str, default_base: u32, ctx: &Context) -> MathResult {
    let err = || MathError::Parse(text.to_string());
    if text.contains('°') {
        return parse_sexagesimal(text, ctx);
    }

    let mut chars: Vec<char> = text.chars().collect();

    let mut suffix = Vec::new();
    while let Some(d) = chars.last().and_then(|c| SUBSCRIPT_DIGITS.iter().position(|s| s == c)) {
        suffix.push(d as u32);
        chars.pop();
    }
    let base = if suffix.is_empty() {
        default_base
    } else {
        // most significant digit was popped last
        suffix
            .iter()
            .rev()
            .try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(*d).filter(|b| *b <= MAX_BASE))
            .ok_or_else(err)?
    };
    if !(2..=MAX_BASE).contains(&base) {
        return Err(err());
    }

    let mut pos = 0;
    let mut negative = false;
    match chars.first() {
        Some('+') => pos = 1,
        Some(c) if is_minus(*c) => {
            negative = true;
            pos = 1;
        }
        _ => {}
    }

    let mut fraction = None;
    if let Some(i) = chars.last().and_then(|c| FRACTIONS.iter().position(|f| f.0 == *c)) {
        chars.pop();
        fraction = Some(FRACTIONS[i]);
    }

    let body: String = chars[pos.min(chars.len())..].iter().collect();
    let mut value = if body.is_empty() && fraction.is_some() {
        Rational::new()
    } else {
        parse_rational(&body, base).ok_or_else(err)?
    };
    if let Some((_, num, den)) = fraction {
        value += Rational::from((num, den));
    }
    if negative {
        value = -value;
    }
    Ok(ctx.from_rational(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx() -> Context {
        Context::new(256)
    }

    fn p(s: &str) -> MathResult {
        parse(s, 10, &ctx())
    }

    #[test]
    fn test_plain() {
        let c = ctx();
        assert_eq!(p("123"), Ok(c.integer(123)));
        assert_eq!(p("+7"), Ok(c.integer(7)));
        assert_eq!(p("-12.5"), Ok(c.float(-12.5)));
        assert_eq!(p("−3"), Ok(c.integer(-3)));
        assert_eq!(p("0.1"), c.fraction(1, 10));
        assert_eq!(p(".25"), Ok(c.float(0.25)));
    }

    #[test]
    fn test_errors() {
        assert!(p("").is_err());
        assert!(p("-").is_err());
        assert!(p("12a").is_err());
        assert!(p("1.2.3").is_err());
        assert!(p("1 2").is_err());
        assert_eq!(p("x"), Err(MathError::Parse("x".to_string())));
        assert!(p("12₁").is_err());
        assert!(p("12₃₇").is_err());
    }

    #[test]
    fn test_bases() {
        let c = ctx();
        assert_eq!(p("ff₁₆"), Ok(c.integer(255)));
        assert_eq!(p("FF₁₆"), Ok(c.integer(255)));
        assert_eq!(p("101₂"), Ok(c.integer(5)));
        assert_eq!(p("0.1₂"), Ok(c.float(0.5)));
        assert_eq!(parse("ff", 16, &c), Ok(c.integer(255)));
        assert_eq!(parse("17", 8, &c), Ok(c.integer(15)));
        assert!(parse("18", 8, &c).is_err());
        assert!(p("2₂").is_err());
        assert_eq!(p("11₀₂"), Ok(c.integer(3)));
    }

    #[test]
    fn test_long_base_suffix() {
        let text = "1₁₁₁₁₁₁₁₁₁₁₁";
        assert_eq!(p(text), Err(MathError::Parse(text.to_string())));
        assert!(p("1₄₂₉₄₉₆₇₂₉₈").is_err());
        assert!(p("1₁₇").is_err());
        assert!(p("1₁₀₀").is_err());
    }

    #[test]
    fn test_scripts() {
        let c = ctx();
        assert_eq!(p("١٢٣"), Ok(c.integer(123)));
        assert_eq!(p("۴۲"), Ok(c.integer(42)));
        assert_eq!(p("४२"), Ok(c.integer(42)));
        assert_eq!(p("๓.๕"), Ok(c.float(3.5)));
        assert_eq!(p("〡〇"), Ok(c.integer(10)));
        assert_eq!(p("\u{104A1}\u{104A0}"), Ok(c.integer(10)));
        assert_eq!(digit_value('٩', 10), Some(9));
        assert_eq!(digit_value('٩', 8), None);
        assert_eq!(digit_value('x', 16), None);
    }

    #[test]
    fn test_fractions() {
        let c = ctx();
        assert_eq!(p("1½"), Ok(c.float(1.5)));
        assert_eq!(p("¾"), Ok(c.float(0.75)));
        assert_eq!(p("-2¼"), Ok(c.float(-2.25)));
        assert_eq!(p("⅓"), c.fraction(1, 3));
    }

    #[test]
    fn test_sexagesimal() {
        let c = ctx();
        assert_eq!(p("12°30'36\""), c.fraction(1251, 100));
        assert_eq!(p("12°30′"), Ok(c.float(12.5)));
        assert_eq!(p("90°"), Ok(c.integer(90)));
        assert_eq!(p("-1°30'"), Ok(c.float(-0.5)));
        assert_eq!(p("-2°30'36\""), c.fraction(-149, 100));
        assert_eq!(p("0°0'4.5\""), c.fraction(1, 800));
        assert!(p("°").is_err());
        assert!(p("1°x'").is_err());
    }

    #[test]
    fn test_scripts_ints() {
        assert_eq!(superscript_to_i64("²"), Some(2));
        assert_eq!(superscript_to_i64("⁻¹"), Some(-1));
        assert_eq!(superscript_to_i64("¹⁰"), Some(10));
        assert_eq!(superscript_to_i64("⁻"), None);
        assert_eq!(superscript_to_i64("2"), None);
        assert_eq!(subscript_to_i64("₁₆"), Some(16));
        assert_eq!(subscript_to_i64(""), None);
    }

    proptest! {
        #[test]
        fn prop_integer_round_trip(n in any::<i64>(), base in 2u32..=16) {
            let c = ctx();
            let i = Integer::from(n);
            let text = i.to_string_radix(base as i32);
            prop_assert_eq!(parse(&text, base, &c), Ok(c.from_integer(&i)));
        }
    }
}
