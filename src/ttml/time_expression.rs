/*!
 * TTML time expression parsing.
 *
 * Supported forms:
 * - offset time: `<number>(h|m|s|ms|t)`, added to the caller's default offset
 * - clock time: `HH:MM:SS[.fraction]`, absolute from the document origin
 *
 * Frame based expressions (`f` unit, `HH:MM:SS:FF`) are rejected.
 */

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ConversionError;

static OFFSET_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(h|m|s|ms|f|t)$").unwrap()
});

static CLOCK_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2,}):([0-9]{2,}):([0-9]{2,}(?:\.[0-9]+)?)$").unwrap()
});

static CLOCK_TIME_FRAMES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2,}):([0-9]{2,}):([0-9]{2,}):([0-9]{2,}(?:\.[0-9]+)?)$").unwrap()
});

const MICROS_PER_SECOND: u128 = 1_000_000;
const MICROS_PER_MINUTE: u128 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: u128 = 60 * MICROS_PER_MINUTE;

// Digits past this point cannot change a microsecond result
const MAX_FRACTION_DIGITS: usize = 18;

/// Parser for `begin`, `end` and `dur` attribute values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeExpressionParser {
    tick_rate: Option<u32>,
}

impl TimeExpressionParser {
    /// Creates a parser for a document with the given tick rate
    pub fn new(tick_rate: Option<u32>) -> Self {
        Self { tick_rate }
    }

    /// Parse `expression` into an absolute offset from the document origin.
    ///
    /// Offset expressions are relative to `default_offset`; clock expressions ignore it.
    pub fn parse(&self, expression: &str, default_offset: Duration) -> Result<Duration, ConversionError> {
        if let Some(caps) = OFFSET_TIME_REGEX.captures(expression) {
            let value = DecimalValue::parse(&caps[1], expression)?;
            let offset = match &caps[2] {
                "h" => value.to_duration(MICROS_PER_HOUR, 1, expression)?,
                "m" => value.to_duration(MICROS_PER_MINUTE, 1, expression)?,
                "s" => value.to_duration(MICROS_PER_SECOND, 1, expression)?,
                "ms" => value.to_duration(1_000, 1, expression)?,
                "f" => return Err(ConversionError::UnsupportedTimeUnit(expression.to_string())),
                "t" => {
                    let tick_rate = self
                        .tick_rate
                        .ok_or_else(|| ConversionError::MissingTickRate(expression.to_string()))?;
                    value.to_duration(MICROS_PER_SECOND, u128::from(tick_rate), expression)?
                }
                _ => return Err(ConversionError::InvalidTimeExpression(expression.to_string())),
            };
            return default_offset
                .checked_add(offset)
                .ok_or_else(|| ConversionError::InvalidTimeExpression(expression.to_string()));
        }

        if let Some(caps) = CLOCK_TIME_REGEX.captures(expression) {
            let hours = DecimalValue::parse(&caps[1], expression)?.to_duration(MICROS_PER_HOUR, 1, expression)?;
            let minutes = DecimalValue::parse(&caps[2], expression)?.to_duration(MICROS_PER_MINUTE, 1, expression)?;
            let seconds = DecimalValue::parse(&caps[3], expression)?.to_duration(MICROS_PER_SECOND, 1, expression)?;
            return hours
                .checked_add(minutes)
                .and_then(|d| d.checked_add(seconds))
                .ok_or_else(|| ConversionError::InvalidTimeExpression(expression.to_string()));
        }

        if CLOCK_TIME_FRAMES_REGEX.is_match(expression) {
            return Err(ConversionError::UnsupportedTimeUnit(expression.to_string()));
        }

        Err(ConversionError::InvalidTimeExpression(expression.to_string()))
    }
}

/// Unsigned decimal kept as `mantissa / 10^scale` so no precision is lost to floats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DecimalValue {
    mantissa: u128,
    scale: u32,
}

impl DecimalValue {
    fn parse(text: &str, expression: &str) -> Result<Self, ConversionError> {
        let invalid = || ConversionError::InvalidTimeExpression(expression.to_string());

        let (integer, fraction) = text.split_once('.').unwrap_or((text, ""));
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];

        let mut mantissa: u128 = 0;
        for digit in integer.bytes().chain(fraction.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                .ok_or_else(invalid)?;
        }

        Ok(Self {
            mantissa,
            scale: fraction.len() as u32,
        })
    }

    // Converts `self * unit_micros / divisor` to a duration, rounding half to even at
    // microsecond resolution
    fn to_duration(self, unit_micros: u128, divisor: u128, expression: &str) -> Result<Duration, ConversionError> {
        let invalid = || ConversionError::InvalidTimeExpression(expression.to_string());

        let numerator = self.mantissa.checked_mul(unit_micros).ok_or_else(invalid)?;
        let denominator = 10u128
            .pow(self.scale)
            .checked_mul(divisor)
            .ok_or_else(invalid)?;

        let quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let micros = match (remainder * 2).cmp(&denominator) {
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
            _ => quotient,
        };

        let micros = u64::try_from(micros).map_err(|_| invalid())?;
        Ok(Duration::from_micros(micros))
    }
}
