use std::time::Duration;

use url::Url;

use super::types::PositiveUsize;
use crate::error::ValidationError;

/// Separator between a header name and its value.
const HEADER_SEPARATOR: &str = ": ";
/// Nanoseconds per duration unit.
const NANOS_PER_NS: u128 = 1;
const NANOS_PER_US: u128 = 1_000;
const NANOS_PER_MS: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60_000_000_000;
const NANOS_PER_HOUR: u128 = 3_600_000_000_000;
/// Decimal base used when scaling fractional duration digits.
const DECIMAL_BASE: u128 = 10;

/// Parses a `Name: Value` header. The input must split on `": "` into exactly
/// two parts.
pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    let parts: Vec<&str> = s.split(HEADER_SEPARATOR).collect();
    let [name, value] = parts.as_slice() else {
        return Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        });
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::HeaderNameEmpty {
            value: s.to_owned(),
        });
    }
    Ok((name.to_owned(), (*value).to_owned()))
}

pub(crate) fn parse_url(s: &str) -> Result<Url, ValidationError> {
    let value = s.trim();
    let url = Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        value: value.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::UrlMissingHost {
            value: value.to_owned(),
        });
    }
    Ok(url)
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

/// Parses a duration made of one or more `<number><unit>` components, for
/// example `30s`, `2m`, `1m30s` or `1.5s`.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut rest = value;
    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|ch: char| !is_number_char(ch))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail.find(is_number_char).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(ValidationError::MissingDurationUnit {
                value: value.to_owned(),
            });
        }
        let component = component_nanos(number, unit, value)?;
        total_nanos = total_nanos
            .checked_add(component)
            .ok_or(ValidationError::DurationOverflow)?;
        rest = next;
    }

    let nanos = u64::try_from(total_nanos).map_err(|_err| ValidationError::DurationOverflow)?;
    if nanos == 0 {
        return Err(ValidationError::DurationZero);
    }
    Ok(Duration::from_nanos(nanos))
}

const fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.'
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOS_PER_NS),
        "us" | "µs" | "μs" => Some(NANOS_PER_US),
        "ms" => Some(NANOS_PER_MS),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

fn component_nanos(number: &str, unit: &str, input: &str) -> Result<u128, ValidationError> {
    let per_unit = unit_nanos(unit).ok_or_else(|| ValidationError::InvalidDurationUnit {
        unit: unit.to_owned(),
    })?;
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return Err(ValidationError::InvalidDurationFormat {
            value: input.to_owned(),
        });
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|err| ValidationError::InvalidDurationNumber {
                value: input.to_owned(),
                source: err,
            })?
    };
    let mut nanos = whole_value
        .checked_mul(per_unit)
        .ok_or(ValidationError::DurationOverflow)?;

    // Digits beyond nanosecond resolution are dropped.
    let mut scale = per_unit;
    for digit in fraction.chars().filter_map(|ch| ch.to_digit(10)) {
        scale = scale.checked_div(DECIMAL_BASE).unwrap_or(0);
        if scale == 0 {
            break;
        }
        nanos = nanos
            .checked_add(u128::from(digit).saturating_mul(scale))
            .ok_or(ValidationError::DurationOverflow)?;
    }
    Ok(nanos)
}
