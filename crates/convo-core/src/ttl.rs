// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ISO-8601 duration parsing for time-to-live declarations.
//!
//! Accepts the `PnDTnHnMnS` subset (weeks via `nW` as well), with an
//! optional fractional part on seconds: `PT30M`, `PT1S`, `PT0.5S`, `P1DT2H`.
//! Years and months are rejected because their length is calendar-dependent.

use std::time::Duration;

/// Parse an ISO-8601 duration string into a [`Duration`].
pub fn parse_iso8601_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim().to_ascii_uppercase();
    let rest = text
        .strip_prefix('P')
        .ok_or_else(|| "duration must start with `P`".to_string())?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err("`T` must be followed by at least one time component".into());
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    if date_part.is_empty() && time_part.is_none() {
        return Err("duration has no components".into());
    }

    let mut total = Duration::ZERO;
    for (value, unit) in components(date_part)? {
        let secs_per_unit = match unit {
            'W' => 7 * 86_400,
            'D' => 86_400,
            'Y' | 'M' => {
                return Err("years and months are not supported in a time-to-live".into());
            }
            other => return Err(format!("unknown date unit `{other}`")),
        };
        total = add(total, whole_units(&value, unit, secs_per_unit)?, input)?;
    }

    if let Some(time) = time_part {
        for (value, unit) in components(time)? {
            let part = match unit {
                'H' => whole_units(&value, unit, 3_600)?,
                'M' => whole_units(&value, unit, 60)?,
                'S' => {
                    let secs: f64 = value
                        .parse()
                        .map_err(|_| format!("invalid seconds value `{value}`"))?;
                    Duration::try_from_secs_f64(secs)
                        .map_err(|_| format!("seconds value `{value}` is out of range"))?
                }
                other => return Err(format!("unknown time unit `{other}`")),
            };
            total = add(total, part, input)?;
        }
    }

    Ok(total)
}

fn add(total: Duration, part: Duration, input: &str) -> Result<Duration, String> {
    total
        .checked_add(part)
        .ok_or_else(|| format!("duration `{input}` is out of range"))
}

/// Split `12H30M` into `[("12", 'H'), ("30", 'M')]`.
fn components(part: &str) -> Result<Vec<(String, char)>, String> {
    let mut out = Vec::new();
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
        } else if c.is_ascii_alphabetic() {
            if number.is_empty() {
                return Err(format!("unit `{c}` has no value"));
            }
            out.push((std::mem::take(&mut number), c));
        } else {
            return Err(format!("unexpected character `{c}`"));
        }
    }
    if !number.is_empty() {
        return Err(format!("value `{number}` has no unit"));
    }
    Ok(out)
}

fn whole_units(value: &str, unit: char, secs_per_unit: u64) -> Result<Duration, String> {
    let count: u64 = value
        .parse()
        .map_err(|_| format!("`{value}{unit}` must be a whole number"))?;
    count
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("`{value}{unit}` is out of range"))
}
