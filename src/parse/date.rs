use crate::errors::ParseError;

/// A timestamp as recorded in the registry (`date` column of a uenv
/// record). Fractional seconds and timezone suffixes are accepted but not
/// retained — every caller in this crate only ever compares whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UenvDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

fn is_leap_year(y: u32) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn days_in_month(y: u32, m: u32) -> u32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(y) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn parse_u32(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `YYYY '-' M '-' D [ (' '|'T') HH ':' MM ':' SS [fractional] [tz] ]`
pub fn parse_uenv_date(input: &str) -> Result<UenvDate, ParseError> {
    let err = || ParseError::new(0, format!("'{}' is not a valid date", input));

    let (date_part, time_part) = match input.find(|c| c == ' ' || c == 'T') {
        Some(idx) => (&input[..idx], Some(&input[idx + 1..])),
        None => (input, None),
    };

    let mut fields = date_part.split('-');
    let year = parse_u32(fields.next().ok_or_else(err)?).ok_or_else(err)?;
    let month = parse_u32(fields.next().ok_or_else(err)?).ok_or_else(err)?;
    let day = parse_u32(fields.next().ok_or_else(err)?).ok_or_else(err)?;
    if fields.next().is_some() {
        return Err(err());
    }

    if !(1..=12).contains(&month) {
        return Err(err());
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(err());
    }

    let (hour, minute, second) = match time_part {
        None => (0, 0, 0),
        Some(t) => {
            let bytes = t.as_bytes();
            if bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
                return Err(err());
            }
            let hour = parse_u32(&t[0..2]).ok_or_else(err)?;
            let minute = parse_u32(&t[3..5]).ok_or_else(err)?;
            let second = parse_u32(&t[6..8]).ok_or_else(err)?;
            if hour > 23 || minute > 59 || second > 60 {
                return Err(err());
            }
            (hour, minute, second)
        }
    };

    Ok(UenvDate {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only() {
        let r = parse_uenv_date("2024-12-3").unwrap();
        assert_eq!((r.year, r.month, r.day), (2024, 12, 3));

        let r = parse_uenv_date("2024-12-03").unwrap();
        assert_eq!((r.year, r.month, r.day), (2024, 12, 3));
    }

    #[test]
    fn leap_year_day() {
        let r = parse_uenv_date("2024-2-29").unwrap();
        assert_eq!((r.year, r.month, r.day), (2024, 2, 29));
    }

    #[test]
    fn time_with_fraction_and_offset_matches_plain_time() {
        let a = parse_uenv_date("2024-03-11 17:08:35.976000+00:00").unwrap();
        assert_eq!((a.year, a.month, a.day, a.hour, a.minute, a.second), (2024, 3, 11, 17, 8, 35));
        let b = parse_uenv_date("2024-03-11 17:08:35").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn t_separator_and_zulu() {
        let r = parse_uenv_date("2024-10-15T11:46:22.533Z").unwrap();
        assert_eq!((r.year, r.month, r.day, r.hour, r.minute, r.second), (2024, 10, 15, 11, 46, 22));
    }

    #[test]
    fn invalid_dates_are_rejected() {
        for s in ["2024-0-3", "2024-13-3", "2023-2-29", "2024-1a-3"] {
            assert!(parse_uenv_date(s).is_err(), "expected '{}' to fail", s);
        }
    }
}
