// src/window.rs

use crate::error::{Error, Result};
use crate::model::ResultRecord;
use chrono::{Duration, NaiveDateTime};

/// Format of `event_timestamp` in build details, naive local time
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Evaluates a term such as `24*2` or `24 * 7 + 12` to a number of hours.
///
/// Only integers joined by `+`, `-` and `*` are accepted, with the usual
/// precedence. Anything else is rejected rather than evaluated.
pub fn parse_term(expr: &str) -> Result<i64> {
    let fail = |reason: &str| Error::Term {
        expr: expr.to_string(),
        reason: reason.to_string(),
    };

    let tokens = tokenize(expr).map_err(|r| fail(&r))?;
    let mut tokens = tokens.into_iter().peekable();

    // sum of products
    let mut total: i64 = 0;
    let mut sign = Token::Plus;
    loop {
        let mut product = match tokens.next() {
            Some(Token::Int(n)) => n,
            Some(_) => return Err(fail("expected a number")),
            None => return Err(fail("expected a number")),
        };
        while tokens.peek() == Some(&Token::Star) {
            tokens.next();
            let Some(Token::Int(n)) = tokens.next() else {
                return Err(fail("expected a number after '*'"));
            };
            product = product.checked_mul(n).ok_or_else(|| fail("overflow"))?;
        }
        total = match sign {
            Token::Minus => total.checked_sub(product),
            _ => total.checked_add(product),
        }
        .ok_or_else(|| fail("overflow"))?;

        match tokens.next() {
            None => return Ok(total),
            Some(op @ (Token::Plus | Token::Minus)) => sign = op,
            Some(_) => return Err(fail("expected an operator")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Int(i64),
    Plus,
    Minus,
    Star,
}

fn tokenize(expr: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_ascii_whitespace() => {}
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            c if c.is_ascii_digit() => {
                let mut end = start + 1;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                let n = expr[start..end]
                    .parse()
                    .map_err(|_| format!("number too large: {}", &expr[start..end]))?;
                tokens.push(Token::Int(n));
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(tokens)
}

/// Keeps records whose build event is strictly newer than `now - hours`
pub fn within(records: Vec<ResultRecord>, hours: i64, now: NaiveDateTime) -> Result<Vec<ResultRecord>> {
    let cutoff = Duration::try_hours(hours)
        .and_then(|d| now.checked_sub_signed(d))
        .ok_or_else(|| Error::Term {
            expr: hours.to_string(),
            reason: "window out of range".to_string(),
        })?;
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if event_time(&record)? > cutoff {
            kept.push(record);
        }
    }
    Ok(kept)
}

pub fn event_time(record: &ResultRecord) -> Result<NaiveDateTime> {
    let value = record.detail_str("event_timestamp")?;
    NaiveDateTime::parse_from_str(value, EVENT_TIMESTAMP_FORMAT).map_err(|source| Error::Timestamp {
        url: record.url.clone(),
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::enriched;
    use serde_json::json;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, EVENT_TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn term_arithmetic() {
        assert_eq!(parse_term("24").unwrap(), 24);
        assert_eq!(parse_term("24*2").unwrap(), 48);
        assert_eq!(parse_term(" 24 * 7 + 12 ").unwrap(), 180);
        assert_eq!(parse_term("2+3*4-1").unwrap(), 13);
        assert_eq!(parse_term("1-2-3").unwrap(), -4);
    }

    #[test]
    fn term_rejects_anything_else() {
        for bad in ["", "24/2", "__import__('os')", "2**3", "3 4", "(1+2)", "-1", "1+", "99999999999999999999"] {
            assert!(
                matches!(parse_term(bad), Err(Error::Term { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn term_overflow_is_rejected() {
        assert!(parse_term("9223372036854775807*2").is_err());
    }

    #[test]
    fn window_is_strictly_after_cutoff() {
        let now = at("2024-01-10T12:00:00");
        let records = vec![
            enriched("old", "a", json!("1"), "2024-01-08T11:59:59"),
            enriched("edge", "b", json!("1"), "2024-01-08T12:00:00"),
            enriched("new", "c", json!("1"), "2024-01-10T11:00:00"),
        ];
        let kept = within(records, 48, now).unwrap();
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new"]);
    }

    #[test]
    fn widening_never_drops_records() {
        let now = at("2024-01-10T12:00:00");
        let records: Vec<_> = ["2024-01-01T00:00:00", "2024-01-09T00:00:00", "2024-01-10T10:00:00"]
            .iter()
            .enumerate()
            .map(|(i, t)| enriched(&format!("job{i}"), &i.to_string(), json!("1"), t))
            .collect();
        let mut previous = 0;
        for hours in [1, 24, 48, 24 * 30] {
            let kept = within(records.clone(), hours, now).unwrap();
            assert!(kept.len() >= previous);
            previous = kept.len();
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let records = vec![enriched("x", "a", json!("1"), "yesterday")];
        let err = within(records, 1, at("2024-01-10T12:00:00")).unwrap_err();
        assert!(matches!(err, Error::Timestamp { .. }));
    }
}
