//! Utility functions for ids and money formatting

use bech32::Bech32m;
use std::borrow::Borrow;
use uuid7::uuid7;

// construct a unique client-side id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Formats an amount as rupees with Indian digit grouping, e.g. `₹12,34,567.50`.
pub fn format_inr<T: Borrow<f64>>(amount: T) -> String {
    let amount = *amount.borrow();
    let paise = (amount.abs() * 100.0).round() as u64;
    let digits = (paise / 100).to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (h, t) = rest.split_at(rest.len() - 2);
            groups.push(t);
            rest = h;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    format!("{sign}₹{grouped}.{:02}", paise % 100)
}

/// Amount in whole paise. Budget checks compare in paise so that every check
/// agrees on where the limit is.
pub fn to_paise(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Parses a user-typed amount; blank or non-numeric text counts as zero.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
