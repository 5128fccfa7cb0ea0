// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero_seconds     = { 0,      "0s" },
    max_seconds      = { 59,     "59s" },
    one_minute       = { 60,     "1m" },
    max_minutes      = { 3599,   "59m" },
    one_hour         = { 3600,   "1h" },
    hour_and_minutes = { 3660,   "1h1m" },
    almost_a_day     = { 86399,  "23h59m" },
    two_days         = { 172800, "2d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[yare::parameterized(
    seconds      = { "30s",   30 },
    minutes      = { "10m",   600 },
    hours        = { "2h",    7200 },
    days         = { "1d",    86400 },
    compound     = { "1h30m", 5400 },
    padded       = { " 5m ",  300 },
)]
fn parses(input: &str, secs: u64) {
    assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(secs));
}

#[yare::parameterized(
    empty        = { "" },
    bare_number  = { "10" },
    unknown_unit = { "10w" },
    unit_only    = { "m" },
    trailing     = { "1h30" },
    negative     = { "-5m" },
)]
fn rejects(input: &str) {
    let err = parse_duration(input).unwrap_err();
    assert_eq!(err.input, input);
}
