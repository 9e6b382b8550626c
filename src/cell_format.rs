//! Display text for numeric spreadsheet cells.
//!
//! A workbook stores numbers as raw doubles plus a style index; what a user
//! sees depends on the number format attached to that style. This module
//! resolves style → format code and renders a value through the code.
//!
//! Supported format families:
//!
//! | Family      | Examples                         |
//! |-------------|----------------------------------|
//! | General     | `General`, `@`                   |
//! | Fixed/grouped | `0`, `0.00`, `#,##0.00 "руб"`  |
//! | Percent     | `0%`, `0.00%`                    |
//! | Scientific  | `0.00E+00`                       |
//! | Date/time   | `m/d/yy`, `dd.mm.yyyy`, `h:mm AM/PM`, `[h]:mm:ss` |
//!
//! Conditions and colours (`[Red]`, `[>100]`) and locale tags (`[$-419]`)
//! are ignored. Fractions (`# ?/?`) render as General.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Built-in number format codes by id.
fn builtin_format(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// Number formats of one workbook: custom codes plus the cell style table.
#[derive(Debug, Default, Clone)]
pub struct NumberFormats {
    custom: HashMap<u32, String>,
    cell_styles: Vec<u32>,
    date1904: bool,
}

impl NumberFormats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_custom(&mut self, id: u32, code: impl Into<String>) {
        self.custom.insert(id, code.into());
    }

    /// Appends the next entry of the cell style table (`cellXfs`).
    pub fn push_cell_style(&mut self, num_fmt_id: u32) {
        self.cell_styles.push(num_fmt_id);
    }

    pub fn set_date1904(&mut self, date1904: bool) {
        self.date1904 = date1904;
    }

    /// Format code for a cell style index. Unknown styles are General.
    pub fn code_for_style(&self, style: usize) -> &str {
        let id = self.cell_styles.get(style).copied().unwrap_or(0);
        self.custom
            .get(&id)
            .map(String::as_str)
            .or_else(|| builtin_format(id))
            .unwrap_or("General")
    }

    /// Renders a numeric cell value as shown to a user.
    pub fn display(&self, value: f64, style: usize) -> String {
        format_number(value, self.code_for_style(style), self.date1904)
    }
}

/// Renders `value` through the format `code`.
pub fn format_number(value: f64, code: &str, date1904: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sections = split_sections(code);
    let (section, value, explicit_sign) = if value < 0.0 && sections.len() >= 2 {
        (sections[1].as_str(), -value, true)
    } else if value == 0.0 && sections.len() >= 3 {
        (sections[2].as_str(), value, false)
    } else {
        (sections[0].as_str(), value, false)
    };
    let section = strip_brackets(section);
    let trimmed = section.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("general") || trimmed == "@" {
        return general(value);
    }
    if is_date_code(&section) {
        if let Some(dt) = serial_to_datetime(value, date1904) {
            return format_datetime(value, dt, &section);
        }
        return general(value);
    }
    if section.contains('?') && section.contains('/') {
        return general(value);
    }
    let out = if unquoted(&section).to_ascii_lowercase().contains("general") {
        general_with_literals(value.abs(), &section)
    } else {
        format_numeric(value.abs(), &section)
    };
    if value < 0.0 && !explicit_sign {
        format!("-{}", out)
    } else {
        out
    }
}

/// Excel "General" rendering, up to ten significant digits.
pub fn general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    if !(1e-9..1e11).contains(&abs) {
        return scientific(value, 5, 2);
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let magnitude = abs.log10().floor() as i32;
    let decimals = (9 - magnitude).clamp(0, 15) as usize;
    trim_decimal_zeros(format!("{:.*}", decimals, value))
}

fn trim_decimal_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn scientific(value: f64, max_decimals: usize, exp_digits: usize) -> String {
    let formatted = format!("{:.*e}", max_decimals, value);
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let mantissa = trim_decimal_zeros(mantissa.to_string());
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}E{}{:0width$}", mantissa, sign, exp.abs(), width = exp_digits)
}

/// Splits a format code on unquoted `;`.
fn split_sections(code: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    let mut in_quotes = false;
    let mut escaped = false;
    for ch in code.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == ';' && !in_quotes {
            sections.push(String::new());
            continue;
        }
        if let Some(last) = sections.last_mut() {
            last.push(ch);
        }
    }
    sections
}

/// Drops `[...]` groups except elapsed-time markers like `[h]`.
fn strip_brackets(section: &str) -> String {
    let mut out = String::new();
    let mut chars = section.chars().peekable();
    let mut in_quotes = false;
    while let Some(ch) = chars.next() {
        if ch == '"' {
            in_quotes = !in_quotes;
            out.push(ch);
            continue;
        }
        if ch == '[' && !in_quotes {
            let mut inner = String::new();
            for c in chars.by_ref() {
                if c == ']' {
                    break;
                }
                inner.push(c);
            }
            let lower = inner.to_ascii_lowercase();
            if !lower.is_empty() && lower.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                out.push('[');
                out.push_str(&lower);
                out.push(']');
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Format code with quoted literals and escapes removed.
fn unquoted(section: &str) -> String {
    let mut out = String::new();
    let mut in_quotes = false;
    let mut chars = section.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '\\' | '_' | '*' if !in_quotes => {
                chars.next();
            }
            _ if !in_quotes => out.push(ch),
            _ => {}
        }
    }
    out
}

/// True for codes containing date or time tokens.
pub fn is_date_code(section: &str) -> bool {
    let plain = unquoted(section).to_ascii_lowercase();
    plain
        .chars()
        .any(|c| matches!(c, 'y' | 'm' | 'd' | 'h' | 's'))
}

/// Largest serial with a calendar date (9999-12-31).
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !(0.0..MAX_DATE_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let base = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 61.0 {
        // Serial 60 is the nonexistent 1900-02-29.
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let days = serial.floor();
    let millis = ((serial - days) * 86_400_000.0).round() as i64;
    base.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::milliseconds(millis))
}

#[derive(Debug, Clone, PartialEq)]
enum DateToken {
    Year(usize),
    Month(usize),
    Minute(usize),
    Day(usize),
    Hour(usize),
    Second(usize),
    SubSecond(usize),
    ElapsedHours,
    ElapsedMinutes,
    ElapsedSeconds,
    AmPm { short: bool, upper: bool },
    Literal(String),
}

fn tokenize_date(section: &str) -> Vec<DateToken> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let run = |i: usize, target: char| {
        chars[i..]
            .iter()
            .take_while(|c| c.to_ascii_lowercase() == target)
            .count()
    };
    while i < chars.len() {
        let c = chars[i];
        let lower = c.to_ascii_lowercase();
        match lower {
            '"' => {
                let lit: String = chars[i + 1..].iter().take_while(|&&c| c != '"').collect();
                i += lit.chars().count() + 2;
                tokens.push(DateToken::Literal(lit));
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    tokens.push(DateToken::Literal(next.to_string()));
                }
                i += 2;
            }
            '_' => {
                tokens.push(DateToken::Literal(" ".to_string()));
                i += 2;
            }
            '*' => i += 2,
            '[' => {
                let inner: String = chars[i + 1..].iter().take_while(|&&c| c != ']').collect();
                i += inner.chars().count() + 2;
                match inner.chars().next() {
                    Some('h') => tokens.push(DateToken::ElapsedHours),
                    Some('m') => tokens.push(DateToken::ElapsedMinutes),
                    Some('s') => tokens.push(DateToken::ElapsedSeconds),
                    _ => {}
                }
            }
            'a' => {
                let rest: String = chars[i..].iter().collect();
                let upper = c.is_ascii_uppercase();
                if rest.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("am/pm")) {
                    tokens.push(DateToken::AmPm { short: false, upper });
                    i += 5;
                } else if rest.get(..3).is_some_and(|s| s.eq_ignore_ascii_case("a/p")) {
                    tokens.push(DateToken::AmPm { short: true, upper });
                    i += 3;
                } else {
                    tokens.push(DateToken::Literal(c.to_string()));
                    i += 1;
                }
            }
            'y' | 'e' => {
                let n = run(i, lower);
                tokens.push(DateToken::Year(n));
                i += n;
            }
            'm' => {
                let n = run(i, 'm');
                tokens.push(DateToken::Month(n));
                i += n;
            }
            'd' => {
                let n = run(i, 'd');
                tokens.push(DateToken::Day(n));
                i += n;
            }
            'h' => {
                let n = run(i, 'h');
                tokens.push(DateToken::Hour(n));
                i += n;
            }
            's' => {
                let n = run(i, 's');
                tokens.push(DateToken::Second(n));
                i += n;
            }
            '0' if matches!(tokens.last(), Some(DateToken::Literal(l)) if l == ".")
                && tokens
                    .iter()
                    .rev()
                    .nth(1)
                    .is_some_and(|t| matches!(t, DateToken::Second(_))) =>
            {
                let n = run(i, '0');
                tokens.push(DateToken::SubSecond(n));
                i += n;
            }
            _ => {
                tokens.push(DateToken::Literal(c.to_string()));
                i += 1;
            }
        }
    }

    // `m`/`mm` next to hours or seconds means minutes.
    let is_field = |t: &DateToken| !matches!(t, DateToken::Literal(_));
    for idx in 0..tokens.len() {
        if let DateToken::Month(n) = tokens[idx] {
            if n > 2 {
                continue;
            }
            let prev = tokens[..idx].iter().rev().find(|t| is_field(t));
            let next = tokens[idx + 1..].iter().find(|t| is_field(t));
            let after_hour = matches!(prev, Some(DateToken::Hour(_)) | Some(DateToken::ElapsedHours));
            let before_second = matches!(next, Some(DateToken::Second(_)) | Some(DateToken::ElapsedSeconds));
            if after_hour || before_second {
                tokens[idx] = DateToken::Minute(n);
            }
        }
    }
    tokens
}

fn format_datetime(serial: f64, dt: NaiveDateTime, section: &str) -> String {
    let tokens = tokenize_date(section);
    let twelve_hour = tokens.iter().any(|t| matches!(t, DateToken::AmPm { .. }));
    let has_subsecond = tokens.iter().any(|t| matches!(t, DateToken::SubSecond(_)));
    // Without a sub-second field, round to the nearest whole second.
    let dt = if has_subsecond {
        dt
    } else {
        let rounded = dt + Duration::milliseconds(500);
        rounded.with_nanosecond(0).unwrap_or(rounded)
    };

    let mut out = String::new();
    for token in &tokens {
        match token {
            DateToken::Year(n) if *n <= 2 => out.push_str(&format!("{:02}", dt.year() % 100)),
            DateToken::Year(_) => out.push_str(&format!("{:04}", dt.year())),
            DateToken::Month(1) => out.push_str(&dt.month().to_string()),
            DateToken::Month(2) => out.push_str(&format!("{:02}", dt.month())),
            DateToken::Month(3) => out.push_str(&dt.format("%b").to_string()),
            DateToken::Month(5) => out.push_str(&dt.format("%B").to_string()[..1]),
            DateToken::Month(_) => out.push_str(&dt.format("%B").to_string()),
            DateToken::Minute(1) => out.push_str(&dt.minute().to_string()),
            DateToken::Minute(_) => out.push_str(&format!("{:02}", dt.minute())),
            DateToken::Day(1) => out.push_str(&dt.day().to_string()),
            DateToken::Day(2) => out.push_str(&format!("{:02}", dt.day())),
            DateToken::Day(3) => out.push_str(&dt.format("%a").to_string()),
            DateToken::Day(_) => out.push_str(&dt.format("%A").to_string()),
            DateToken::Hour(n) => {
                let hour = if twelve_hour {
                    match dt.hour() % 12 {
                        0 => 12,
                        h => h,
                    }
                } else {
                    dt.hour()
                };
                if *n >= 2 {
                    out.push_str(&format!("{:02}", hour));
                } else {
                    out.push_str(&hour.to_string());
                }
            }
            DateToken::Second(1) => out.push_str(&dt.second().to_string()),
            DateToken::Second(_) => out.push_str(&format!("{:02}", dt.second())),
            DateToken::SubSecond(n) => {
                let millis = dt.nanosecond() / 1_000_000;
                let digits = format!("{:03}", millis);
                out.push_str(&digits[..(*n).min(3)]);
            }
            DateToken::ElapsedHours => {
                out.push_str(&((serial * 24.0).floor() as i64).to_string())
            }
            DateToken::ElapsedMinutes => {
                out.push_str(&((serial * 1440.0).floor() as i64).to_string())
            }
            DateToken::ElapsedSeconds => {
                out.push_str(&((serial * 86_400.0).round() as i64).to_string())
            }
            DateToken::AmPm { short, upper } => {
                let pm = dt.hour() >= 12;
                let marker = match (short, pm) {
                    (false, false) => "AM",
                    (false, true) => "PM",
                    (true, false) => "A",
                    (true, true) => "P",
                };
                if *upper {
                    out.push_str(marker);
                } else {
                    out.push_str(&marker.to_ascii_lowercase());
                }
            }
            DateToken::Literal(s) => out.push_str(s),
        }
    }
    out
}

/// Renders a section such as `General "pcs"`: the `General` token becomes
/// [`general`] output, everything else is copied as literal text.
fn general_with_literals(value: f64, section: &str) -> String {
    let chars: Vec<char> = section.chars().collect();
    let mut out = String::new();
    let mut in_quotes = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => out.push(ch),
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    out.push(*next);
                }
                i += 1;
            }
            '_' => {
                out.push(' ');
                i += 1;
            }
            '*' => i += 1,
            'g' | 'G'
                if chars.len() - i >= 7
                    && chars[i..i + 7]
                        .iter()
                        .collect::<String>()
                        .eq_ignore_ascii_case("general") =>
            {
                out.push_str(&general(value));
                i += 6;
            }
            _ => out.push(ch),
        }
        i += 1;
    }
    out
}

/// Renders fixed, grouped, percent, and scientific patterns.
fn format_numeric(value: f64, section: &str) -> String {
    // Split the pattern into literal prefix, placeholder core, literal suffix.
    let mut prefix = String::new();
    let mut core = String::new();
    let mut suffix = String::new();
    let mut in_quotes = false;
    let mut seen_core = false;
    let mut chars = section.chars().peekable();
    while let Some(ch) = chars.next() {
        let target = if seen_core { &mut suffix } else { &mut prefix };
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => target.push(ch),
            '\\' => {
                if let Some(next) = chars.next() {
                    target.push(next);
                }
            }
            '_' => {
                chars.next();
                target.push(' ');
            }
            '*' => {
                chars.next();
            }
            '0' | '#' | '?' | '.' | ',' => {
                if !suffix.is_empty() {
                    // Placeholders after a literal belong to the suffix; rare.
                    suffix.push(ch);
                } else {
                    seen_core = true;
                    core.push(ch);
                }
            }
            'E' | 'e' if seen_core && matches!(chars.peek(), Some('+') | Some('-')) => {
                core.push('E');
                if let Some(sign) = chars.next() {
                    core.push(sign);
                }
                while let Some(&d) = chars.peek() {
                    if d == '0' || d == '#' {
                        core.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            _ => target.push(ch),
        }
    }

    let percent = prefix.contains('%') || suffix.contains('%');
    let value = if percent { value * 100.0 } else { value };

    if let Some(pos) = core.find('E') {
        let mantissa = &core[..pos];
        let exp_digits = core[pos + 2..].len().max(1);
        let decimals = mantissa
            .split_once('.')
            .map(|(_, d)| d.chars().filter(|c| matches!(c, '0' | '#')).count())
            .unwrap_or(0);
        let formatted = format!("{:.*e}", decimals, value);
        let (m, e) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
        let e: i32 = e.parse().unwrap_or(0);
        let sign = if e < 0 { '-' } else { '+' };
        return format!(
            "{}{}E{}{:0width$}{}",
            prefix,
            m,
            sign,
            e.abs(),
            suffix,
            width = exp_digits
        );
    }

    let (int_pattern, frac_pattern) = match core.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (core.clone(), String::new()),
    };
    // Trailing commas scale by thousands.
    let scale_commas = int_pattern.len() - int_pattern.trim_end_matches(',').len();
    let int_pattern = int_pattern.trim_end_matches(',');
    let value = value / 1000f64.powi(scale_commas as i32);
    let grouping = int_pattern.contains(',');
    let min_int = int_pattern.chars().filter(|c| *c == '0').count();
    let required_frac = frac_pattern.chars().filter(|c| *c == '0').count();
    let max_frac = frac_pattern
        .chars()
        .filter(|c| matches!(c, '0' | '#' | '?'))
        .count();

    // Half away from zero, as spreadsheets round.
    let factor = 10f64.powi(max_frac as i32);
    let value = (value * factor).round() / factor;
    let rounded = format!("{:.*}", max_frac, value);
    let (int_digits, frac_digits) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded.clone(), String::new()),
    };
    let mut frac_digits = frac_digits;
    while frac_digits.len() > required_frac && frac_digits.ends_with('0') {
        frac_digits.pop();
    }

    let mut int_digits = int_digits.trim_start_matches('0').to_string();
    while int_digits.len() < min_int {
        int_digits.insert(0, '0');
    }
    if grouping {
        int_digits = group_thousands(&int_digits);
    }

    let mut out = prefix;
    out.push_str(&int_digits);
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(&frac_digits);
    }
    out.push_str(&suffix);
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::new();
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
