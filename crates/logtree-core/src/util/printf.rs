//! printf-style message substitution.
//!
//! Supported directives:
//!
//! | directive | renders |
//! |---|---|
//! | `%s` | strings verbatim, everything else as compact JSON |
//! | `%d` | the argument as a number (`NaN` when it is not numeric) |
//! | `%i` | the argument truncated to an integer |
//! | `%f` | the argument as a floating point number |
//! | `%j`, `%o`, `%O` | compact JSON |
//! | `%c` | consumes an argument, renders nothing |
//! | `%%` | a literal `%` |
//!
//! A directive with no argument left stays in the output untouched, and
//! arguments without a directive are appended separated by spaces.

use serde_json::Value;

/// Substitute `args` into `template`.
///
/// With no arguments the template is returned verbatim, `%%` included.
pub fn format(template: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut remaining = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let directive = match chars.peek() {
            Some(&d) => d,
            None => {
                out.push('%');
                break;
            }
        };

        match directive {
            '%' => {
                chars.next();
                out.push('%');
            }
            's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c' => {
                chars.next();
                match remaining.next() {
                    Some(arg) => out.push_str(&render(directive, arg)),
                    None => {
                        out.push('%');
                        out.push(directive);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    for arg in remaining {
        out.push(' ');
        out.push_str(&as_string(arg));
    }

    out
}

fn render(directive: char, arg: &Value) -> String {
    match directive {
        's' => as_string(arg),
        'd' => as_number(arg).map(fmt_number).unwrap_or_else(|| "NaN".to_string()),
        'i' => as_number(arg)
            .filter(|n| n.is_finite())
            .map(|n| fmt_number(n.trunc()))
            .unwrap_or_else(|| "NaN".to_string()),
        'f' => match arg {
            Value::String(s) => leading_float(s)
                .map(fmt_number)
                .unwrap_or_else(|| "NaN".to_string()),
            _ => as_number(arg).map(fmt_number).unwrap_or_else(|| "NaN".to_string()),
        },
        'c' => String::new(),
        _ => arg.to_string(),
    }
}

fn as_string(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// Longest numeric prefix, the way lenient float parsing reads "3.5kg".
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let whole = digits(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole == 0 && fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn fmt_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
