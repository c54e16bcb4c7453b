//! Message resolution for templated log calls.
//!
//! A log call carries a template and zero or more trailing operands. When the
//! template is text with an active `%` placeholder it is used as a printf-style
//! format string. Otherwise one generic `%v` placeholder per operand is
//! appended before formatting, so `("user logged in", [42])` renders as
//! `user logged in 42`.
//!
//! A template containing an escaped `%%` anywhere counts as having no active
//! placeholder, even when it also contains a real one. Callers mixing both
//! should use the line variant or escape nothing.

use std::fmt::{Display, Write};

/// First argument of a templated log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// Text that may carry printf-style placeholders.
    Text(String),
    /// Any other printable value, already rendered with its `Display` impl.
    Opaque(String),
}

impl Template {
    /// Wrap a non-textual value. Its rendering never counts as a format
    /// string of its own, trailing operands always get generic placeholders.
    pub fn opaque(value: impl Display) -> Self {
        Template::Opaque(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Template::Text(s) | Template::Opaque(s) => s,
        }
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Template::Text(s.to_string())
    }
}

impl From<String> for Template {
    fn from(s: String) -> Self {
        Template::Text(s)
    }
}

impl From<&String> for Template {
    fn from(s: &String) -> Self {
        Template::Text(s.clone())
    }
}

macro_rules! opaque_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Template {
                fn from(v: $t) -> Self {
                    Template::opaque(v)
                }
            }
        )*
    };
}

opaque_from!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl From<&dyn std::error::Error> for Template {
    fn from(e: &dyn std::error::Error) -> Self {
        Template::opaque(e)
    }
}

/// Whether `s` is treated as a format string.
pub fn has_active_placeholder(s: &str) -> bool {
    s.contains('%') && !s.contains("%%")
}

/// Resolve a templated call into its final message.
pub fn resolve(template: &Template, args: &[&dyn Display]) -> String {
    let msg = template.as_str();
    if args.is_empty() {
        return msg.to_string();
    }

    let is_format = match template {
        Template::Text(s) => has_active_placeholder(s),
        Template::Opaque(_) => false,
    };

    if is_format {
        sprintf(msg, args)
    } else {
        let mut format = String::with_capacity(msg.len() + args.len() * 3);
        format.push_str(msg);
        for _ in args {
            format.push_str(" %v");
        }
        sprintf(&format, args)
    }
}

/// Join operands with single spaces and end with a newline.
pub fn sprintln(args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
    }
    out.push('\n');
    out
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// printf-style formatting over `Display` operands.
///
/// Verbs: `%v %s %d %f %F %e %g %t %q %x %X`, plus `%%`. Flags `-`, `0` and
/// `+`, a width and a `.precision` are honoured. Missing operands render as
/// `%!v(MISSING)` and surplus ones as `%!(EXTRA a, b)`.
///
/// Operands are only known through `Display`, so verbs are not type-checked:
/// `%d` on a float or string prints the value as is rather than reporting
/// a `%!d(type=value)` mismatch. Precision goes through `Display` too, which
/// integers ignore, so both `%.2d` and `%.2f` of `5` give `5`.
pub fn sprintf(format: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut next = 0usize;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' | '#' => {}
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        let verb = match chars.next() {
            Some(v) => v,
            None => {
                out.push_str("%!(NOVERB)");
                break;
            }
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        let Some(arg) = args.get(next) else {
            let _ = write!(out, "%!{}(MISSING)", verb);
            continue;
        };
        next += 1;

        match render(verb, &spec, *arg) {
            Some(rendered) => pad(&mut out, &rendered, &spec),
            None => {
                let _ = write!(out, "%!{}({})", verb, arg);
            }
        }
    }

    if next < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next..].iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", arg);
        }
        out.push(')');
    }

    out
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
        chars.next();
    }
    n
}

fn render(verb: char, spec: &Spec, arg: &dyn Display) -> Option<String> {
    let rendered = match verb {
        'v' | 's' | 'd' | 't' | 'g' => with_precision(arg, spec.precision),
        'f' | 'F' | 'e' => with_precision(arg, Some(spec.precision.unwrap_or(6))),
        'q' => format!("{:?}", arg.to_string()),
        'x' => hex(arg, false),
        'X' => hex(arg, true),
        _ => return None,
    };
    if spec.plus && matches!(verb, 'd' | 'f' | 'F' | 'e' | 'g') && looks_unsigned_number(&rendered) {
        return Some(format!("+{}", rendered));
    }
    Some(rendered)
}

fn with_precision(arg: &dyn Display, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{:.*}", p, arg),
        None => arg.to_string(),
    }
}

fn looks_unsigned_number(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Integers render as a hex number, anything else as hex of its bytes.
fn hex(arg: &dyn Display, upper: bool) -> String {
    let text = arg.to_string();
    let mut out = String::new();
    if let Ok(n) = text.parse::<i128>() {
        if n < 0 {
            out.push('-');
        }
        if upper {
            let _ = write!(out, "{:X}", n.unsigned_abs());
        } else {
            let _ = write!(out, "{:x}", n.unsigned_abs());
        }
        return out;
    }
    for b in text.bytes() {
        if upper {
            let _ = write!(out, "{:02X}", b);
        } else {
            let _ = write!(out, "{:02x}", b);
        }
    }
    out
}

fn pad(out: &mut String, rendered: &str, spec: &Spec) {
    let len = rendered.chars().count();
    let width = match spec.width {
        Some(w) if w > len => w,
        _ => {
            out.push_str(rendered);
            return;
        }
    };
    let fill = width - len;

    if spec.left {
        out.push_str(rendered);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero {
        // zeros go after a leading sign
        let (sign, digits) = match rendered.chars().next() {
            Some(c @ ('-' | '+')) => (Some(c), &rendered[1..]),
            _ => (None, rendered),
        };
        if let Some(sign) = sign {
            out.push(sign);
        }
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_placeholder_appends_generic() {
        let t = Template::from("user logged in");
        assert_eq!(resolve(&t, &[&42]), "user logged in 42");
    }

    #[test]
    fn test_explicit_placeholder() {
        let t = Template::from("count=%d");
        assert_eq!(resolve(&t, &[&7]), "count=7");
    }

    #[test]
    fn test_no_args_is_unchanged() {
        assert_eq!(resolve(&Template::from("startup complete"), &[]), "startup complete");
        // not run through the formatter at all
        assert_eq!(resolve(&Template::from("100%% sure %d"), &[]), "100%% sure %d");
    }

    #[test]
    fn test_escaped_marker_disables_format() {
        let t = Template::from("100%% done");
        assert_eq!(resolve(&t, &[&"ok"]), "100% done ok");

        // a real placeholder next to an escaped one is still not a format string
        let t = Template::from("%d%% done");
        assert_eq!(resolve(&t, &[&5]), "5% done %!v(MISSING)");
    }

    #[test]
    fn test_opaque_template() {
        let t = Template::from(3.5f64);
        assert_eq!(resolve(&t, &[]), "3.5");
        assert_eq!(resolve(&t, &[&"a", &1]), "3.5 a 1");

        // a rendered value containing % is never used as a format string alone
        let t = Template::opaque("50%");
        assert_eq!(resolve(&t, &[]), "50%");
    }

    #[test]
    fn test_missing_and_extra_operands() {
        assert_eq!(sprintf("%s and %s", &[&"a"]), "a and %!s(MISSING)");
        assert_eq!(sprintf("%s", &[&"a", &1, &2]), "a%!(EXTRA 1, 2)");
    }

    #[test]
    fn test_width_precision_flags() {
        assert_eq!(sprintf("[%5d]", &[&42]), "[   42]");
        assert_eq!(sprintf("[%-5d]", &[&42]), "[42   ]");
        assert_eq!(sprintf("[%05d]", &[&-42]), "[-0042]");
        assert_eq!(sprintf("%.2f", &[&3.14159]), "3.14");
        assert_eq!(sprintf("%f", &[&1.5]), "1.500000");
        assert_eq!(sprintf("%+d", &[&3]), "+3");
    }

    #[test]
    fn test_quote_and_hex() {
        assert_eq!(sprintf("%q", &[&"hi \"there\""]), "\"hi \\\"there\\\"\"");
        assert_eq!(sprintf("%x", &[&255]), "ff");
        assert_eq!(sprintf("%X", &[&"hi"]), "6869");
    }

    #[test]
    fn test_verbs_do_not_check_operand_type() {
        assert_eq!(sprintf("%d", &[&2.5]), "2.5");
        assert_eq!(sprintf("%d", &[&"abc"]), "abc");
        assert_eq!(sprintf("%.2d", &[&5]), "5");
        assert_eq!(sprintf("%.2f", &[&5]), "5");
        assert_eq!(sprintf("%.2s", &[&"abcdef"]), "ab");
    }

    #[test]
    fn test_unknown_verb_and_no_verb() {
        assert_eq!(sprintf("%z", &[&1]), "%!z(1)");
        assert_eq!(sprintf("trailing %", &[]), "trailing %!(NOVERB)");
    }

    #[test]
    fn test_sprintln_separates_all_operands() {
        assert_eq!(sprintln(&[&"error is", &500, &"boom"]), "error is 500 boom\n");
        assert_eq!(sprintln(&[]), "\n");
    }
}
