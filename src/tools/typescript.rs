// TypeScript rendering helpers: object literals from manifest values and identifier casing.

use serde_json::Value;

/// String quoting used by a code style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

/// Literal formatting: quote character and spaces per nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStyle {
    pub quote: Quote,
    pub indent: usize,
}

impl LiteralStyle {
    pub const fn new(quote: Quote, indent: usize) -> Self {
        LiteralStyle { quote, indent }
    }

    /// Renders `value` as a TypeScript literal whose closing brace sits at `level`.
    pub fn literal(&self, value: &Value, level: usize) -> String {
        let mut out = String::new();
        self.write_value(value, level, &mut out);
        out
    }

    /// A quoted, escaped string literal.
    pub fn string(&self, s: &str) -> String {
        let mut out = String::new();
        escape_string_buf(s, self.quote, &mut out);
        out
    }

    fn pad(&self, level: usize, out: &mut String) {
        out.extend(std::iter::repeat(' ').take(level * self.indent));
    }

    fn write_value(&self, value: &Value, level: usize, out: &mut String) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::String(s) => escape_string_buf(s, self.quote, out),
            Value::Array(items) if items.is_empty() => out.push_str("[]"),
            Value::Array(items) if items.iter().all(is_scalar) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(item, level, out);
                }
                out.push(']');
            }
            Value::Array(items) => {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    self.pad(level + 1, out);
                    self.write_value(item, level + 1, out);
                }
                out.push('\n');
                self.pad(level, out);
                out.push(']');
            }
            Value::Object(map) if map.is_empty() => out.push_str("{}"),
            Value::Object(map) => {
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    self.pad(level + 1, out);
                    if is_identifier(key) {
                        out.push_str(key);
                    } else {
                        escape_string_buf(key, self.quote, out);
                    }
                    out.push_str(": ");
                    self.write_value(item, level + 1, out);
                }
                out.push('\n');
                self.pad(level, out);
                out.push('}');
            }
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Whether `key` can appear unquoted as an object key.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn escape_string_buf(value: &str, quote: Quote, buf: &mut String) {
    let q = quote.as_char();
    buf.reserve(value.len() + 2);
    buf.push(q);
    for c in value.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if c == q => {
                buf.push('\\');
                buf.push(c);
            }
            c if (c as u32) < 0x20 => buf.push_str(&format!("\\u{:04x}", c as u32)),
            c => buf.push(c),
        }
    }
    buf.push(q);
}

/// `my-app` → `MyApp`. Any non-alphanumeric character separates words; a leading digit
/// gets an underscore so the result stays a valid identifier.
pub fn to_pascal_case(s: &str) -> String {
    let pascal: String = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let upper: String = first.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect();
    match pascal.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{}", pascal),
        None => "_".to_string(),
        _ => pascal,
    }
}

/// `my-app` → `myApp`.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            let lower: String = first.to_lowercase().collect();
            lower + chars.as_str()
        }
        _ => pascal,
    }
}
