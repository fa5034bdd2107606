use super::Value;
use std::fmt::{self, Write};

const CIRCULAR: &str = "[Circular]";

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer::default().write(f, self)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Default)]
struct Printer {
    seen: Vec<*const ()>,
}

impl Printer {
    fn write(&mut self, out: &mut dyn Write, value: &Value) -> fmt::Result {
        if let Some(ptr) = value.identity() {
            if self.seen.contains(&ptr) {
                return out.write_str(CIRCULAR);
            }
        }
        match value {
            Value::Null => out.write_str("null"),
            Value::Undefined => out.write_str("undefined"),
            Value::Bool(b) => write!(out, "{}", b),
            Value::Number(n) => out.write_str(&format_number(*n)),
            Value::String(s) => write!(out, "{:?}", s),
            Value::Function(func) => {
                if func.name.is_empty() {
                    out.write_str("[Function (anonymous)]")
                } else {
                    write!(out, "[Function: {}]", func.name)
                }
            }
            Value::Date(date) => out.write_str(&date.to_rfc3339()),
            Value::Pattern(re) => write!(out, "/{}/", re.as_str()),
            Value::Error(e) => write!(out, "{}", e),
            Value::Array(items) => {
                self.seen.push(address(value));
                out.write_char('[')?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    self.write(out, item)?;
                }
                self.seen.pop();
                out.write_char(']')
            }
            Value::Object(obj) => {
                self.seen.push(address(value));
                let obj = obj.borrow();
                if obj.class != "Object" {
                    write!(out, "{} ", obj.class)?;
                }
                if obj.properties.is_empty() {
                    self.seen.pop();
                    return out.write_str("{}");
                }
                out.write_str("{ ")?;
                for (i, (key, item)) in obj.properties.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "{}: ", key)?;
                    self.write(out, item)?;
                }
                self.seen.pop();
                out.write_str(" }")
            }
        }
    }
}

fn address(value: &Value) -> *const () {
    value.identity().unwrap_or(std::ptr::null())
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}

impl Value {
    /// JSON rendering for reports. Values JSON cannot express are written as
    /// their display strings; cycles become `"[Circular]"`.
    pub fn to_json(&self) -> serde_json::Value {
        to_json(self, &mut Vec::new())
    }
}

fn to_json(value: &Value, seen: &mut Vec<*const ()>) -> serde_json::Value {
    use serde_json::Value as Json;

    if let Some(ptr) = value.identity() {
        if seen.contains(&ptr) {
            return Json::String(CIRCULAR.to_string());
        }
    }
    match value {
        Value::Null | Value::Undefined => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(format_number(*n))),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => {
            seen.push(address(value));
            let out = items.borrow().iter().map(|v| to_json(v, seen)).collect();
            seen.pop();
            Json::Array(out)
        }
        Value::Object(obj) => {
            seen.push(address(value));
            let out = obj
                .borrow()
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v, seen)))
                .collect();
            seen.pop();
            Json::Object(out)
        }
        Value::Error(e) => serde_json::json!({
            "kind": e.kind,
            "message": e.message,
        }),
        Value::Function(_) | Value::Date(_) | Value::Pattern(_) => {
            Json::String(value.to_string())
        }
    }
}
