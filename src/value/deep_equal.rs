use super::{ObjectRef, Value};
use std::rc::Rc;

/// Structural equality of two values, independent of reference identity.
///
/// Self-referential structures are handled by a conservative guard: a pair
/// that revisits a value already being compared is treated as unequal, so
/// two distinct but isomorphic cycles compare unequal while any value still
/// equals itself.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    Comparator::default().compare(a, b)
}

#[derive(Default)]
struct Comparator {
    left: Vec<*const ()>,
    right: Vec<*const ()>,
}

impl Comparator {
    fn compare(&mut self, a: &Value, b: &Value) -> bool {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        if strict_equal(a, b) {
            return true;
        }
        if let (Some(x), Some(y)) = (a.canonical_string(), b.canonical_string()) {
            if a.typeof_name() == b.typeof_name() && a.constructor_name() == b.constructor_name()
            {
                return x == y;
            }
        }
        if !is_composite(a) || !is_composite(b) {
            return false;
        }
        if let (Value::Object(x), Value::Object(y)) = (a, b) {
            if is_prototype_of(x, y) || is_prototype_of(y, x) {
                return false;
            }
        }
        if a.constructor_name() != b.constructor_name() {
            return false;
        }
        if self.is_active(a, b) {
            return false;
        }

        let left = a.own_entries();
        let right = b.own_entries();
        if left.len() != right.len() || !left.keys().all(|k| right.contains_key(k)) {
            return false;
        }

        for (key, lv) in &left {
            let Some(rv) = right.get(key) else {
                return false;
            };
            if lv.typeof_name() != rv.typeof_name() {
                return false;
            }
            match lv.typeof_name() {
                "object" | "function" => {
                    self.enter(a, b);
                    let equal = self.compare(lv, rv);
                    self.leave();
                    if !equal {
                        return false;
                    }
                }
                _ => {
                    if !strict_equal(lv, rv) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn is_active(&self, a: &Value, b: &Value) -> bool {
        a.identity().is_some_and(|p| self.left.contains(&p))
            || b.identity().is_some_and(|p| self.right.contains(&p))
    }

    fn enter(&mut self, a: &Value, b: &Value) {
        self.left.push(a.identity().unwrap_or(std::ptr::null()));
        self.right.push(b.identity().unwrap_or(std::ptr::null()));
    }

    fn leave(&mut self) {
        self.left.pop();
        self.right.pop();
    }
}

/// Identity for reference values, value equality for primitives.
fn strict_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        _ => match (a.identity(), b.identity()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_) | Value::Error(_))
}

/// Whether `candidate` appears on the prototype chain of `object`.
fn is_prototype_of(candidate: &ObjectRef, object: &ObjectRef) -> bool {
    let mut current = object.borrow().prototype.clone();
    while let Some(proto) = current {
        if Rc::ptr_eq(&proto, candidate) {
            return true;
        }
        current = proto.borrow().prototype.clone();
    }
    false
}
