use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    Boolean,
    Select,
    Vector3,
    /// Indices of earlier commands in the graph.
    ObjectReferenceList,
    Text,
}

/// Compile-time default for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Number(f64),
    Boolean(bool),
    Text(&'static str),
    Vector3([f64; 3]),
    EmptyReferences,
}

impl DefaultValue {
    pub fn to_value(self) -> ParamValue {
        match self {
            DefaultValue::Number(n) => ParamValue::Number(n),
            DefaultValue::Boolean(b) => ParamValue::Boolean(b),
            DefaultValue::Text(s) => ParamValue::Text(s.to_string()),
            DefaultValue::Vector3(v) => ParamValue::Vector3(v),
            DefaultValue::EmptyReferences => ParamValue::References(Vec::new()),
        }
    }
}

/// A concrete parameter value stored on a command.
///
/// Serializes to plain JSON (number, bool, string or array). There is no
/// `Deserialize` impl: `[0, 0, 1]` is both a vector and a reference list, so
/// raw JSON is always interpreted through [`ParamSpec::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Boolean(bool),
    /// Free text and select options.
    Text(String),
    Vector3([f64; 3]),
    References(Vec<usize>),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_references(&self) -> Option<&[usize]> {
        match self {
            ParamValue::References(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this value has the shape `kind` expects.
    pub fn matches(&self, kind: ParamKind) -> bool {
        matches!(
            (self, kind),
            (ParamValue::Number(_), ParamKind::Number)
                | (ParamValue::Boolean(_), ParamKind::Boolean)
                | (ParamValue::Text(_), ParamKind::Select)
                | (ParamValue::Text(_), ParamKind::Text)
                | (ParamValue::Vector3(_), ParamKind::Vector3)
                | (ParamValue::References(_), ParamKind::ObjectReferenceList)
        )
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<[f64; 3]> for ParamValue {
    fn from(v: [f64; 3]) -> Self {
        ParamValue::Vector3(v)
    }
}

impl From<Vec<usize>> for ParamValue {
    fn from(r: Vec<usize>) -> Self {
        ParamValue::References(r)
    }
}

/// Schema for one parameter of a command kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: DefaultValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Allowed values for `Select` parameters.
    pub options: &'static [&'static str],
    pub label: &'static str,
    pub description: Option<&'static str>,
}

impl ParamSpec {
    pub fn default_value(&self) -> ParamValue {
        self.default.to_value()
    }

    /// Interpret raw JSON according to this parameter's kind.
    ///
    /// Returns `None` when the JSON cannot represent the kind at all.
    /// Numeric strings are accepted for numbers; reference lists keep only
    /// the entries that are non-negative integers.
    pub fn coerce(&self, raw: &Value) -> Option<ParamValue> {
        match self.kind {
            ParamKind::Number => match raw {
                Value::Number(n) => n.as_f64().map(ParamValue::Number),
                Value::String(s) => s.trim().parse::<f64>().ok().map(ParamValue::Number),
                _ => None,
            },
            ParamKind::Boolean => raw.as_bool().map(ParamValue::Boolean),
            ParamKind::Select | ParamKind::Text => {
                raw.as_str().map(|s| ParamValue::Text(s.to_string()))
            }
            ParamKind::Vector3 => {
                let items = raw.as_array()?;
                if items.len() != 3 {
                    return None;
                }
                let mut v = [0.0; 3];
                for (slot, item) in v.iter_mut().zip(items) {
                    *slot = item.as_f64()?;
                }
                Some(ParamValue::Vector3(v))
            }
            ParamKind::ObjectReferenceList => {
                let items = raw.as_array()?;
                let refs = items
                    .iter()
                    .filter_map(|item| item.as_u64())
                    .filter_map(|r| usize::try_from(r).ok())
                    .collect();
                Some(ParamValue::References(refs))
            }
        }
    }

    /// Bring a value inside this parameter's bounds.
    ///
    /// Numbers are clamped to `[min, max]`, non-finite numbers and unknown
    /// select options fall back to the default, and a value of the wrong
    /// shape is replaced by the default.
    pub fn clamp(&self, value: &ParamValue) -> ParamValue {
        if !value.matches(self.kind) {
            return self.default_value();
        }
        match value {
            ParamValue::Number(n) => {
                if !n.is_finite() {
                    return self.default_value();
                }
                let mut n = *n;
                if let Some(min) = self.min {
                    n = n.max(min);
                }
                if let Some(max) = self.max {
                    n = n.min(max);
                }
                ParamValue::Number(n)
            }
            ParamValue::Text(s) if self.kind == ParamKind::Select => {
                if self.options.is_empty() || self.options.contains(&s.as_str()) {
                    value.clone()
                } else {
                    self.default_value()
                }
            }
            ParamValue::Vector3(v) => {
                let fallback = match self.default {
                    DefaultValue::Vector3(d) => d,
                    _ => [0.0; 3],
                };
                let mut out = *v;
                for (slot, d) in out.iter_mut().zip(fallback) {
                    if !slot.is_finite() {
                        *slot = d;
                    }
                }
                ParamValue::Vector3(out)
            }
            _ => value.clone(),
        }
    }
}
