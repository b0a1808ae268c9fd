//! The loosely-typed value that crosses the serialization boundary

use std::fmt;

/// A strongly-tagged configuration value.
///
/// Deserializers hand values back as this variant type; options narrow them
/// to their declared Rust type via [`ConfigType::from_value`]. Serializers
/// receive the same type on the way out.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    /// The kind tag of this value, for logs and error messages.
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Int(_) => ValueKind::Int,
            ConfigValue::UInt(_) => ValueKind::UInt,
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::String(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::UInt(v) => write!(f, "{v}"),
            ConfigValue::Float(v) => write!(f, "{v}"),
            ConfigValue::String(v) => write!(f, "{v}"),
        }
    }
}

/// Kind tag for [`ConfigValue`] and the types implementing [`ConfigType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    UInt,
    Float,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Float => "float",
            ValueKind::String => "string",
        };
        f.write_str(name)
    }
}

// Largest integer magnitude f64 represents exactly (2^53).
const MAX_EXACT_INT: u64 = 1 << 53;

/// A Rust type that can live in a configuration option.
///
/// `from_value` is the explicit match-and-narrow applied to deserialized
/// data: it returns `None` for anything that cannot be represented
/// losslessly, and the caller treats `None` as "ignore, keep the default".
/// Cross-narrowing is allowed where no information is lost: `i64` accepts a
/// fitting `UInt`, `u64` accepts a non-negative `Int`, and `f64` accepts
/// integers that are exactly representable.
pub trait ConfigType: Clone + PartialOrd + fmt::Display + Send + Sync + 'static {
    /// The kind tag for this type.
    fn kind() -> ValueKind;

    /// Wrap a value of this type for the serializer.
    fn to_value(&self) -> ConfigValue;

    /// Narrow a deserialized value to this type, or `None` on mismatch.
    fn from_value(value: &ConfigValue) -> Option<Self>;
}

impl ConfigType for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn to_value(&self) -> ConfigValue {
        ConfigValue::Bool(*self)
    }

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl ConfigType for i64 {
    fn kind() -> ValueKind {
        ValueKind::Int
    }

    fn to_value(&self) -> ConfigValue {
        ConfigValue::Int(*self)
    }

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Int(v) => Some(*v),
            ConfigValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl ConfigType for u64 {
    fn kind() -> ValueKind {
        ValueKind::UInt
    }

    fn to_value(&self) -> ConfigValue {
        ConfigValue::UInt(*self)
    }

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::UInt(v) => Some(*v),
            ConfigValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl ConfigType for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn to_value(&self) -> ConfigValue {
        ConfigValue::Float(*self)
    }

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(v) => Some(*v),
            // Hand-edited files often write `50` where a float is declared;
            // accept integers that survive the conversion exactly.
            ConfigValue::Int(v) => (v.unsigned_abs() <= MAX_EXACT_INT).then(|| *v as f64),
            ConfigValue::UInt(v) => (*v <= MAX_EXACT_INT).then(|| *v as f64),
            _ => None,
        }
    }
}

impl ConfigType for String {
    fn kind() -> ValueKind {
        ValueKind::String
    }

    fn to_value(&self) -> ConfigValue {
        ConfigValue::String(self.clone())
    }

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(ConfigValue::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(ConfigValue::Int(-3).kind(), ValueKind::Int);
        assert_eq!(ConfigValue::UInt(3).kind(), ValueKind::UInt);
        assert_eq!(ConfigValue::Float(1.5).kind(), ValueKind::Float);
        assert_eq!(ConfigValue::String("x".into()).kind(), ValueKind::String);
    }

    #[test]
    fn test_exact_narrowing() {
        assert_eq!(bool::from_value(&ConfigValue::Bool(true)), Some(true));
        assert_eq!(i64::from_value(&ConfigValue::Int(-7)), Some(-7));
        assert_eq!(u64::from_value(&ConfigValue::UInt(7)), Some(7));
        assert_eq!(f64::from_value(&ConfigValue::Float(0.5)), Some(0.5));
        assert_eq!(
            String::from_value(&ConfigValue::String("hi".into())),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_mismatch_returns_none() {
        assert_eq!(bool::from_value(&ConfigValue::Int(1)), None);
        assert_eq!(i64::from_value(&ConfigValue::String("5".into())), None);
        assert_eq!(String::from_value(&ConfigValue::Int(5)), None);
        assert_eq!(f64::from_value(&ConfigValue::Bool(false)), None);
    }

    #[test]
    fn test_lossless_cross_narrowing() {
        assert_eq!(i64::from_value(&ConfigValue::UInt(42)), Some(42));
        assert_eq!(i64::from_value(&ConfigValue::UInt(u64::MAX)), None);
        assert_eq!(u64::from_value(&ConfigValue::Int(42)), Some(42));
        assert_eq!(u64::from_value(&ConfigValue::Int(-1)), None);
        assert_eq!(f64::from_value(&ConfigValue::Int(50)), Some(50.0));
        assert_eq!(f64::from_value(&ConfigValue::UInt(50)), Some(50.0));
    }
}
