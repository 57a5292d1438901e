//! Modifier maps and attribute values.

use std::fmt;

use indexmap::IndexMap;

// ---------------------------------------------------------------------------
// ModValue
// ---------------------------------------------------------------------------

/// Value of a single modifier.
///
/// `Null` is an explicit "unset" that still occupies the key, so a later
/// unforced write keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModValue {
    Null,
    Bool(bool),
    Str(String),
}

impl ModValue {
    /// Whether this value produces a modifier class.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// The string value, if this is a valued modifier.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ModValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ModValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ModValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for ModValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

macro_rules! mod_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ModValue {
            fn from(n: $t) -> Self {
                Self::Str(n.to_string())
            }
        })*
    };
}

mod_value_from_int!(i32, i64, u32, u64, usize);

impl<T: Into<ModValue>> From<Option<T>> for ModValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Mods
// ---------------------------------------------------------------------------

/// Ordered modifier map: name -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mods(IndexMap<String, ModValue>);

impl Mods {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier (builder).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ModValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or overwrite, keeping the key's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ModValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Write `value` unless the key is already present or `force` is set.
    pub fn set(&mut self, name: &str, value: ModValue, force: bool) {
        if force || !self.0.contains_key(name) {
            self.0.insert(name.to_owned(), value);
        }
    }

    /// Merge another map.
    ///
    /// Forced: `other` overwrites existing keys. Unforced: `other` comes first
    /// and existing values win on collisions.
    pub fn merge(&mut self, other: Mods, force: bool) {
        if force {
            self.0.extend(other.0);
        } else {
            let mut merged = other.0;
            merged.extend(std::mem::take(&mut self.0));
            self.0 = merged;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ModValue>> FromIterator<(K, V)> for Mods {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// AttrValue
// ---------------------------------------------------------------------------

/// Value of a free HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Present but never rendered.
    Null,
    /// `true` renders a bare attribute, `false` omits it.
    Bool(bool),
    Str(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

macro_rules! attr_value_from_num {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(n: $t) -> Self {
                Self::Str(n.to_string())
            }
        })*
    };
}

attr_value_from_num!(i32, i64, u32, u64, usize, f64);

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Ordered attribute map.
pub type Attrs = IndexMap<String, AttrValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(ModValue::Bool(true).is_truthy());
        assert!(ModValue::from("yes").is_truthy());
        assert!(ModValue::from(0).is_truthy());
        assert!(!ModValue::from("").is_truthy());
        assert!(!ModValue::Bool(false).is_truthy());
        assert!(!ModValue::Null.is_truthy());
    }

    #[test]
    fn numbers_become_strings() {
        assert_eq!(ModValue::from(3usize), ModValue::Str("3".into()));
        assert_eq!(AttrValue::from(0), AttrValue::Str("0".into()));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(ModValue::from(None::<&str>), ModValue::Null);
        assert_eq!(AttrValue::from(Some("x")), AttrValue::Str("x".into()));
    }

    #[test]
    fn set_keeps_first_writer() {
        let mut mods = Mods::new();
        mods.set("type", ModValue::Null, false);
        mods.set("type", "active".into(), false);
        assert_eq!(mods.get("type"), Some(&ModValue::Null));
        mods.set("type", "active".into(), true);
        assert_eq!(mods.get("type"), Some(&ModValue::from("active")));
    }

    #[test]
    fn unforced_merge_puts_new_keys_first() {
        let mut mods = Mods::new().with("a", true);
        mods.merge(Mods::new().with("b", "x").with("a", false), false);
        let pairs: Vec<_> = mods.iter().map(|(k, v)| (k.to_owned(), v.clone())).collect();
        assert_eq!(
            pairs,
            vec![("b".into(), ModValue::from("x")), ("a".into(), ModValue::Bool(true))]
        );
    }

    #[test]
    fn forced_merge_overwrites() {
        let mut mods = Mods::new().with("a", true);
        mods.merge(Mods::new().with("a", false).with("b", "x"), true);
        assert_eq!(mods.get("a"), Some(&ModValue::Bool(false)));
        assert_eq!(mods.len(), 2);
    }

    #[test]
    fn collect_from_pairs() {
        let mods: Mods = [("theme", "normal"), ("size", "m")].into_iter().collect();
        assert_eq!(mods.len(), 2);
        assert_eq!(mods.get("size").and_then(ModValue::as_str), Some("m"));
    }
}
