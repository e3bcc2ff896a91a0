//! Inline style maps and CSS property name normalization.

use alloc::borrow::Cow;

use indexmap::IndexMap;

use crate::attributes::AttrValue;

/// An ordered set of inline style declarations.
///
/// Property names may be written in script form (`zIndex`) or CSS form
/// (`z-index`); they are normalized with [`property_name`] when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: IndexMap<String, String>,
}

impl Style {
    /// Creates an empty style map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, replacing an earlier one with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a declaration, replacing an earlier one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.declarations
            .insert(name.into(), value.into().to_attribute_string());
    }

    /// Looks up a declaration by the name it was inserted with.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations.get(name).map(String::as_str)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the map holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterates declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Style
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (name, value) in iter {
            style.insert(name, value);
        }
        style
    }
}

/// Converts a script-style property name (`zIndex`, `WebkitTransform`) into its
/// CSS form (`z-index`, `-webkit-transform`).
///
/// Names that are already lowercase and custom properties (`--accent`) pass through.
#[must_use]
pub fn property_name(name: &str) -> Cow<'_, str> {
    if name.starts_with("--") || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return Cow::Borrowed(name);
    }

    let mut css = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            css.push('-');
            css.push(c.to_ascii_lowercase());
        } else {
            css.push(c);
        }
    }
    Cow::Owned(css)
}

/// Parses a `style` attribute value into declarations.
pub(crate) fn parse_declarations(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let name = name.trim();
        (!name.is_empty()).then(|| (name, value.trim()))
    })
}
