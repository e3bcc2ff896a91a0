//! Attribute specifications consumed by the element factory.

use indexmap::IndexMap;

use crate::{style::Style, value::js_number};

/// Reserved attribute key holding classes to add to a new element.
pub const CLASS_LIST_KEY: &str = "classListAdd";

/// Reserved attribute key holding inline style declarations.
pub const STYLE_KEY: &str = "style";

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Literal text.
    Text(String),
    /// A number, rendered in its shortest form.
    Number(f64),
    /// A boolean, rendered as `true` or `false`.
    Bool(bool),
    /// A list of strings; used for class lists, rendered comma-joined elsewhere.
    List(Vec<String>),
    /// Inline style declarations.
    Style(Style),
}

impl AttrValue {
    /// The string a host receives when this value is set as a literal attribute.
    #[must_use]
    pub fn to_attribute_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => js_number(*number),
            Self::Bool(flag) => flag.to_string(),
            Self::List(items) => items.join(","),
            Self::Style(_) => String::from("[object Object]"),
        }
    }

    /// Short description of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::List(_) => "list",
            Self::Style(_) => "style map",
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AttrValue {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<Style> for AttrValue {
    fn from(value: Style) -> Self {
        Self::Style(value)
    }
}

/// An ordered attribute specification for a new element.
///
/// ```
/// use breeze_core::{Attributes, Style};
///
/// let attributes = Attributes::new()
///     .with("id", "panel")
///     .class(["card", "elevated"])
///     .style(Style::new().with("zIndex", 2));
/// assert_eq!(attributes.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
}

impl Attributes {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, replacing an earlier value under the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets the reserved `classListAdd` entry.
    #[must_use]
    pub fn class(self, classes: impl Into<AttrValue>) -> Self {
        self.with(CLASS_LIST_KEY, classes)
    }

    /// Sets the reserved `style` entry.
    #[must_use]
    pub fn style(self, style: Style) -> Self {
        self.with(STYLE_KEY, style)
    }

    /// Adds an attribute, replacing an earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Removes an attribute, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.entries.shift_remove(name)
    }

    /// Removes and returns the reserved `classListAdd` entry.
    pub fn take_class_list(&mut self) -> Option<AttrValue> {
        self.remove(CLASS_LIST_KEY)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the specification is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttrValue);
    type IntoIter = indexmap::map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
