//! Result Model
//!
//! A result is one row Alfred shows for a script filter. Callers describe it
//! with [`ItemOptions`]; [`ResultList::add_result`] applies the defaults and
//! records the normalized [`ResultEntry`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Field names with a dedicated slot; everything else is passthrough
pub const KNOWN_FIELDS: [&str; 8] = [
    "uid",
    "arg",
    "title",
    "subtitle",
    "icon",
    "valid",
    "autocomplete",
    "type",
];

/// Whether Alfred lets the user action a result.
///
/// Alfred understands `"yes"`/`"no"` and booleans. Anything else is kept as
/// given and dropped when the XML is written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Valid {
    Flag(bool),
    Word(String),
    Other(Value),
}

impl Default for Valid {
    fn default() -> Self {
        Valid::Word("yes".to_string())
    }
}

impl Valid {
    /// Interpret a raw JSON value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(flag) => Valid::Flag(*flag),
            Value::String(word) => Valid::Word(word.clone()),
            other => Valid::Other(other.clone()),
        }
    }

    /// The `valid` attribute value, or `None` when the value is not one Alfred accepts
    pub fn as_attribute(&self) -> Option<&'static str> {
        match self {
            Valid::Flag(true) => Some("yes"),
            Valid::Flag(false) => Some("no"),
            Valid::Word(word) if word == "yes" => Some("yes"),
            Valid::Word(word) if word == "no" => Some("no"),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Valid::Flag(flag) => Value::Bool(*flag),
            Valid::Word(word) => Value::String(word.clone()),
            Valid::Other(value) => value.clone(),
        }
    }
}

impl From<bool> for Valid {
    fn from(flag: bool) -> Self {
        Valid::Flag(flag)
    }
}

impl From<&str> for Valid {
    fn from(word: &str) -> Self {
        Valid::Word(word.to_string())
    }
}

/// Fields a caller may supply for a result. Unset fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemOptions {
    #[serde(default, deserialize_with = "text_field")]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub arg: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub icon: Option<String>,
    /// `None` only when the key was absent; an explicit `null` is kept
    #[serde(default, deserialize_with = "valid_field")]
    pub valid: Option<Valid>,
    #[serde(default, deserialize_with = "text_field")]
    pub autocomplete: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "text_field")]
    pub kind: Option<String>,

    /// Passthrough attributes Alfred may understand but this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text for a known field: scalars become their JSON text, `null` and
/// nested values leave the field unset.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => {
            tracing::warn!(%nested, "ignoring nested value for a text field");
            None
        }
    }
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(scalar_text)
}

fn valid_field<'de, D>(deserializer: D) -> Result<Option<Valid>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| Some(Valid::from_value(&value)))
}

impl ItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the icon. Prefix with `fileicon:` or `filetype:` to use a file's icon or a UTI.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_valid(mut self, valid: impl Into<Valid>) -> Self {
        self.valid = Some(valid.into());
        self
    }

    pub fn with_autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set an attribute by name. Known field names always set the matching
    /// field; `null` clears it and other scalars are stored as their JSON text.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();

        match key.as_str() {
            "valid" => self.valid = Some(Valid::from_value(&value)),
            "uid" => self.uid = scalar_text(value),
            "arg" => self.arg = scalar_text(value),
            "title" => self.title = scalar_text(value),
            "subtitle" => self.subtitle = scalar_text(value),
            "icon" => self.icon = scalar_text(value),
            "autocomplete" => self.autocomplete = scalar_text(value),
            "type" => self.kind = scalar_text(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }
}

/// A normalized result, as recorded by [`ResultList::add_result`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    /// Should be unique across the results shown together
    pub uid: Option<String>,
    pub arg: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub icon: Option<String>,
    pub valid: Valid,
    pub autocomplete: Option<String>,
    /// Left out of the output entirely when unset
    pub kind: Option<String>,
    pub extra: Map<String, Value>,
}

impl Default for ResultEntry {
    fn default() -> Self {
        Self {
            uid: None,
            arg: None,
            title: None,
            subtitle: None,
            icon: None,
            valid: Valid::default(),
            autocomplete: None,
            kind: None,
            extra: Map::new(),
        }
    }
}

impl ResultEntry {
    /// Overlay the supplied options on the defaults
    pub fn from_options(options: ItemOptions) -> Self {
        let defaults = Self::default();
        Self {
            uid: options.uid.or(defaults.uid),
            arg: options.arg.or(defaults.arg),
            title: options.title.or(defaults.title),
            subtitle: options.subtitle.or(defaults.subtitle),
            icon: options.icon.or(defaults.icon),
            valid: options.valid.unwrap_or(defaults.valid),
            autocomplete: options.autocomplete.or(defaults.autocomplete),
            kind: options.kind,
            extra: options.extra,
        }
    }

    /// Field map in output order.
    ///
    /// Every default key is present (unset ones as `null`); `type` only
    /// appears when set. Passthrough attributes follow in insertion order.
    pub fn to_map(&self) -> Map<String, Value> {
        fn text(value: &Option<String>) -> Value {
            value.clone().map(Value::String).unwrap_or(Value::Null)
        }

        let mut map = Map::new();
        map.insert("uid".to_string(), text(&self.uid));
        map.insert("arg".to_string(), text(&self.arg));
        map.insert("title".to_string(), text(&self.title));
        map.insert("subtitle".to_string(), text(&self.subtitle));
        map.insert("icon".to_string(), text(&self.icon));
        map.insert("valid".to_string(), self.valid.to_value());
        map.insert("autocomplete".to_string(), text(&self.autocomplete));
        if let Some(kind) = &self.kind {
            map.insert("type".to_string(), Value::String(kind.clone()));
        }
        for (key, value) in &self.extra {
            if KNOWN_FIELDS.contains(&key.as_str()) {
                tracing::debug!(key = %key, "ignoring passthrough value for a known field");
                continue;
            }
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// Ordered list of results; order is the order Alfred shows them in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultList {
    pub items: Vec<ResultEntry>,
}

impl ResultList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Normalize `options`, append the entry and return what was recorded
    pub fn add_result(&mut self, options: ItemOptions) -> ResultEntry {
        let entry = ResultEntry::from_options(options);
        self.items.push(entry.clone());
        entry
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultList {
    type Item = ResultEntry;
    type IntoIter = std::vec::IntoIter<ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultList {
    type Item = &'a ResultEntry;
    type IntoIter = std::slice::Iter<'a, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<ResultEntry> for ResultList {
    fn from_iter<T: IntoIterator<Item = ResultEntry>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
