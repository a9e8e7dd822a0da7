//! XML renderer
//!
//! Renders results as the item-list document Alfred reads from a script
//! filter:
//!
//! ```text
//! <?xml version="1.0"?>
//! <items><item uid="..." arg="..." valid="yes"><uid>...</uid><arg>...</arg>...</item></items>
//! ```

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::io::Write;

use crate::core::error::{Result, WorkflowError};
use crate::core::json::{decode, type_name};
use crate::core::model::{ResultList, Valid};

/// Icon prefixes Alfred turns into a `type` attribute on `<icon>`
pub const ICON_TYPES: [&str; 2] = ["filetype", "fileicon"];

/// Data handed to [`to_xml`] in addition to the accumulated results
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// JSON text: an object or an array of objects
    Json(Vec<u8>),
    /// Already-decoded structure
    Value(Value),
}

impl From<&str> for Payload {
    fn from(json: &str) -> Self {
        Payload::Json(json.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(json: String) -> Self {
        Payload::Json(json.into_bytes())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(json: Vec<u8>) -> Self {
        Payload::Json(json)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl Payload {
    /// Decode and check the payload, returning the structure to render (if any)
    fn resolve(self) -> Result<Option<Value>> {
        let value = match self {
            Payload::Empty => return Ok(None),
            Payload::Json(bytes) => decode(&bytes)?,
            Payload::Value(value) => value,
        };

        match value {
            Value::Array(_) | Value::Object(_) => Ok(Some(value)),
            other => Err(WorkflowError::InvalidPayloadType {
                found: type_name(&other),
            }),
        }
    }
}

/// Render results to XML.
///
/// When `results` is non-empty it wins over `payload`, which is still
/// decoded and checked. Returns `Ok(None)` when there is nothing to render.
pub fn to_xml(results: &ResultList, payload: Payload) -> Result<Option<String>> {
    let supplied = payload.resolve()?;

    if !results.is_empty() {
        if supplied.is_some() {
            tracing::debug!(
                count = results.len(),
                "accumulated results replace the supplied payload"
            );
        }
        let items: Vec<Value> = results
            .iter()
            .map(|entry| Value::Object(entry.to_map()))
            .collect();
        return render_document(&items).map(Some);
    }

    match supplied {
        Some(Value::Array(items)) if !items.is_empty() => render_document(&items).map(Some),
        Some(Value::Object(items)) if !items.is_empty() => {
            let items: Vec<Value> = items.into_iter().map(|(_, item)| item).collect();
            render_document(&items).map(Some)
        }
        _ => Ok(None),
    }
}

/// Render a sequence of items (each normally a JSON object) as a full document
pub fn render_document(items: &[Value]) -> Result<String> {
    let mut buffer = Vec::new();
    write_document(items, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the document to a writer
pub fn write_document<W: Write>(items: &[Value], out: W) -> Result<()> {
    let mut writer = Writer::new(out);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", None, None)))?;
    newline(&mut writer)?;
    emit(&mut writer, Event::Start(BytesStart::new("items")))?;
    for item in items {
        write_item(&mut writer, item)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("items")))?;
    newline(&mut writer)
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| WorkflowError::XmlWrite(e.to_string()))
}

fn newline<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer
        .get_mut()
        .write_all(b"\n")
        .map_err(|e| WorkflowError::XmlWrite(e.to_string()))
}

/// A child element of `<item>`
#[derive(Debug, Clone, PartialEq)]
struct Child {
    name: String,
    kind: Option<&'static str>,
    text: String,
}

fn write_item<W: Write>(writer: &mut Writer<W>, item: &Value) -> Result<()> {
    let mut element = BytesStart::new("item");

    let Some(fields) = item.as_object() else {
        tracing::warn!(
            found = type_name(item),
            "payload item is not an object; writing an empty item"
        );
        return emit(writer, Event::Empty(element));
    };

    let mut children = Vec::new();
    for (key, value) in fields {
        match key.as_str() {
            "icon" => {
                if let Some(text) = field_text(key, value) {
                    let (kind, rest) = split_icon(&text);
                    children.push(Child {
                        name: key.clone(),
                        kind,
                        text: rest.to_string(),
                    });
                }
            }
            "valid" => match Valid::from_value(value).as_attribute() {
                Some(valid) => element.push_attribute(("valid", valid)),
                None => tracing::debug!(%value, "dropping unsupported valid value"),
            },
            _ => {
                if !is_xml_name(key) {
                    tracing::warn!(key = %key, "skipping field that is not a valid XML name");
                    continue;
                }
                if let Some(text) = field_text(key, value) {
                    push_field(&mut element, &mut children, key, text);
                }
            }
        }
    }

    if children.is_empty() {
        return emit(writer, Event::Empty(element));
    }

    emit(writer, Event::Start(element))?;
    for child in children {
        write_child(writer, &child)?;
    }
    emit(writer, Event::End(BytesEnd::new("item")))
}

/// Generic fields appear twice in Alfred's format: as an attribute on
/// `<item>` and as a child element with the same text.
fn push_field(element: &mut BytesStart<'_>, children: &mut Vec<Child>, key: &str, text: String) {
    element.push_attribute((key, text.as_str()));
    children.push(Child {
        name: key.to_string(),
        kind: None,
        text,
    });
}

fn write_child<W: Write>(writer: &mut Writer<W>, child: &Child) -> Result<()> {
    let mut element = BytesStart::new(child.name.as_str());
    if let Some(kind) = child.kind {
        element.push_attribute(("type", kind));
    }

    if child.text.is_empty() {
        return emit(writer, Event::Empty(element));
    }

    emit(writer, Event::Start(element))?;
    emit(
        writer,
        Event::Text(BytesText::from_escaped(partial_escape(&child.text))),
    )?;
    emit(writer, Event::End(BytesEnd::new(child.name.as_str())))
}

/// Split an icon value into its file-icon prefix (if any) and the path/UTI.
///
/// The prefix is the first 8 bytes and must be followed by a separator, so
/// values shorter than 9 bytes never match.
pub fn split_icon(value: &str) -> (Option<&'static str>, &str) {
    if let (Some(prefix), Some(rest)) = (value.get(..8), value.get(9..)) {
        if let Some(kind) = ICON_TYPES.iter().find(|kind| **kind == prefix) {
            return (Some(*kind), rest);
        }
    }
    (None, value)
}

/// Text content for a field, or `None` when the value cannot be written
fn field_text(key: &str, value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => {
            tracing::warn!(key = %key, "skipping nested value; only scalars can be written");
            return None;
        }
    };
    Some(strip_restricted(key, text))
}

/// Remove characters XML 1.0 cannot carry, even escaped
fn strip_restricted(key: &str, text: String) -> String {
    if !text.chars().any(is_restricted) {
        return text;
    }
    tracing::debug!(key = %key, "removing characters not allowed in XML");
    text.chars().filter(|c| !is_restricted(*c)).collect()
}

fn is_restricted(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::json::JsonDecodeError;
    use crate::core::model::ItemOptions;
    use serde_json::json;

    fn render(items: Value) -> String {
        match items {
            Value::Array(items) => render_document(&items).unwrap(),
            other => render_document(&[other]).unwrap(),
        }
    }

    #[test]
    fn test_split_icon_prefixes() {
        assert_eq!(
            split_icon("filetype:public.folder"),
            (Some("filetype"), "public.folder")
        );
        assert_eq!(
            split_icon("fileicon:/Applications/Safari.app"),
            (Some("fileicon"), "/Applications/Safari.app")
        );
        assert_eq!(split_icon("notaprefix"), (None, "notaprefix"));
    }

    #[test]
    fn test_split_icon_short_values() {
        assert_eq!(split_icon("filetype"), (None, "filetype"));
        assert_eq!(split_icon("file"), (None, "file"));
        assert_eq!(split_icon(""), (None, ""));
    }

    #[test]
    fn test_split_icon_is_case_sensitive() {
        assert_eq!(split_icon("FileType:x.y"), (None, "FileType:x.y"));
    }

    #[test]
    fn test_split_icon_multibyte_separator() {
        assert_eq!(split_icon("filetypé:x"), (None, "filetypé:x"));
        assert_eq!(split_icon("filetype→x"), (None, "filetype→x"));
    }

    #[test]
    fn test_render_icon_with_type() {
        let xml = render(json!({"icon": "filetype:public.folder"}));
        assert!(xml.contains(r#"<icon type="filetype">public.folder</icon>"#));
    }

    #[test]
    fn test_render_icon_plain() {
        let xml = render(json!({"icon": "notaprefix"}));
        assert!(xml.contains("<icon>notaprefix</icon>"));
        assert!(!xml.contains("icon="));
    }

    #[test]
    fn test_render_valid_values() {
        let xml = render(json!([
            {"valid": true},
            {"valid": false},
            {"valid": "yes"},
            {"valid": "no"},
            {"valid": 1},
        ]));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<items>\
             <item valid=\"yes\"/>\
             <item valid=\"no\"/>\
             <item valid=\"yes\"/>\
             <item valid=\"no\"/>\
             <item/>\
             </items>\n"
        );
    }

    #[test]
    fn test_render_generic_field_twice() {
        let xml = render(json!({"title": "Open", "arg": "file.txt"}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<items>\
             <item title=\"Open\" arg=\"file.txt\"><title>Open</title><arg>file.txt</arg></item>\
             </items>\n"
        );
    }

    #[test]
    fn test_render_escapes_text_and_attributes() {
        let xml = render(json!({"title": "Tom & \"Jerry\" <3"}));
        assert!(xml.contains("title=\"Tom &amp; &quot;Jerry&quot; &lt;3\""));
        assert!(xml.contains("<title>Tom &amp; \"Jerry\" &lt;3</title>"));
    }

    #[test]
    fn test_render_skips_null_and_nested() {
        let xml = render(json!({"uid": null, "title": "a", "extra": {"x": 1}}));
        assert!(!xml.contains("uid"));
        assert!(!xml.contains("extra"));
        assert!(xml.contains("<title>a</title>"));
    }

    #[test]
    fn test_render_scalars() {
        let xml = render(json!({"score": 3, "pinned": true}));
        assert!(xml.contains("score=\"3\""));
        assert!(xml.contains("<score>3</score>"));
        assert!(xml.contains("<pinned>true</pinned>"));
    }

    #[test]
    fn test_render_strips_control_characters() {
        let xml = render(json!({"title": "a\u{1}b\u{1f}c", "icon": "fileicon:/tmp/\u{0}x"}));
        assert!(xml.contains("title=\"abc\""));
        assert!(xml.contains("<title>abc</title>"));
        assert!(xml.contains(r#"<icon type="fileicon">/tmp/x</icon>"#));
        assert!(!xml.chars().any(is_restricted));
    }

    #[test]
    fn test_render_keeps_whitespace_controls() {
        let xml = render(json!({"subtitle": "a\tb\nc"}));
        assert!(xml.contains("<subtitle>a\tb\nc</subtitle>"));
    }

    #[test]
    fn test_render_explicit_null_valid_matches_builder() {
        let deserialized: ItemOptions =
            serde_json::from_value(json!({"title": "t", "valid": null})).unwrap();
        let built = ItemOptions::new()
            .with_title("t")
            .with_attribute("valid", Value::Null);

        let mut first = ResultList::new();
        first.add_result(deserialized);
        let mut second = ResultList::new();
        second.add_result(built);

        let xml = to_xml(&first, Payload::Empty).unwrap().unwrap();
        assert_eq!(xml, to_xml(&second, Payload::Empty).unwrap().unwrap());
        assert!(xml.contains("<item title=\"t\">"));
        assert!(!xml.contains("valid="));
    }

    #[test]
    fn test_render_null_type_attribute_omitted() {
        let mut results = ResultList::new();
        results.add_result(
            ItemOptions::new()
                .with_title("t")
                .with_attribute("type", Value::Null),
        );

        let xml = to_xml(&results, Payload::Empty).unwrap().unwrap();
        assert!(!xml.contains("type"));
    }

    #[test]
    fn test_render_empty_text_is_empty_element() {
        let xml = render(json!({"subtitle": ""}));
        assert!(xml.contains("<item subtitle=\"\"><subtitle/></item>"));
    }

    #[test]
    fn test_render_non_object_item() {
        let xml = render(json!(["loose", {"title": "t"}]));
        assert!(xml.contains("<items><item/><item title=\"t\">"));
    }

    #[test]
    fn test_render_skips_invalid_names() {
        let xml = render(json!({"bad key": "x", "0": "y", "title": "t"}));
        assert!(!xml.contains("bad key"));
        assert!(!xml.contains("<0>"));
        assert!(xml.contains("<title>t</title>"));
    }

    #[test]
    fn test_to_xml_scenario() {
        let mut results = ResultList::new();
        results.add_result(
            ItemOptions::new()
                .with_title("Open")
                .with_arg("file.txt")
                .with_valid(false),
        );

        let xml = to_xml(&results, Payload::Empty).unwrap().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<items>\
             <item arg=\"file.txt\" title=\"Open\" valid=\"no\">\
             <arg>file.txt</arg><title>Open</title>\
             </item></items>\n"
        );
        assert_eq!(xml.matches("<item ").count(), 1);
        assert!(!xml.contains("<icon"));
    }

    #[test]
    fn test_to_xml_accumulated_results_win() {
        let mut results = ResultList::new();
        results.add_result(ItemOptions::new().with_title("mine"));

        let xml = to_xml(&results, Payload::from(r#"[{"title":"theirs"}]"#))
            .unwrap()
            .unwrap();
        assert!(xml.contains("<title>mine</title>"));
        assert!(!xml.contains("theirs"));
    }

    #[test]
    fn test_to_xml_uses_payload_without_results() {
        let xml = to_xml(
            &ResultList::new(),
            Payload::from(r#"{"a":{"title":"first"},"b":{"title":"second"}}"#),
        )
        .unwrap()
        .unwrap();
        let first = xml.find("first").unwrap();
        let second = xml.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_to_xml_no_data() {
        assert!(to_xml(&ResultList::new(), Payload::Empty).unwrap().is_none());
        assert!(to_xml(&ResultList::new(), Payload::from("[]"))
            .unwrap()
            .is_none());
        assert!(to_xml(&ResultList::new(), Payload::Value(json!({})))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_to_xml_decode_error() {
        let err = to_xml(&ResultList::new(), Payload::from("{nope")).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::JsonDecode(JsonDecodeError::SyntaxError)
        ));
    }

    #[test]
    fn test_to_xml_invalid_payload_type() {
        let err = to_xml(&ResultList::new(), Payload::from("42")).unwrap_err();
        match err {
            WorkflowError::InvalidPayloadType { found } => assert_eq!(found, "number"),
            other => panic!("unexpected error: {other}"),
        }

        let err = to_xml(&ResultList::new(), Payload::Value(json!("text"))).unwrap_err();
        assert!(err.to_string().contains("found a string"));
    }

    #[test]
    fn test_write_document_to_writer() {
        let mut buffer = Vec::new();
        write_document(&[json!({"title": "w"})], &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("<?xml version=\"1.0\"?>\n<items>"));
        assert!(output.ends_with("</items>\n"));
    }
}
