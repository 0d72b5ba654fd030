//! Collaborative block document model
//!
//! A document is a JSON object holding the ordered top-level `blocks`, an
//! optional `comments` table, and one entry per child node id (code lines and
//! table cells live there, referenced from the `children` of their block).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::{Map, Value};

use crate::ErrorDetail;

#[derive(Debug, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: IndexMap<String, Comment>,
    #[serde(flatten)]
    pub nodes: Map<String, Value>,
}

impl Document {
    pub fn from_json(src: &str) -> Result<Self, ErrorDetail> {
        serde_json::from_str(src).map_err(ErrorDetail::ParseJson)
    }

    /// Resolve a child node id into its run groups.
    pub fn run_groups(&self, id: &str) -> Result<Vec<RunGroup>, ErrorDetail> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| ErrorDetail::NodeNotFound(id.to_owned()))?;
        Vec::<RunGroup>::deserialize(node)
            .map_err(|error| ErrorDetail::InvalidNode(id.to_owned(), error))
    }
}

/// Optional fields may be absent or an explicit `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `{"data":{"data":{...}}}` wrapper the collaboration service returns.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    data: Document,
}

impl Envelope {
    pub(crate) fn into_document(self) -> Document {
        self.data.data
    }
}

#[derive(Debug)]
pub enum Block {
    Text(TextBlock),
    List(ListBlock),
    Code(CodeBlock),
    Table(TableBlock),
    Embed(EmbedBlock),
    Unknown(String),
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_owned();
        let block = match kind.as_str() {
            "text" => Block::Text(serde_json::from_value(value).map_err(D::Error::custom)?),
            "list" => Block::List(serde_json::from_value(value).map_err(D::Error::custom)?),
            "code" => Block::Code(serde_json::from_value(value).map_err(D::Error::custom)?),
            "table" => Block::Table(serde_json::from_value(value).map_err(D::Error::custom)?),
            "embed" => Block::Embed(serde_json::from_value(value).map_err(D::Error::custom)?),
            _ => Block::Unknown(kind),
        };
        Ok(block)
    }
}

#[derive(Debug, Deserialize)]
pub struct TextBlock {
    pub text: Vec<Run>,
    #[serde(default)]
    pub heading: Option<u32>,
    #[serde(default)]
    pub quoted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListBlock {
    pub text: Vec<Run>,
    pub level: u32,
    #[serde(default)]
    pub ordered: Option<bool>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub checkbox: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkbox {
    Checked,
    Unchecked,
}

impl ListBlock {
    pub fn checkbox(&self) -> Result<Option<Checkbox>, ErrorDetail> {
        match self.checkbox.as_deref() {
            None | Some("") => Ok(None),
            Some("checked") => Ok(Some(Checkbox::Checked)),
            Some("unchecked") => Ok(Some(Checkbox::Unchecked)),
            Some(other) => Err(ErrorDetail::InvalidCheckbox(other.to_owned())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TableBlock {
    pub cols: usize,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedBlock {
    pub embed_type: EmbedKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub embed_data: EmbedData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum EmbedKind {
    Image,
    Toc,
    Hr,
    Office,
    Snapshot,
    EncryptText,
    Webpage,
    Drawio,
    Mermaid,
    Other(String),
}

impl From<String> for EmbedKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image" => Self::Image,
            "toc" => Self::Toc,
            "hr" => Self::Hr,
            "office" => Self::Office,
            "snapshot" => Self::Snapshot,
            "encrypt-text" => Self::EncryptText,
            "webpage" => Self::Webpage,
            "drawio" => Self::Drawio,
            "mermaid" => Self::Mermaid,
            _ => Self::Other(value),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedData {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Serialized nested document of a snapshot; usually a JSON string.
    #[serde(default)]
    pub doc: Option<Value>,
    #[serde(default)]
    pub mermaid_text: Option<String>,
}

/// One line of a code block or one paragraph of a table cell or comment.
#[derive(Debug, Default, Deserialize)]
pub struct RunGroup {
    #[serde(default)]
    pub text: Vec<Run>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub insert: String,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

impl Run {
    /// Attribute lookup that treats null, false, zero and empty values as unset.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes
            .as_ref()?
            .get(name)
            .filter(|value| is_truthy(value))
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub display_name: String,
    /// Epoch milliseconds, as a number or numeric string.
    #[serde(default)]
    pub created: Option<Value>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub blocks: Vec<RunGroup>,
}
