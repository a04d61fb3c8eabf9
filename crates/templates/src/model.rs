//! Template field model: the JSON shape and its compiled form.

use eventex_core::consts::RFC3339_LAYOUT;
use eventex_core::{FieldPath, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::RsrParsers;

/// A template field as it appears in JSON. Every attribute is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FcTemplateJsonCfg {
    pub tag: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub path: Option<String>,
    pub attribute_id: Option<String>,
    pub filters: Option<Vec<String>>,
    pub value: Option<String>,
    pub width: Option<i64>,
    pub strip: Option<String>,
    pub padding: Option<String>,
    pub mandatory: Option<bool>,
    pub new_branch: Option<bool>,
    pub timezone: Option<String>,
    pub blocker: Option<bool>,
    pub layout: Option<String>,
    pub cost_shift_digits: Option<i64>,
    pub rounding_decimals: Option<i64>,
    pub mask_destinationd_id: Option<String>,
    pub mask_length: Option<i64>,
}

/// How a field's value is produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Constant,
    Variable,
    Composed,
    UsageDifference,
    /// Inline the fields of a registered template.
    Template,
    Filler,
    Sum,
    Difference,
    CcUsage,
    Group,
    Remove,
    RemoveAll,
    None,
    /// Any type this model does not interpret.
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Constant => "*constant",
            FieldType::Variable => "*variable",
            FieldType::Composed => "*composed",
            FieldType::UsageDifference => "*usage_difference",
            FieldType::Template => "*template",
            FieldType::Filler => "*filler",
            FieldType::Sum => "*sum",
            FieldType::Difference => "*difference",
            FieldType::CcUsage => "*cc_usage",
            FieldType::Group => "*group",
            FieldType::Remove => "*remove",
            FieldType::RemoveAll => "*remove_all",
            FieldType::None => "*none",
            FieldType::Other(s) => s,
        }
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s {
            "*constant" => FieldType::Constant,
            "*variable" => FieldType::Variable,
            "*composed" => FieldType::Composed,
            "*usage_difference" => FieldType::UsageDifference,
            "*template" => FieldType::Template,
            "*filler" => FieldType::Filler,
            "*sum" => FieldType::Sum,
            "*difference" => FieldType::Difference,
            "*cc_usage" => FieldType::CcUsage,
            "*group" => FieldType::Group,
            "*remove" => FieldType::Remove,
            "*remove_all" => FieldType::RemoveAll,
            "*none" => FieldType::None,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled template field.
///
/// `path` is private so the memoized [`FieldPath`] cannot drift from it;
/// use [`TemplateField::set_path`] to change both.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    pub tag: String,
    pub field_type: Option<FieldType>,
    path: String,
    pub attribute_id: String,
    pub filters: Vec<String>,
    pub value: Option<RsrParsers>,
    pub width: i64,
    pub strip: String,
    pub padding: String,
    pub mandatory: bool,
    pub new_branch: bool,
    pub timezone: String,
    pub blocker: bool,
    pub layout: String,
    pub cost_shift_digits: i64,
    pub rounding_decimals: Option<i64>,
    pub mask_destination_id: String,
    pub mask_length: i64,
    field_path: FieldPath,
}

impl TemplateField {
    /// A field with default attributes; the tag defaults to the path.
    pub fn new(path: &str, field_type: FieldType, value: Option<RsrParsers>) -> Self {
        Self {
            tag: path.to_string(),
            field_type: Some(field_type),
            path: path.to_string(),
            attribute_id: String::new(),
            filters: Vec::new(),
            value,
            width: 0,
            strip: String::new(),
            padding: String::new(),
            mandatory: false,
            new_branch: false,
            timezone: String::new(),
            blocker: false,
            layout: RFC3339_LAYOUT.to_string(),
            cost_shift_digits: 0,
            rounding_decimals: None,
            mask_destination_id: String::new(),
            mask_length: 0,
            field_path: FieldPath::parse(path),
        }
    }

    /// Compile one JSON field without template inlining.
    pub fn from_json(json: &FcTemplateJsonCfg, sep: &str) -> Result<Self> {
        let path = json.path.clone().unwrap_or_default();
        let value = json
            .value
            .as_deref()
            .map(|v| RsrParsers::new(v, sep))
            .transpose()?;
        Ok(Self {
            tag: json.tag.clone().unwrap_or_else(|| path.clone()),
            field_type: json.field_type.as_deref().map(FieldType::from),
            attribute_id: json.attribute_id.clone().unwrap_or_default(),
            filters: json.filters.clone().unwrap_or_default(),
            value,
            width: json.width.unwrap_or_default(),
            strip: json.strip.clone().unwrap_or_default(),
            padding: json.padding.clone().unwrap_or_default(),
            mandatory: json.mandatory.unwrap_or_default(),
            new_branch: json.new_branch.unwrap_or_default(),
            timezone: json.timezone.clone().unwrap_or_default(),
            blocker: json.blocker.unwrap_or_default(),
            layout: json
                .layout
                .clone()
                .unwrap_or_else(|| RFC3339_LAYOUT.to_string()),
            cost_shift_digits: json.cost_shift_digits.unwrap_or_default(),
            rounding_decimals: json.rounding_decimals,
            mask_destination_id: json.mask_destinationd_id.clone().unwrap_or_default(),
            mask_length: json.mask_length.unwrap_or_default(),
            field_path: FieldPath::parse(&path),
            path,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
        self.compute_path();
    }

    /// Recompute the memoized path decomposition.
    pub fn compute_path(&mut self) {
        self.field_path = FieldPath::parse(&self.path);
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    pub fn is_template_ref(&self) -> bool {
        self.field_type == Some(FieldType::Template)
    }

    /// Project to a JSON-like map. Zero-valued supplementary attributes are
    /// omitted, as is a layout equal to the default.
    pub fn as_map_interface(&self, sep: &str) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("tag".into(), Value::from(self.tag.clone()));
        m.insert("path".into(), Value::from(self.path.clone()));
        if let Some(t) = &self.field_type {
            m.insert("type".into(), Value::from(t.as_str()));
        }
        if let Some(v) = &self.value {
            m.insert("value".into(), Value::from(v.rule(sep)));
        }
        if !self.attribute_id.is_empty() {
            m.insert("attribute_id".into(), Value::from(self.attribute_id.clone()));
        }
        if !self.filters.is_empty() {
            m.insert("filters".into(), Value::from(self.filters.clone()));
        }
        if self.width != 0 {
            m.insert("width".into(), Value::from(self.width));
        }
        if !self.strip.is_empty() {
            m.insert("strip".into(), Value::from(self.strip.clone()));
        }
        if !self.padding.is_empty() {
            m.insert("padding".into(), Value::from(self.padding.clone()));
        }
        if self.mandatory {
            m.insert("mandatory".into(), Value::Bool(true));
        }
        if self.new_branch {
            m.insert("new_branch".into(), Value::Bool(true));
        }
        if !self.timezone.is_empty() {
            m.insert("timezone".into(), Value::from(self.timezone.clone()));
        }
        if self.blocker {
            m.insert("blocker".into(), Value::Bool(true));
        }
        if self.layout != RFC3339_LAYOUT {
            m.insert("layout".into(), Value::from(self.layout.clone()));
        }
        if self.cost_shift_digits != 0 {
            m.insert(
                "cost_shift_digits".into(),
                Value::from(self.cost_shift_digits),
            );
        }
        if let Some(rd) = self.rounding_decimals {
            m.insert("rounding_decimals".into(), Value::from(rd));
        }
        if !self.mask_destination_id.is_empty() {
            m.insert(
                "mask_destinationd_id".into(),
                Value::from(self.mask_destination_id.clone()),
            );
        }
        if self.mask_length != 0 {
            m.insert("mask_length".into(), Value::from(self.mask_length));
        }
        m
    }
}
