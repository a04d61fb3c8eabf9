//! Value rule parser and evaluator.
//!
//! A template field's `value` is a list of rules joined by the field
//! separator. Each rule is either a constant or a dynamic reference into
//! the event, optionally post-processed by search&replace steps and
//! converters:
//!
//! ```text
//! ~*req.Account                             dynamic, read from the event
//! 1001                                      constant
//! `a;b`                                     constant, separator not split
//! ~*req.Account:s/^(\d+)$/+$1/              dynamic with search&replace
//! ~*req.Usage{*duration_seconds&*round:2}   dynamic with converters
//! ```
//!
//! Grammar (informal):
//! ```text
//! rules    = rule (SEP rule)*
//! rule     = body [ "{" conv ("&" conv)* "}" ]
//! body     = "`" TEXT "`" | "~" PATH (":s/" SEARCH "/" TEMPLATE "/")* | TEXT
//! ```

use eventex_core::{ConfigError, FieldPath, Result, TargetRoot};
use regex_lite::Regex;

use crate::EvalError;
use crate::converter::DataConverter;

const DYNAMIC_PREFIX: char = '~';
const SEARCH_REPLACE_PREFIX: &str = ":s/";
const CONVERTER_OPEN: &str = "{*";
const CONVERTER_SEP: char = '&';
const UNSPLIT_QUOTE: char = '`';

/// Anything a dynamic rule can read a value from.
pub trait DataProvider {
    /// Resolve a dotted path to its string form. `None` when absent.
    fn field_as_string(&self, path: &str) -> Option<String>;
}

impl DataProvider for serde_json::Value {
    fn field_as_string(&self, path: &str) -> Option<String> {
        let fp = FieldPath::parse(path);
        let mut current = self;
        if fp.root != TargetRoot::Context {
            current = current.get(fp.root.as_str())?;
        }
        for item in &fp.items {
            current = current.get(&item.field)?;
            for idx in &item.index {
                current = match current {
                    serde_json::Value::Array(items) => items.get(idx.parse::<usize>().ok()?)?,
                    other => other.get(idx)?,
                };
            }
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }
}

/// What a rule reads before post-processing.
#[derive(Debug, Clone, PartialEq)]
enum Source {
    Constant(String),
    Dynamic(String),
}

/// One `:s/search/template/` step.
#[derive(Debug, Clone)]
struct SearchReplace {
    search: Regex,
    template: String,
}

impl PartialEq for SearchReplace {
    fn eq(&self, other: &Self) -> bool {
        self.search.as_str() == other.search.as_str() && self.template == other.template
    }
}

impl SearchReplace {
    fn parse(rule: &str) -> Result<Self> {
        let not_enough = || {
            ConfigError::InvalidSyntax(format!(
                "not enough members in Search&Replace, ruleStr: <{rule}>"
            ))
        };
        let body = rule.strip_suffix('/').ok_or_else(not_enough)?;
        let split = last_unescaped_slash(body).ok_or_else(not_enough)?;
        let (search, template) = (&body[..split], &body[split + 1..]);
        if search.is_empty() {
            return Err(not_enough());
        }
        let search = Regex::new(search).map_err(|_| {
            ConfigError::InvalidSyntax(format!(
                "invalid Search&Replace subfield rule: <{search}>"
            ))
        })?;
        Ok(Self {
            search,
            template: template.to_string(),
        })
    }

    /// Expand the template for the first match; pass the input through otherwise.
    fn apply(&self, input: &str) -> String {
        match self.search.captures(input) {
            Some(caps) => {
                let mut out = String::new();
                caps.expand(&self.template, &mut out);
                out
            }
            None => input.to_string(),
        }
    }
}

fn last_unescaped_slash(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b'/' && (i == 0 || bytes[i - 1] != b'\\'))
}

/// A single compiled value rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RsrParser {
    rule: String,
    source: Source,
    search_replace: Vec<SearchReplace>,
    converters: Vec<DataConverter>,
}

impl RsrParser {
    pub fn new(rule: &str) -> Result<Self> {
        let mut body = rule;
        let mut converters = Vec::new();
        if let Some(open) = body.find(CONVERTER_OPEN) {
            if !body.ends_with('}') {
                return Err(ConfigError::InvalidSyntax(format!(
                    "invalid converter terminator in rule: <{rule}>"
                )));
            }
            for def in body[open + 1..body.len() - 1].split(CONVERTER_SEP) {
                let conv = DataConverter::parse(def).map_err(|e| {
                    ConfigError::InvalidSyntax(format!(
                        "invalid converter value in string: <{def}>, err: {e}"
                    ))
                })?;
                converters.push(conv);
            }
            body = &body[..open];
        }

        let (source, search_replace) = if let Some(quoted) = body
            .strip_prefix(UNSPLIT_QUOTE)
            .and_then(|b| b.strip_suffix(UNSPLIT_QUOTE))
        {
            (Source::Constant(quoted.to_string()), Vec::new())
        } else if let Some(dynamic) = body
            .strip_prefix(DYNAMIC_PREFIX)
            .filter(|d| !d.is_empty())
        {
            let mut parts = dynamic.split(SEARCH_REPLACE_PREFIX);
            let path = parts.next().unwrap_or_default().to_string();
            let steps = parts.map(SearchReplace::parse).collect::<Result<Vec<_>>>()?;
            (Source::Dynamic(path), steps)
        } else {
            (Source::Constant(body.to_string()), Vec::new())
        };

        Ok(Self {
            rule: rule.to_string(),
            source,
            search_replace,
            converters,
        })
    }

    /// The rule text as written.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.source, Source::Constant(_))
    }

    /// The path a dynamic rule reads, `None` for constants.
    pub fn path(&self) -> Option<&str> {
        match &self.source {
            Source::Dynamic(path) => Some(path),
            Source::Constant(_) => None,
        }
    }

    /// Evaluate against an already-extracted input. Constants ignore `input`.
    pub fn parse_value(&self, input: &str) -> std::result::Result<String, EvalError> {
        match &self.source {
            Source::Constant(c) => self.process(c.clone()),
            Source::Dynamic(_) => self.process(input.to_string()),
        }
    }

    pub fn parse_data_provider(
        &self,
        dp: &dyn DataProvider,
    ) -> std::result::Result<String, EvalError> {
        match &self.source {
            Source::Constant(c) => self.process(c.clone()),
            Source::Dynamic(path) => {
                let raw = dp
                    .field_as_string(path)
                    .ok_or_else(|| EvalError::NotFound(path.clone()))?;
                self.process(raw)
            }
        }
    }

    fn process(&self, mut value: String) -> std::result::Result<String, EvalError> {
        for step in &self.search_replace {
            value = step.apply(&value);
        }
        for conv in &self.converters {
            value = conv.convert(&value)?;
        }
        Ok(value)
    }
}

/// An ordered list of rules whose outputs are concatenated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RsrParsers(Vec<RsrParser>);

impl RsrParsers {
    /// Compile a separator-joined rule string. An empty string gives an
    /// empty list.
    pub fn new(rules: &str, sep: &str) -> Result<Self> {
        if rules.is_empty() {
            return Ok(Self::default());
        }
        split_rules(rules, sep)?
            .iter()
            .map(|r| RsrParser::new(r))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn from_rules<S: AsRef<str>>(rules: &[S]) -> Result<Self> {
        rules
            .iter()
            .map(|r| RsrParser::new(r.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Original rule text, re-joined with `sep`.
    pub fn rule(&self, sep: &str) -> String {
        self.0
            .iter()
            .map(RsrParser::rule)
            .collect::<Vec<_>>()
            .join(sep)
    }

    pub fn parse_value(&self, input: &str) -> std::result::Result<String, EvalError> {
        self.0.iter().map(|p| p.parse_value(input)).collect()
    }

    pub fn parse_data_provider(
        &self,
        dp: &dyn DataProvider,
    ) -> std::result::Result<String, EvalError> {
        self.0.iter().map(|p| p.parse_data_provider(dp)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RsrParser> {
        self.0.iter()
    }
}

// ─── Splitting ───────────────────────────────────────────────────────

/// Split on `sep` outside backtick-quoted segments.
fn split_rules(rules: &str, sep: &str) -> Result<Vec<String>> {
    if rules.matches(UNSPLIT_QUOTE).count() % 2 != 0 {
        return Err(ConfigError::InvalidSyntax(format!(
            "unclosed unsplit syntax in rule: <{rules}>"
        )));
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for (i, part) in rules.split(UNSPLIT_QUOTE).enumerate() {
        if i % 2 == 1 {
            current.push(UNSPLIT_QUOTE);
            current.push_str(part);
            current.push(UNSPLIT_QUOTE);
            continue;
        }
        if sep.is_empty() {
            current.push_str(part);
            continue;
        }
        let mut pieces = part.split(sep);
        current.push_str(pieces.next().unwrap_or_default());
        for piece in pieces {
            out.push(std::mem::take(&mut current));
            current.push_str(piece);
        }
    }
    out.push(current);
    Ok(out)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constant_and_dynamic_rules() {
        let p = RsrParser::new("1001").unwrap();
        assert!(p.is_constant());
        assert_eq!(p.parse_value("ignored").unwrap(), "1001");

        let p = RsrParser::new("~*req.Account").unwrap();
        assert_eq!(p.path(), Some("*req.Account"));
        assert_eq!(p.parse_value("1002").unwrap(), "1002");

        let p = RsrParser::new("~").unwrap();
        assert!(p.is_constant());
        assert_eq!(p.parse_value("x").unwrap(), "~");
    }

    #[test]
    fn empty_rule_string_gives_empty_list() {
        let rules = RsrParsers::new("", ";").unwrap();
        assert!(rules.is_empty());
        assert_eq!(rules.rule(";"), "");
        assert_eq!(rules.parse_value("x").unwrap(), "");
    }

    #[test]
    fn rules_concatenate_and_render_back() {
        let rules = RsrParsers::new("~*req.Tenant;:;~*req.Account", ";").unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.rule(";"), "~*req.Tenant;:;~*req.Account");

        let event = json!({"*req": {"Tenant": "cgrates.org", "Account": "1001"}});
        assert_eq!(rules.parse_data_provider(&event).unwrap(), "cgrates.org:1001");
    }

    #[test]
    fn backticks_protect_the_separator() {
        let rules = RsrParsers::new("`a;b`;c", ";").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.parse_value("").unwrap(), "a;bc");
        assert_eq!(rules.rule(";"), "`a;b`;c");

        let err = RsrParsers::new("`a;b", ";").unwrap_err();
        assert_eq!(err.to_string(), "unclosed unsplit syntax in rule: <`a;b>");
    }

    #[test]
    fn search_replace_only_rewrites_matches() {
        let p = RsrParser::new(r"~*req.Account:s/^(\d+)$/+$1/").unwrap();
        assert_eq!(p.parse_value("1001").unwrap(), "+1001");
        assert_eq!(p.parse_value("abc").unwrap(), "abc");
    }

    #[test]
    fn search_replace_errors() {
        let err = RsrParser::new("~*req.Account:s/abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough members in Search&Replace, ruleStr: <abc>"
        );

        let err = RsrParser::new("~*req.Account:s/(abc/x/").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid Search&Replace subfield rule: <(abc>"
        );
    }

    #[test]
    fn converters_run_after_extraction() {
        let p = RsrParser::new("~*req.Usage{*duration_seconds&*round:1}").unwrap();
        assert_eq!(p.parse_value("1m30s500ms").unwrap(), "90.5");
        assert_eq!(p.rule(), "~*req.Usage{*duration_seconds&*round:1}");
    }

    #[test]
    fn converter_syntax_errors() {
        let err = RsrParser::new("a{*").unwrap_err();
        assert_eq!(err.to_string(), "invalid converter terminator in rule: <a{*>");

        let err = RsrParser::new("a{*bogus}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid converter value in string: <*bogus>, err: unsupported converter definition: <*bogus>"
        );
    }

    #[test]
    fn missing_event_field_is_reported() {
        let p = RsrParser::new("~*req.Missing").unwrap();
        let err = p.parse_data_provider(&json!({"*req": {}})).unwrap_err();
        assert_eq!(err, EvalError::NotFound("*req.Missing".into()));
    }

    #[test]
    fn provider_walks_indexes_and_non_strings() {
        let event = json!({"*req": {"Items": [{"Cost": 1.5}, {"Cost": 2}], "Flag": true}});
        assert_eq!(
            event.field_as_string("*req.Items[1].Cost").as_deref(),
            Some("2")
        );
        assert_eq!(event.field_as_string("*req.Flag").as_deref(), Some("true"));
        assert_eq!(event.field_as_string("*req.Items[7].Cost"), None);
    }

    #[test]
    fn equality_compares_rule_text() {
        let a = RsrParsers::new(r"~*req.A:s/^x$/y/", ";").unwrap();
        let b = RsrParsers::new(r"~*req.A:s/^x$/y/", ";").unwrap();
        let c = RsrParsers::new(r"~*req.A:s/^x$/z/", ";").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
