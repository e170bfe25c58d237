//! Path queries over structured key/value documents: `$.key.sub[0]` style,
//! evaluated against a parsed YAML value.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    segments: Vec<Segment>,
}

impl PathQuery {
    /// Parse a query of the form `$.a.b[2].c` (the leading `$` and the first
    /// dot are optional). Empty key segments and malformed index brackets
    /// are rejected with a reason.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut rest = raw.trim();
        rest = rest.strip_prefix('$').unwrap_or(rest);
        if rest.is_empty() {
            return Err("query selects nothing".to_string());
        }

        let chars: Vec<char> = rest.chars().collect();
        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut first = true;

        while cursor < chars.len() {
            match chars[cursor] {
                '.' => {
                    cursor += 1;
                    segments.push(Segment::Key(take_key(&chars, &mut cursor)?));
                }
                '[' => {
                    cursor += 1;
                    segments.push(Segment::Index(take_index(&chars, &mut cursor)?));
                }
                _ if first => {
                    segments.push(Segment::Key(take_key(&chars, &mut cursor)?));
                }
                other => return Err(format!("unexpected character '{other}'")),
            }
            first = false;
        }

        if segments.is_empty() {
            return Err("query selects nothing".to_string());
        }

        Ok(Self { segments })
    }

    /// Walk the document along the segments. Returns the addressed node, or
    /// `None` as soon as a key or index is absent.
    pub fn evaluate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut node = root;
        for segment in &self.segments {
            node = match segment {
                Segment::Key(key) => node.get(key.as_str())?,
                Segment::Index(index) => node.get(*index)?,
            };
        }
        Some(node)
    }
}

fn take_key(chars: &[char], cursor: &mut usize) -> Result<String, String> {
    let start = *cursor;
    while *cursor < chars.len() && !matches!(chars[*cursor], '.' | '[' | ']') {
        *cursor += 1;
    }

    if *cursor == start {
        return Err("empty key segment".to_string());
    }
    Ok(chars[start..*cursor].iter().collect())
}

fn take_index(chars: &[char], cursor: &mut usize) -> Result<usize, String> {
    let start = *cursor;
    while *cursor < chars.len() && chars[*cursor].is_ascii_digit() {
        *cursor += 1;
    }

    if *cursor == start {
        return Err("empty index segment".to_string());
    }
    if *cursor >= chars.len() || chars[*cursor] != ']' {
        return Err("unterminated index segment".to_string());
    }

    let digits: String = chars[start..*cursor].iter().collect();
    *cursor += 1;
    digits
        .parse()
        .map_err(|_| format!("index out of range: {digits}"))
}

/// The scalar string representation of a queried node. Sequences yield their
/// first element; mappings and nulls have no representation.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Sequence(sequence) => sequence.first().and_then(scalar_string),
        _ => None,
    }
}

/// Run a path query against a YAML file. The file must carry a `.yml` or
/// `.yaml` extension; the query must parse; the addressed node must have a
/// scalar representation.
pub fn query_file(file: &Path, raw_query: &str) -> Result<String, ResolveError> {
    let is_yaml = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false);
    if !is_yaml {
        return Err(ResolveError::NotYamlFile {
            file: file.to_path_buf(),
        });
    }

    let query = PathQuery::parse(raw_query).map_err(|reason| ResolveError::InvalidQuery {
        query: raw_query.to_string(),
        reason,
    })?;

    let text = fs::read_to_string(file).map_err(|source| ResolveError::FileRead {
        file: file.to_path_buf(),
        source,
    })?;
    let document: Value = serde_yaml::from_str(&text).map_err(|source| ResolveError::YamlParse {
        file: file.to_path_buf(),
        source,
    })?;

    query
        .evaluate(&document)
        .and_then(scalar_string)
        .ok_or_else(|| ResolveError::EmptyQueryResult {
            query: raw_query.to_string(),
            file: file.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).expect("parse fixture yaml")
    }

    #[test]
    fn parse_accepts_rooted_and_bare_queries() {
        let rooted = PathQuery::parse("$.project.name").expect("rooted query");
        let bare = PathQuery::parse("project.name").expect("bare query");
        assert_eq!(rooted, bare);
    }

    #[test]
    fn parse_rejects_malformed_queries() {
        assert!(PathQuery::parse("").is_err());
        assert!(PathQuery::parse("$").is_err());
        assert!(PathQuery::parse("$.").is_err());
        assert!(PathQuery::parse("$.a..b").is_err());
        assert!(PathQuery::parse("$.a[").is_err());
        assert!(PathQuery::parse("$.a[x]").is_err());
        assert!(PathQuery::parse("$.a[1").is_err());
    }

    #[test]
    fn evaluate_walks_mappings_and_sequences() {
        let document = doc("project:\n  owners:\n    - alice\n    - bob\n  port: 8080\n");

        let owners = PathQuery::parse("$.project.owners[1]").expect("parse query");
        assert_eq!(
            owners.evaluate(&document).and_then(scalar_string),
            Some("bob".to_string())
        );

        let port = PathQuery::parse("$.project.port").expect("parse query");
        assert_eq!(
            port.evaluate(&document).and_then(scalar_string),
            Some("8080".to_string())
        );
    }

    #[test]
    fn missing_paths_evaluate_to_none() {
        let document = doc("key: value\n");
        let query = PathQuery::parse("$.absent.path").expect("parse query");
        assert!(query.evaluate(&document).is_none());
    }

    #[test]
    fn sequences_take_their_first_scalar() {
        let document = doc("tags:\n  - primary\n  - secondary\n");
        let query = PathQuery::parse("$.tags").expect("parse query");
        assert_eq!(
            query.evaluate(&document).and_then(scalar_string),
            Some("primary".to_string())
        );
    }

    #[test]
    fn mappings_have_no_scalar_representation() {
        let document = doc("nested:\n  key: value\n");
        let query = PathQuery::parse("$.nested").expect("parse query");
        assert_eq!(query.evaluate(&document).and_then(scalar_string), None);
    }

    #[test]
    fn query_file_requires_yaml_extension() {
        let temp = tempdir().expect("create temp dir");
        let file = temp.path().join("config.toml");
        std::fs::write(&file, "key: value").expect("write file");

        let err = query_file(&file, "$.key").expect_err("non-yaml extension must fail");
        assert!(matches!(err, ResolveError::NotYamlFile { .. }));
    }

    #[test]
    fn query_file_resolves_nested_value() {
        let temp = tempdir().expect("create temp dir");
        let file = temp.path().join("config.yml");
        std::fs::write(&file, "service:\n  name: billing\n").expect("write file");

        let value = query_file(&file, "$.service.name").expect("query should resolve");
        assert_eq!(value, "billing");
    }

    #[test]
    fn query_file_reports_empty_results() {
        let temp = tempdir().expect("create temp dir");
        let file = temp.path().join("config.yaml");
        std::fs::write(&file, "key: value\n").expect("write file");

        let err = query_file(&file, "$.other").expect_err("absent path must fail");
        assert!(matches!(err, ResolveError::EmptyQueryResult { .. }));
    }
}
