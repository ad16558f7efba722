//! `check-json` and `pretty-format-json`

use super::{BuildContext, comma_list, parse_args};
use crate::fileset::FileRef;
use crate::hooks::{Finding, FixOutcome, Fixer, ValidationContext, Validator};
use hookgate_core::{Error, Result};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Strip serde_json's location suffix, the line is reported separately
fn error_message(e: &serde_json::Error) -> String {
    let full = e.to_string();
    match full.rsplit_once(" at line ") {
        Some((message, _)) => message.to_string(),
        None => full,
    }
}

fn syntax_finding(file: FileRef<'_>, e: &serde_json::Error) -> Finding {
    Finding::syntax(file.path, error_message(e)).at_line(e.line().max(1))
}

/// Walks a JSON document, rejecting objects with repeated keys
struct UniqueKeys;

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = UniqueKeys;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<UniqueKeys, A::Error> {
        while seq.next_element::<UniqueKeys>()?.is_some() {}
        Ok(UniqueKeys)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<UniqueKeys, A::Error> {
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            if seen.contains(&key) {
                return Err(de::Error::custom(format!("Duplicate key: {key:?}")));
            }
            map.next_value::<UniqueKeys>()?;
            seen.insert(key);
        }
        Ok(UniqueKeys)
    }
}

#[derive(clap::Parser, Debug)]
struct CheckJsonArgs {}

/// Fails on files that are not valid JSON or that repeat a key within an object
#[derive(Debug)]
pub struct CheckJson;

impl CheckJson {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let CheckJsonArgs {} = parse_args(ctx)?;
        Ok(Self)
    }
}

impl Validator for CheckJson {
    fn validate(&self, files: &[FileRef<'_>], _: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        Ok(files
            .iter()
            .filter_map(|file| {
                serde_json::from_slice::<UniqueKeys>(file.content)
                    .err()
                    .map(|e| syntax_finding(*file, &e))
            })
            .collect())
    }
}

#[derive(clap::Parser, Debug)]
struct PrettyArgs {
    /// Rewrite files that are not pretty-formatted
    #[arg(long)]
    autofix: bool,

    /// Number of spaces, or a literal indent string
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    indent: String,

    /// Keep non-ASCII characters instead of escaping them
    #[arg(long)]
    no_ensure_ascii: bool,

    /// Keep the original key order
    #[arg(long)]
    no_sort_keys: bool,

    /// Keys placed first in every object, in this order
    #[arg(long, default_value = "")]
    top_keys: String,
}

/// Rewrites JSON with a fixed indent and key order
#[derive(Debug)]
pub struct PrettyFormatJson {
    autofix: bool,
    indent: String,
    ensure_ascii: bool,
    sort_keys: bool,
    top_keys: Vec<String>,
}

impl PrettyFormatJson {
    pub(crate) fn from_args(ctx: &BuildContext<'_>) -> Result<Self> {
        let args: PrettyArgs = parse_args(ctx)?;

        let indent = if !args.indent.is_empty() && args.indent.bytes().all(|b| b.is_ascii_digit())
        {
            let width: usize = args.indent.parse().map_err(|_| Error::HookArgs {
                hook_id: ctx.hook_id.to_string(),
                message: format!("invalid indent '{}'", args.indent),
            })?;
            " ".repeat(width)
        } else {
            args.indent
        };

        Ok(Self {
            autofix: args.autofix,
            indent,
            ensure_ascii: !args.no_ensure_ascii,
            sort_keys: !args.no_sort_keys,
            top_keys: comma_list(&args.top_keys),
        })
    }

    /// Reorder object keys: top keys first in their given order, then the rest
    fn arrange(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut top: Vec<(usize, String, Value)> = Vec::new();
                let mut rest: Vec<(String, Value)> = Vec::new();

                for (key, value) in map {
                    let value = self.arrange(value);
                    match self.top_keys.iter().position(|k| *k == key) {
                        Some(rank) => top.push((rank, key, value)),
                        None => rest.push((key, value)),
                    }
                }

                top.sort_by_key(|(rank, _, _)| *rank);
                if self.sort_keys {
                    rest.sort_by(|a, b| a.0.cmp(&b.0));
                }

                let mut out = Map::new();
                out.extend(top.into_iter().map(|(_, k, v)| (k, v)));
                out.extend(rest);
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.arrange(v)).collect()),
            other => other,
        }
    }

    fn render(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| Error::Message(format!("Failed to format JSON: {e}")))?;

        let mut text = String::from_utf8(buf)
            .map_err(|e| Error::Message(format!("Formatted JSON is not UTF-8: {e}")))?;
        if self.ensure_ascii {
            text = escape_non_ascii(&text);
        }
        text.push('\n');
        Ok(text.into_bytes())
    }
}

/// Replace every non-ASCII character with `\uXXXX` escapes (UTF-16, lowercase hex)
fn escape_non_ascii(text: &str) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}

impl Fixer for PrettyFormatJson {
    fn fix(&self, file: FileRef<'_>) -> Result<FixOutcome> {
        let value: Value = match serde_json::from_slice(file.content) {
            Ok(value) => value,
            Err(e) => return Ok(FixOutcome::Rejected(syntax_finding(file, &e))),
        };

        let pretty = self.render(&self.arrange(value))?;
        if pretty == file.content {
            return Ok(FixOutcome::Unchanged);
        }

        if self.autofix {
            Ok(FixOutcome::Fixed(pretty))
        } else {
            Ok(FixOutcome::Rejected(Finding::warning(
                file.path,
                "File is not pretty-formatted (run with --autofix to fix)",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::super::test_support::{args, ctx, fix, rel};
    use super::*;
    use crate::hooks::FindingKind;
    use hookgate_config::PipelineConfig;
    use std::collections::BTreeSet;
    use std::path::Path;

    fn pretty(values: &[&str]) -> PrettyFormatJson {
        let config = PipelineConfig::default();
        let args = args(values);
        PrettyFormatJson::from_args(&ctx("pretty-format-json", &args, &config)).unwrap()
    }

    fn check(path: &str, content: &[u8]) -> Vec<Finding> {
        let path = rel(path);
        let known = BTreeSet::new();
        let ctx = ValidationContext {
            root: Path::new("."),
            known_paths: &known,
        };
        CheckJson
            .validate(
                &[FileRef {
                    path: &path,
                    content,
                }],
                &ctx,
            )
            .unwrap()
    }

    #[test]
    fn test_check_json_accepts_valid() {
        assert!(check("a.json", br#"{"a": [1, 2.5, null, true, "x"]}"#).is_empty());
    }

    #[test]
    fn test_check_json_reports_line() {
        let findings = check("a.json", b"{\n  \"a\": 1,\n  \"b\": \n}\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::SyntaxError);
        assert_eq!(findings[0].line, Some(4));
    }

    #[test]
    fn test_check_json_rejects_duplicate_keys() {
        let findings = check("a.json", b"{\"a\": {\"x\": 1, \"x\": 2}}");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Duplicate key: \"x\""));
    }

    #[test]
    fn test_check_json_empty_file() {
        assert_eq!(check("a.json", b"").len(), 1);
    }

    #[test]
    fn test_autofix_indent_four_keeps_order() {
        let input = br#"{"b": 1, "a": {"z": [1, 2], "y": "t"}}"#;
        let outcome = fix(
            &pretty(&["--autofix", "--indent=4", "--no-sort-keys"]),
            "a.json",
            input,
        );
        let FixOutcome::Fixed(out) = outcome else {
            panic!("expected a fix");
        };

        let expected = "{\n    \"b\": 1,\n    \"a\": {\n        \"z\": [\n            1,\n            2\n        ],\n        \"y\": \"t\"\n    }\n}\n";
        assert_eq!(String::from_utf8(out.clone()).unwrap(), expected);

        let before: Value = serde_json::from_slice(input).unwrap();
        let after: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_numbers_are_kept_verbatim() {
        let input = br#"{"id": 123456789012345678901234567890, "f": 0.10000000000000000001}"#;
        let FixOutcome::Fixed(out) = fix(
            &pretty(&["--autofix", "--indent=4", "--no-sort-keys"]),
            "a.json",
            input,
        ) else {
            panic!("expected a fix");
        };
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n    \"id\": 123456789012345678901234567890,\n    \"f\": 0.10000000000000000001\n}\n"
        );
    }

    #[test]
    fn test_check_json_accepts_large_numbers() {
        assert!(check("a.json", b"[123456789012345678901234567890, 0.10000000000000000001]").is_empty());
    }

    #[test]
    fn test_sort_keys_by_default() {
        let FixOutcome::Fixed(out) = fix(&pretty(&["--autofix"]), "a.json", br#"{"b":1,"a":2}"#)
        else {
            panic!("expected a fix");
        };
        assert_eq!(out, b"{\n  \"a\": 2,\n  \"b\": 1\n}\n");
    }

    #[test]
    fn test_top_keys_come_first() {
        let formatter = pretty(&["--autofix", "--top-keys=name,version"]);
        let FixOutcome::Fixed(out) = fix(
            &formatter,
            "a.json",
            br#"{"deps":{"version":1,"a":2},"version":"1","name":"x"}"#,
        ) else {
            panic!("expected a fix");
        };
        let text = String::from_utf8(out).unwrap();
        let name = text.find("\"name\"").unwrap();
        let version = text.find("\"version\": \"1\"").unwrap();
        let deps = text.find("\"deps\"").unwrap();
        assert!(name < version && version < deps);
        // Nested objects are arranged too
        assert!(text.find("\"version\": 1").unwrap() < text.find("\"a\": 2").unwrap());
    }

    #[test]
    fn test_ensure_ascii() {
        let FixOutcome::Fixed(out) = fix(&pretty(&["--autofix"]), "a.json", "[\"é😀\"]".as_bytes())
        else {
            panic!("expected a fix");
        };
        assert_eq!(out, b"[\n  \"\\u00e9\\ud83d\\ude00\"\n]\n");

        let FixOutcome::Fixed(out) = fix(
            &pretty(&["--autofix", "--no-ensure-ascii"]),
            "a.json",
            "[\"é\"]".as_bytes(),
        ) else {
            panic!("expected a fix");
        };
        assert_eq!(String::from_utf8(out).unwrap(), "[\n  \"é\"\n]\n");
    }

    #[test]
    fn test_literal_indent() {
        let FixOutcome::Fixed(out) = fix(&pretty(&["--autofix", "--indent=\t"]), "a.json", b"[1]")
        else {
            panic!("expected a fix");
        };
        assert_eq!(out, b"[\n\t1\n]\n");
    }

    #[test]
    fn test_without_autofix_rejects() {
        let FixOutcome::Rejected(finding) = fix(&pretty(&[]), "a.json", br#"{"a":1}"#) else {
            panic!("expected a rejection");
        };
        assert_eq!(finding.kind, FindingKind::ContentWarning);
    }

    #[test]
    fn test_already_pretty_is_unchanged() {
        assert_eq!(
            fix(&pretty(&["--autofix"]), "a.json", b"{\n  \"a\": 1\n}\n"),
            FixOutcome::Unchanged
        );
        assert_eq!(fix(&pretty(&["--autofix"]), "a.json", b"{}\n"), FixOutcome::Unchanged);
    }

    #[test]
    fn test_invalid_json_is_syntax_error() {
        let FixOutcome::Rejected(finding) = fix(&pretty(&["--autofix"]), "a.json", b"{\"a\":") else {
            panic!("expected a rejection");
        };
        assert_eq!(finding.kind, FindingKind::SyntaxError);
    }
}
