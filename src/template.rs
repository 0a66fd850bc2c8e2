//! # Preset Template Validation
//!
//! A preset template arrives as a generic YAML tree (whatever `serde_yaml`
//! produced from an embedded block) and leaves as a `Template`, or as an
//! error naming the first offending field.
//!
//! The checks are written by hand rather than derived because the input is
//! deliberately loose:
//!
//! - `provides` and `requires` accept either a mapping or a list of strings.
//! - An option's variant may be written flat, with `kind` as a string and the
//!   variant fields next to it, or nested, as a `variant` (or `kind`) object
//!   carrying its own fields.
//!
//! Field names in errors are paths from the document root, such as
//! `options[1].children[0].id`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// What a template describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Ruleset,
    Variant,
    Tailoring,
}

impl FromStr for TemplateKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ruleset" => Ok(TemplateKind::Ruleset),
            "variant" => Ok(TemplateKind::Variant),
            "tailoring" => Ok(TemplateKind::Tailoring),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateKind::Ruleset => "ruleset",
            TemplateKind::Variant => "variant",
            TemplateKind::Tailoring => "tailoring",
        })
    }
}

/// A validated preset template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub title: String,
    pub kind: TemplateKind,
    pub description: String,
    pub authors: Vec<String>,
    pub provides: Mapping,
    pub requires: Mapping,
    pub deps: Vec<String>,
    pub options: Vec<PresetOption>,
}

/// One node of a template's option tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetOption {
    pub id: String,
    pub title: Option<String>,
    pub variant: OptionVariant,
}

/// Either a group of nested options or a boolean flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OptionVariant {
    Group { children: Vec<PresetOption> },
    Flag { default: Option<bool> },
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> Error {
    Error::TemplateValidation {
        field: field.into(),
        message: message.into(),
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// `null` counts as absent, so `authors:` with nothing after it is allowed
fn present<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn required_string(map: &Mapping, key: &str, prefix: &str) -> Result<String> {
    match present(map, key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(field_path(prefix, key), "expected a string")),
        None => Err(invalid(field_path(prefix, key), "required string is missing")),
    }
}

fn optional_string(map: &Mapping, key: &str, prefix: &str) -> Result<Option<String>> {
    match present(map, key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field_path(prefix, key), "expected a string")),
        None => Ok(None),
    }
}

fn string_list(map: &Mapping, key: &str) -> Result<Vec<String>> {
    let Some(value) = present(map, key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_sequence()
        .ok_or_else(|| invalid(key, "expected a list of strings"))?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(format!("{key}[{idx}]"), "expected a string"))
        })
        .collect()
}

/// A mapping kept as-is, or a list of names each mapped to `true`
fn capability_map(map: &Mapping, key: &str) -> Result<Mapping> {
    match present(map, key) {
        None => Ok(Mapping::new()),
        Some(Value::Mapping(mapping)) => Ok(mapping.clone()),
        Some(Value::Sequence(items)) => {
            let mut mapping = Mapping::new();
            for (idx, item) in items.iter().enumerate() {
                let name = item
                    .as_str()
                    .ok_or_else(|| invalid(format!("{key}[{idx}]"), "expected a string"))?;
                mapping.insert(Value::String(name.to_string()), Value::Bool(true));
            }
            Ok(mapping)
        }
        Some(_) => Err(invalid(key, "expected a mapping or a list of strings")),
    }
}

/// Validate a deserialized document into a `Template`.
pub fn parse_template(doc: &Value) -> Result<Template> {
    let map = doc
        .as_mapping()
        .ok_or_else(|| invalid("document", "expected a mapping at the top level"))?;

    let title = required_string(map, "title", "")?;
    let kind_name = required_string(map, "kind", "")?;
    let kind = kind_name.parse::<TemplateKind>().map_err(|()| {
        invalid(
            "kind",
            format!("must be one of 'ruleset', 'variant', 'tailoring', got '{kind_name}'"),
        )
    })?;
    let description = required_string(map, "description", "")?;
    let authors = string_list(map, "authors")?;
    let provides = capability_map(map, "provides")?;
    let requires = capability_map(map, "requires")?;
    let deps = string_list(map, "deps")?;
    let options = match present(map, "options") {
        None => Vec::new(),
        Some(Value::Sequence(items)) => parse_options(items, "options")?,
        Some(_) => return Err(invalid("options", "expected a list of options")),
    };

    Ok(Template {
        title,
        kind,
        description,
        authors,
        provides,
        requires,
        deps,
        options,
    })
}

fn parse_options(items: &[Value], path: &str) -> Result<Vec<PresetOption>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_option(item, &format!("{path}[{idx}]")))
        .collect()
}

fn parse_option(value: &Value, path: &str) -> Result<PresetOption> {
    let map = value
        .as_mapping()
        .ok_or_else(|| invalid(path, "expected an option mapping"))?;

    let id = required_string(map, "id", path)?;
    let title = match optional_string(map, "title", path)? {
        Some(title) => Some(title),
        None => present(map, "description")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    let (kind, fields, fields_path) = discriminator(map, path)?;
    let variant = match kind.as_str() {
        "group" => {
            let children = match present(&fields, "children") {
                Some(Value::Sequence(items)) => {
                    parse_options(items, &field_path(&fields_path, "children"))?
                }
                Some(_) => {
                    return Err(invalid(
                        field_path(&fields_path, "children"),
                        "expected a list of options",
                    ))
                }
                None => {
                    return Err(invalid(
                        field_path(&fields_path, "children"),
                        "a group requires a list of children",
                    ))
                }
            };
            OptionVariant::Group { children }
        }
        "flag" => {
            let default = match present(&fields, "default") {
                None => None,
                Some(Value::Bool(default)) => Some(*default),
                Some(_) => {
                    return Err(invalid(
                        field_path(&fields_path, "default"),
                        "expected a boolean",
                    ))
                }
            };
            OptionVariant::Flag { default }
        }
        other => {
            return Err(invalid(
                field_path(path, "kind"),
                format!("unknown option kind '{other}', expected 'group' or 'flag'"),
            ))
        }
    };

    Ok(PresetOption { id, title, variant })
}

/// Find an option's variant name and the mapping holding its fields.
///
/// Returns the name, the fields, and the path of the fields for errors.
fn discriminator(map: &Mapping, path: &str) -> Result<(String, Mapping, String)> {
    match present(map, "kind") {
        Some(Value::String(kind)) => return Ok((kind.clone(), map.clone(), path.to_string())),
        Some(Value::Mapping(nested)) => return nested_variant(nested, &field_path(path, "kind")),
        Some(_) => {
            return Err(invalid(
                field_path(path, "kind"),
                "expected a string or a mapping",
            ))
        }
        None => {}
    }

    match present(map, "variant") {
        Some(Value::Mapping(nested)) => nested_variant(nested, &field_path(path, "variant")),
        Some(_) => Err(invalid(field_path(path, "variant"), "expected a mapping")),
        None => Err(invalid(
            field_path(path, "kind"),
            "an option needs a 'kind' or 'variant'",
        )),
    }
}

/// `{ kind: flag, default: true }` or `{ flag: { default: true } }`
fn nested_variant(nested: &Mapping, path: &str) -> Result<(String, Mapping, String)> {
    if let Some(Value::String(kind)) = present(nested, "kind") {
        return Ok((kind.clone(), nested.clone(), path.to_string()));
    }

    let mut entries = nested.iter();
    if let (Some((Value::String(kind), fields)), None) = (entries.next(), entries.next()) {
        let fields_path = field_path(path, kind);
        let fields = match fields {
            Value::Null => Mapping::new(),
            Value::Mapping(fields) => fields.clone(),
            _ => return Err(invalid(fields_path, "expected a mapping")),
        };
        return Ok((kind.clone(), fields, fields_path));
    }

    Err(invalid(
        path,
        "expected a 'kind' field or a single-key mapping naming the kind",
    ))
}
