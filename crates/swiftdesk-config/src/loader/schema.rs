//! Shape checks for a single config layer.
//!
//! A layer may set any subset of keys, and `null` is accepted everywhere
//! because it unsets a key during merging. Unknown keys are rejected so a
//! typo does not silently fall back to a default.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Expected JSON shape of one leaf.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Count,
    Number,
    Provider,
    /// Object mapping model names to numbers.
    Rates,
}

type Section = (&'static str, &'static [(&'static str, Kind)]);

const SECTIONS: &[Section] = &[
    ("server", &[("bind", Kind::Text)]),
    (
        "chat",
        &[
            ("endpoint", Kind::Text),
            ("api_key_env", Kind::Text),
            ("default_model", Kind::Text),
            ("default_temperature", Kind::Number),
            ("history_window", Kind::Count),
            ("timeout_secs", Kind::Count),
        ],
    ),
    (
        "search",
        &[
            ("endpoint", Kind::Text),
            ("api_key_env", Kind::Text),
            ("default_count", Kind::Count),
            ("timeout_secs", Kind::Count),
        ],
    ),
    (
        "store",
        &[
            ("provider", Kind::Provider),
            ("path", Kind::Text),
            ("url", Kind::Text),
            ("auth_env", Kind::Text),
            ("timeout_secs", Kind::Count),
        ],
    ),
    (
        "usage",
        &[
            ("path", Kind::Text),
            ("fallback_rate", Kind::Number),
            ("rates", Kind::Rates),
        ],
    ),
];

const PROVIDERS: [&str; 3] = ["memory", "file", "firebase"];

/// Check one layer document. `layer` prefixes the path in error messages.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let fail = |path: &str, message: &str| ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    };
    let root = value
        .as_object()
        .ok_or_else(|| fail("root", "expected object"))?;

    for (name, section) in root {
        if section.is_null() {
            continue;
        }
        if name == "$schema" {
            check_leaf(section, Kind::Text).map_err(|message| fail(name, message))?;
            continue;
        }
        let Some((_, fields)) = SECTIONS.iter().find(|(key, _)| key == name) else {
            return Err(fail(name, "unknown key"));
        };
        let entries = section
            .as_object()
            .ok_or_else(|| fail(name, "expected object"))?;
        check_section(entries, fields)
            .map_err(|(key, message)| fail(&format!("{name}.{key}"), &message))?;
    }
    Ok(())
}

fn check_section(
    entries: &Map<String, Value>,
    fields: &[(&str, Kind)],
) -> Result<(), (String, String)> {
    for (key, value) in entries {
        let Some((_, kind)) = fields.iter().find(|(field, _)| field == key) else {
            return Err((key.clone(), "unknown key".to_string()));
        };
        if value.is_null() {
            continue;
        }
        if let Kind::Rates = kind {
            let rates = value
                .as_object()
                .ok_or_else(|| (key.clone(), "expected object".to_string()))?;
            for (model, rate) in rates.iter().filter(|(_, rate)| !rate.is_null()) {
                check_leaf(rate, Kind::Number)
                    .map_err(|message| (format!("{key}.{model}"), message.to_string()))?;
            }
            continue;
        }
        check_leaf(value, *kind).map_err(|message| (key.clone(), message.to_string()))?;
    }
    Ok(())
}

fn check_leaf(value: &Value, kind: Kind) -> Result<(), &'static str> {
    match kind {
        Kind::Text if !value.is_string() => Err("expected string"),
        Kind::Count if !value.is_u64() => Err("expected non-negative integer"),
        Kind::Number if !value.is_number() => Err("expected number"),
        Kind::Provider => match value.as_str() {
            Some(name) if PROVIDERS.contains(&name) => Ok(()),
            Some(_) => Err("expected one of memory, file, firebase"),
            None => Err("expected string"),
        },
        Kind::Rates if !value.is_object() => Err("expected object"),
        _ => Ok(()),
    }
}
