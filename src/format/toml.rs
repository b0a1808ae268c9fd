//! TOML implementation of the serialization contract
//!
//! Writing goes through `toml_edit` so option comments survive as `# ` lines
//! above their entries and categories render as `[table]` sections with
//! their own comment. Reading goes through the plain `toml` parser into a
//! loosely-typed table that scope navigation walks by path.

use toml_edit::{DocumentMut, Item, Table};

use super::{ConfigDeserializer, ConfigFormat, ConfigSerializer};
use crate::value::ConfigValue;

/// The TOML strategy pair. This is the format [`RootConfigBuilder`] uses
/// unless told otherwise.
///
/// [`RootConfigBuilder`]: crate::RootConfigBuilder
pub struct TomlFormat;

impl ConfigFormat for TomlFormat {
    fn serializer(&self) -> Box<dyn ConfigSerializer> {
        Box::new(TomlSerializer::new())
    }

    fn deserializer(&self) -> Box<dyn ConfigDeserializer> {
        Box::new(TomlDeserializer::new())
    }
}

fn comment_block(comment: &str) -> String {
    comment
        .lines()
        .map(|line| format!("# {line}\n"))
        .collect()
}

pub struct TomlSerializer {
    doc: DocumentMut,
    path: Vec<String>,
}

impl TomlSerializer {
    pub fn new() -> Self {
        Self {
            doc: DocumentMut::new(),
            path: Vec::new(),
        }
    }

    /// Table at the current scope path, creating intermediate tables as
    /// needed. `open_scope` created them already in the normal walk; the
    /// creation here only matters if a caller drives the trait by hand.
    fn current_table(&mut self) -> &mut Table {
        let mut table = self.doc.as_table_mut();
        for seg in &self.path {
            let item = table
                .entry(seg)
                .or_insert(Item::Table(Table::new()));
            if !item.is_table() {
                *item = Item::Table(Table::new());
            }
            let Item::Table(child) = item else {
                unreachable!()
            };
            table = child;
        }
        table
    }
}

impl Default for TomlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSerializer for TomlSerializer {
    fn write_option(&mut self, key: &str, value: &ConfigValue, comment: &str) {
        let toml_value = match value {
            ConfigValue::Bool(v) => toml_edit::value(*v),
            ConfigValue::Int(v) => toml_edit::value(*v),
            // TOML integers are i64; values beyond that saturate.
            ConfigValue::UInt(v) => {
                let clamped = i64::try_from(*v).unwrap_or(i64::MAX);
                if clamped as u64 != *v {
                    log::warn!("option '{key}': value {v} exceeds the TOML integer range, writing {clamped}");
                }
                toml_edit::value(clamped)
            }
            ConfigValue::Float(v) => toml_edit::value(*v),
            ConfigValue::String(v) => toml_edit::value(v.as_str()),
        };
        let table = self.current_table();
        table.insert(key, toml_value);
        if !comment.is_empty() {
            if let Some(mut k) = table.key_mut(key) {
                k.leaf_decor_mut().set_prefix(comment_block(comment));
            }
        }
    }

    fn open_scope(&mut self, key: &str, comment: &str) {
        // blank line separates this section from preceding content; at the
        // very top of the document there is nothing to separate from
        let first = self.path.is_empty() && self.doc.as_table().is_empty();
        let prefix = match (first, comment.is_empty()) {
            (true, true) => String::new(),
            (true, false) => comment_block(comment),
            (false, true) => "\n".to_string(),
            (false, false) => format!("\n{}", comment_block(comment)),
        };
        let table = self.current_table();
        let item = table
            .entry(key)
            .or_insert(Item::Table(Table::new()));
        if let Some(child) = item.as_table_mut() {
            child.decor_mut().set_prefix(prefix);
        }
        self.path.push(key.to_string());
    }

    fn close_scope(&mut self) {
        self.path.pop();
    }

    fn complete(&mut self) -> String {
        self.doc.to_string()
    }
}

pub struct TomlDeserializer {
    root: Option<toml::Table>,
    path: Vec<String>,
}

impl TomlDeserializer {
    pub fn new() -> Self {
        Self {
            root: None,
            path: Vec::new(),
        }
    }

    fn current_table(&self) -> Option<&toml::Table> {
        let mut table = self.root.as_ref()?;
        for seg in &self.path {
            table = table.get(seg)?.as_table()?;
        }
        Some(table)
    }
}

impl Default for TomlDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDeserializer for TomlDeserializer {
    fn receive_source(&mut self, text: &str) -> bool {
        self.path.clear();
        match text.parse::<toml::Table>() {
            Ok(table) => {
                self.root = Some(table);
                true
            }
            Err(e) => {
                log::debug!("TOML parse failed: {e}");
                self.root = None;
                false
            }
        }
    }

    fn read_option(&mut self, key: &str) -> Option<ConfigValue> {
        let value = self.current_table()?.get(key)?;
        match value {
            toml::Value::Boolean(v) => Some(ConfigValue::Bool(*v)),
            toml::Value::Integer(v) => Some(ConfigValue::Int(*v)),
            toml::Value::Float(v) => Some(ConfigValue::Float(*v)),
            toml::Value::String(v) => Some(ConfigValue::String(v.clone())),
            other => {
                log::debug!("key '{key}' holds a {} (not a leaf value)", other.type_str());
                None
            }
        }
    }

    fn open_scope(&mut self, key: &str) -> bool {
        let present = self
            .current_table()
            .and_then(|t| t.get(key))
            .is_some_and(toml::Value::is_table);
        if present {
            self.path.push(key.to_string());
        }
        present
    }

    fn close_scope(&mut self) {
        self.path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> String {
        let mut s = TomlSerializer::new();
        s.write_option("greeting", &ConfigValue::String("hello".into()), "Shown at startup");
        s.open_scope("sound", "Sound settings");
        s.write_option("volume", &ConfigValue::Int(75), "Playback volume");
        s.write_option("muted", &ConfigValue::Bool(false), "");
        s.open_scope("alerts", "");
        s.write_option("ping", &ConfigValue::Bool(true), "Play a ping on mention");
        s.close_scope();
        s.close_scope();
        s.complete()
    }

    #[test]
    fn test_serializer_output_shape() {
        let text = sample_document();
        assert!(text.contains("# Shown at startup"));
        assert!(text.contains("greeting = \"hello\""));
        assert!(text.contains("# Sound settings"));
        assert!(text.contains("[sound]"));
        assert!(text.contains("volume = 75"));
        assert!(text.contains("muted = false"));
        assert!(text.contains("[sound.alerts]"));
        assert!(text.contains("ping = true"));
    }

    #[test]
    fn test_serializer_is_deterministic() {
        assert_eq!(sample_document(), sample_document());
    }

    #[test]
    fn test_leading_scope_has_no_blank_line() {
        let mut s = TomlSerializer::new();
        s.open_scope("sound", "Sound settings");
        s.write_option("volume", &ConfigValue::Int(50), "");
        s.close_scope();
        let text = s.complete();
        assert!(text.starts_with("# Sound settings\n[sound]"));

        let mut s = TomlSerializer::new();
        s.open_scope("sound", "");
        s.write_option("volume", &ConfigValue::Int(50), "");
        s.close_scope();
        assert!(s.complete().starts_with("[sound]"));
    }

    #[test]
    fn test_uint_saturates_at_i64_max() {
        let mut s = TomlSerializer::new();
        s.write_option("big", &ConfigValue::UInt(u64::MAX), "");
        let text = s.complete();
        assert!(text.contains(&format!("big = {}", i64::MAX)));
    }

    #[test]
    fn test_deserializer_reads_back() {
        let text = sample_document();
        let mut d = TomlDeserializer::new();
        assert!(d.receive_source(&text));

        assert_eq!(
            d.read_option("greeting"),
            Some(ConfigValue::String("hello".into()))
        );
        assert!(d.open_scope("sound"));
        assert_eq!(d.read_option("volume"), Some(ConfigValue::Int(75)));
        assert!(d.open_scope("alerts"));
        assert_eq!(d.read_option("ping"), Some(ConfigValue::Bool(true)));
        d.close_scope();
        assert_eq!(d.read_option("muted"), Some(ConfigValue::Bool(false)));
        d.close_scope();
    }

    #[test]
    fn test_absent_key_and_scope() {
        let mut d = TomlDeserializer::new();
        assert!(d.receive_source("volume = 75\n"));
        assert_eq!(d.read_option("missing"), None);
        assert!(!d.open_scope("sound"));
        // scope key that exists but is a plain value is not a scope
        assert!(!d.open_scope("volume"));
    }

    #[test]
    fn test_parse_failure() {
        let mut d = TomlDeserializer::new();
        assert!(!d.receive_source("not [valid toml ==="));
        assert_eq!(d.read_option("anything"), None);
    }

    #[test]
    fn test_non_leaf_value_reads_as_absent() {
        let mut d = TomlDeserializer::new();
        assert!(d.receive_source("list = [1, 2, 3]\n"));
        assert_eq!(d.read_option("list"), None);
    }
}
