use crate::errors::ConfigError;
use serde::de::DeserializeOwned;
use toml::{Table, Value};

/// External configuration handed to condition predicates.
///
/// The resolver never reads or changes it; predicates that declare a
/// `&Configuration` parameter receive it as-is. Keys are addressed with dotted
/// paths (`"mail.smtp.host"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    root: Table,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let root = toml::from_str::<Table>(source)
            .map_err(|e| ConfigError::TomlParse("<inline>".to_string(), e))?;
        Ok(Self { root })
    }

    pub fn as_table(&self) -> &Table {
        &self.root
    }

    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.get(segment)?;
        }
        Some(value)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Typed read; `None` when the key is missing or has another shape
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.lookup(path)?.clone().try_into().ok()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.lookup(path)?.as_bool()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.lookup(path)?.as_str()
    }

    /// Writes a value, creating intermediate tables on the way
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((key, parents)) = segments.split_last() else {
            return;
        };

        let mut table = &mut self.root;
        for segment in parents {
            let entry = table
                .entry(segment.to_string())
                .or_insert(Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            table = match entry {
                Value::Table(next) => next,
                _ => return,
            };
        }
        table.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }
}
