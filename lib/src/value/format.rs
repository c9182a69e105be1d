use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ErrorDetail, Result, Chainable};

/// A textual data format: row files, configuration, and front matter.
pub trait Format: Sized {
    /// The format's deserialization error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// The format's serialization error type.
    type SerError: ErrorDetail + 'static;

    /// Parses `string` in the format `Self` as a `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Emits `value` in the format `Self`.
    fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, Self::SerError>;

    /// Reads the file at `path` and parses it as a `T`.
    fn read<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to read file",
            "file path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            "failed to parse file",
            "file path" => path.display(),
        })
    }
}

macro_rules! impl_format {
    ($name:ident : $de:expr, $ser:expr, $E:ty, $S:ty) => (
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;
            type SerError = $S;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $de(s)
            }

            fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, $S> {
                $ser(value)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::to_string, toml::de::Error, toml::ser::Error);
impl_format!(Json: serde_json::from_str, serde_json::to_string_pretty, serde_json::Error, serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Dict, Value};

    #[test]
    fn read_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "title = ").unwrap();

        let error = Toml::read::<Dict, _>(&path).unwrap_err();
        let text = error.to_string();
        assert!(text.contains("failed to parse file"));
        assert!(text.contains("broken.toml"));
    }

    #[test]
    fn toml_emits_nested_tables_last() {
        let nav: Dict = crate::dict! { "local_next" => "/songs/b/" };
        let meta: Dict = crate::dict! {
            "nav" => nav,
            "title" => "A",
        };

        let text = Toml::to_string(&meta).unwrap();
        assert!(text.starts_with("title = \"A\"\n"));
        assert!(text.contains("[nav]\nlocal_next = \"/songs/b/\"\n"));

        let back: Dict = Toml::from_str(&text).unwrap();
        assert_eq!(back["title"], Value::from("A"));
    }
}
