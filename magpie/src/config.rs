use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use wayfinder::{Boundary, CategorySpec, RingConfig, Taxonomy};
use wayfinder::document::FrontMatterFormat;
use wayfinder::value::{Toml, Format};
use wayfinder::error::Result;

#[derive(Debug)]
pub struct Config {
    /// Where the settings were read from, if not the defaults.
    pub source: Option<PathBuf>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default)]
    pub format: FrontMatterFormat,
    #[serde(default = "Settings::default_timestamp")]
    pub timestamp: bool,
    #[serde(flatten)]
    pub taxonomy: Taxonomy,
}

impl Settings {
    fn default_timestamp() -> bool {
        true
    }

    pub fn ring_config(&self) -> RingConfig {
        self.taxonomy.ring_config(self.boundary)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            boundary: Boundary::NoWrap,
            format: FrontMatterFormat::Toml,
            timestamp: true,
            taxonomy: default_taxonomy(),
        }
    }
}

/// The categories of the site the generator was first written for.
pub fn default_taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        CategorySpec::new("written-photography"),
        CategorySpec::new("photograph").alias("photo"),
        CategorySpec::new("taglines").alias("tagline"),
        CategorySpec::new("personal-micro-dictionary"),
        CategorySpec::new("visualartwork").alias("visual artwork"),
        CategorySpec::new("epistolary"),
        CategorySpec::new("sculpture"),
        CategorySpec::new("songs").alias("song").group("album"),
        CategorySpec::new("article"),
        CategorySpec::new("capsule-review"),
    ])
}

impl Config {
    /// Reads `explicit` if given, else `magpie.toml` beside `rows`, else uses
    /// the defaults. A settings file without categories gets the default ones.
    pub fn discover(explicit: Option<&Path>, rows: &Path) -> Result<Self> {
        let beside = rows.parent().unwrap_or(Path::new(".")).join(crate::CONFIG_FILE);
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => beside.is_file().then_some(beside),
        };

        let mut settings: Settings = match &source {
            Some(path) => Toml::read(path)?,
            None => Settings::default(),
        };

        if settings.taxonomy.categories.is_empty() {
            settings.taxonomy.categories = default_taxonomy().categories;
        }

        settings.taxonomy.validate()?;
        Ok(Config { source, settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(None, &dir.path().join("rows.json")).unwrap();
        assert!(config.source.is_none());
        assert_eq!(config.settings.boundary, Boundary::NoWrap);
        assert!(config.settings.timestamp);

        let order = config.settings.ring_config().order;
        assert_eq!(order.len(), 10);
        assert_eq!(&*order[0], "written-photography");
        assert_eq!(&*order[9], "capsule-review");
    }

    #[test]
    fn reads_settings_beside_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(crate::CONFIG_FILE), r#"
            boundary = "wrap"
            format = "json"
            timestamp = false
            order = ["songs", "photograph"]
        "#).unwrap();

        let config = Config::discover(None, &dir.path().join("rows.json")).unwrap();
        assert!(config.source.is_some());
        assert_eq!(config.settings.boundary, Boundary::Wrap);
        assert_eq!(config.settings.format, FrontMatterFormat::Json);
        assert!(!config.settings.timestamp);
        assert_eq!(config.settings.taxonomy.categories.len(), 10);

        let order = config.settings.ring_config().order;
        assert_eq!(order.len(), 2);
        assert_eq!(&*order[0], "songs");
    }

    #[test]
    fn explicit_settings_with_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, r#"
            placeholder = "Sin título"

            [[category]]
            name = "poems"
            aliases = ["poem"]

            [[category]]
            name = "essays"
        "#).unwrap();

        let config = Config::discover(Some(&path), &dir.path().join("rows.toml")).unwrap();
        let taxonomy = &config.settings.taxonomy;
        assert_eq!(&*taxonomy.placeholder, "Sin título");
        assert_eq!(taxonomy.resolve("Poem").map(|c| &*c.name), Some("poems"));
        assert_eq!(config.settings.ring_config().order.len(), 2);
    }

    #[test]
    fn bad_order_entries_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "order = [\"paintings\"]\n").unwrap();
        assert!(Config::discover(Some(&path), &path).is_err());
    }
}
