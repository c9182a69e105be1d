use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Deserialize;

use wayfinder::{err, error, Catalog, Row};
use wayfinder::document::{export_json, Document, RenderOptions};
use wayfinder::error::{Chainable, Result};
use wayfinder::normalize::{Normalizer, Rejection};
use wayfinder::rayon::prelude::*;
use wayfinder::value::{Format, Json, Toml};

use crate::config::Config;

/// A row file in TOML form: an array of `[[row]]` tables.
#[derive(Debug, Default, Deserialize)]
struct RowFile {
    #[serde(default)]
    row: Vec<Row>,
}

/// Reads `.json` (an array of objects) or `.toml` (`[[row]]` tables) rows.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Json::read(path),
        Some("toml") => Ok(Toml::read::<RowFile, _>(path)?.row),
        _ => err! {
            "unsupported row file type",
            "path" => path.display(),
            "expected" => "a .json or .toml file",
        },
    }
}

#[derive(Debug)]
pub struct Magpie {
    pub rows: PathBuf,
    pub output: PathBuf,
    pub config: Config,
    pub export: Option<PathBuf>,
    pub dry_run: bool,
    pub prune: bool,
}

/// The normalized content of one run.
#[derive(Debug)]
pub struct Site {
    pub catalog: Catalog,
    pub rows: usize,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub written: usize,
    pub pruned: usize,
}

impl Magpie {
    pub fn discover(&self) -> Result<Site> {
        let rows = load_rows(&self.rows)?;
        let settings = &self.config.settings;
        let normalizer = Normalizer::new(&settings.taxonomy)?;

        let count = rows.len();
        let normalized = normalizer.normalize_all(rows);
        let catalog = Catalog::build(normalized.items, &settings.ring_config());
        tracing::info!(
            rows = count,
            items = catalog.len(),
            rejected = normalized.rejections.len(),
            "normalized rows"
        );

        Ok(Site { catalog, rows: count, rejections: normalized.rejections })
    }

    pub fn render_site(&self, site: &Site) -> Result<Report> {
        let settings = &self.config.settings;
        let options = match settings.timestamp {
            true => RenderOptions::new(settings.format).stamped(),
            false => RenderOptions::new(settings.format),
        };

        let documents = site.catalog.par_render(&options)?;
        if !self.dry_run {
            documents.par_iter().try_for_each(|doc| self.write(doc))?;
        }

        let written: FxHashSet<PathBuf> = documents.iter().map(|doc| doc.path.clone()).collect();
        let categories = settings.taxonomy.categories.iter().map(|spec| &*spec.name);
        let pruned = match (self.prune, self.dry_run) {
            (false, _) => 0,
            (true, false) => wayfinder::prune::prune(&self.output, categories, &written)?,
            (true, true) => {
                let stale = wayfinder::prune::stale(&self.output, categories, &written)?;
                for path in &stale {
                    tracing::info!(path = %path.display(), "would prune stale document");
                }

                stale.len()
            }
        };

        if let Some(path) = &self.export {
            self.export_snapshot(&site.catalog, path)?;
        }

        Ok(Report { written: documents.len(), pruned })
    }

    fn write(&self, doc: &Document) -> Result<()> {
        let path = self.output.join(&doc.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).chain_with(|| error! {
                "failed to create output directory",
                "directory" => parent.display(),
            })?;
        }

        std::fs::write(&path, &doc.text).chain_with(|| error! {
            "failed to write document",
            "path" => path.display(),
            "location" => &doc.location,
        })
    }

    fn export_snapshot(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        let json = export_json(&catalog.snapshot())?;
        if self.dry_run {
            tracing::info!(path = %path.display(), records = catalog.len(), "would export snapshot");
            return Ok(());
        }

        std::fs::write(path, json).chain_with(|| error! {
            "failed to write snapshot export",
            "path" => path.display(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    use wayfinder::document::parse_front_matter;

    const ROWS: &str = r#"[
        { "Collection": "Song", "Title": "Bravo", "Album": "Album X", "Order": 2 },
        { "Collection": "songs", "Title": "Alpha", "Album": "Album X" },
        { "Collection": "songs", "Title": "Charlie", "Album": "Album X", "Order": "1" },
        { "Collection": "Photo", "Title": "Harbor", "Body_md": "Boats at dusk. Gulls." },
        { "Collection": "Paintings", "Title": "Nope" },
        { "Collection": "article", "Title": "Welcome", "Is_Homepage": "true" }
    ]"#;

    fn magpie(dir: &Path, rows: &str, file: &str) -> Magpie {
        let path = dir.join(file);
        std::fs::write(&path, rows).unwrap();

        let mut settings = Settings::default();
        settings.timestamp = false;
        Magpie {
            rows: path,
            output: dir.join("site"),
            config: Config { source: None, settings },
            export: Some(dir.join("export.json")),
            dry_run: false,
            prune: true,
        }
    }

    fn read(path: PathBuf) -> wayfinder::value::Dict {
        parse_front_matter(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_documents_with_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let magpie = magpie(dir.path(), ROWS, "rows.json");

        let site = magpie.discover().unwrap();
        assert_eq!(site.rows, 6);
        assert_eq!(site.rejections.len(), 1);
        assert_eq!(site.rejections[0].row, 5);

        let report = magpie.render_site(&site).unwrap();
        assert_eq!(report, Report { written: 5, pruned: 0 });

        let songs = dir.path().join("site/_songs/album-x");
        let charlie = read(songs.join("charlie.md"));
        let nav = charlie["nav"].as_dict().unwrap();
        assert_eq!(nav["local_next"].as_str(), Some("/songs/album-x/bravo/"));
        assert!(!nav.contains_key("local_prev"));

        // photograph precedes songs in the default order; article follows.
        assert_eq!(nav["global_prev"].as_str(), Some("/photograph/harbor/"));
        let alpha = read(songs.join("alpha.md"));
        assert_eq!(alpha["nav"].as_dict().unwrap()["global_next"].as_str(), Some("/"));

        let harbor = read(dir.path().join("site/_photograph/harbor.md"));
        assert_eq!(harbor["excerpt"].as_str(), Some("Boats at dusk."));

        let export = std::fs::read_to_string(dir.path().join("export.json")).unwrap();
        assert!(export.contains("\"permalink\": \"/\""));
    }

    #[test]
    fn prunes_documents_of_removed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let magpie = magpie(dir.path(), ROWS, "rows.json");
        magpie.render_site(&magpie.discover().unwrap()).unwrap();

        let hand_written = dir.path().join("site/_songs/notes.md");
        std::fs::write(&hand_written, "# Notes\n").unwrap();

        let fewer = r#"[{ "Collection": "songs", "Title": "Alpha", "Album": "Album X" }]"#;
        let magpie = self::magpie(dir.path(), fewer, "rows.json");
        let report = magpie.render_site(&magpie.discover().unwrap()).unwrap();
        assert_eq!(report, Report { written: 1, pruned: 4 });
        assert!(hand_written.exists());
        assert!(dir.path().join("site/_songs/album-x/alpha.md").exists());
        assert!(!dir.path().join("site/_songs/album-x/bravo.md").exists());
    }

    #[test]
    fn dry_runs_touch_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut magpie = magpie(dir.path(), ROWS, "rows.json");
        magpie.dry_run = true;

        let report = magpie.render_site(&magpie.discover().unwrap()).unwrap();
        assert_eq!(report.written, 5);
        assert!(!dir.path().join("site").exists());
        assert!(!dir.path().join("export.json").exists());
    }

    #[test]
    fn reads_toml_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = r#"
            [[row]]
            category = "article"
            title = "First"
            order = 1

            [[row]]
            category = "article"
            title = "Second"
        "#;

        let magpie = magpie(dir.path(), rows, "rows.toml");
        let site = magpie.discover().unwrap();
        assert_eq!(site.catalog.len(), 2);
        assert!(site.rejections.is_empty());
    }

    #[test]
    fn rejects_unknown_row_files() {
        let dir = tempfile::tempdir().unwrap();
        let magpie = magpie(dir.path(), "a,b\n", "rows.csv");
        assert!(magpie.discover().is_err());
    }
}
