use std::time::Instant;

use crate::config::Config;
use crate::generate::Magpie;

mod config;
mod generate;

pub const CONFIG_FILE: &str = "magpie.toml";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Generates navigable site documents from content rows.
        cmd magpie {
            /// A `.json` array of row objects or a `.toml` file of `[[row]]` tables.
            required rows: PathBuf
            /// The site directory documents are written into.
            required output: PathBuf
            /// Settings file; defaults to `magpie.toml` beside the rows.
            optional -c, --config config: PathBuf
            /// Also write a JSON snapshot of every item to this file.
            optional --export export: PathBuf
            /// Render and report without writing or deleting anything.
            optional --dry-run
            /// Keep generated documents whose rows are gone.
            optional --no-prune
        }
    }
}

pub fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let flags = flags::Magpie::from_env_or_exit();

    let start = Instant::now();
    let result = Config::discover(flags.config.as_deref(), &flags.rows)
        .map(|config| Magpie {
            rows: flags.rows,
            output: flags.output,
            config,
            export: flags.export,
            dry_run: flags.dry_run,
            prune: !flags.no_prune,
        })
        .and_then(|magpie| Ok((magpie.discover()?, magpie)))
        .and_then(|(site, magpie)| {
            println!("discovery time: {}ms", start.elapsed().as_millis());
            let render = Instant::now();
            let report = magpie.render_site(&site)?;
            println!("render time: {}ms", render.elapsed().as_millis());
            println!("total time: {}ms", start.elapsed().as_millis());
            println!(
                "{} rows, {} rejected, {} documents {}, {} pruned",
                site.rows,
                site.rejections.len(),
                report.written,
                if magpie.dry_run { "rendered" } else { "written" },
                report.pruned,
            );

            Ok(report)
        });

    if let Err(e) = result {
        println!("error: {e}");
        std::process::exit(1);
    }
}
