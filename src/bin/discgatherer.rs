//! Disc catalog CLI (discgatherer) - Main binary entry point

use discgatherer::cli::args::{CliArgs, parse_args};
use discgatherer::cli::output::{
    format_brief_json, format_listing_json, format_search_json, write_brief, write_listing,
    write_search_results, write_tree,
};
use discgatherer::config::Config;
use discgatherer::io::store::CatalogFile;
use discgatherer::services::catalog::Catalog;
use discgatherer::services::device::UdevadmInspector;
use discgatherer::services::matcher::Query;
use discgatherer::services::search::search_catalog;
use discgatherer::{DiscId, Error, Result};
use std::io::{self, Write};
use std::process;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug discgatherer --add
    env_logger::init();

    let args = match parse_args(std::env::args_os()) {
        Ok(a) => a,
        Err(e) => e.exit(),
    };

    if !args.has_mode() {
        println!("Nothing to do. Use --help for usage information");
        return;
    }

    let config = args.config();
    process::exit(run(&args, &config));
}

fn run(args: &CliArgs, config: &Config) -> i32 {
    let store = CatalogFile::new(&config.catalog_path);
    let mut catalog = match store.load() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!(
                "Error reading catalog {}: {e}",
                config.catalog_path.display()
            );
            return 4;
        }
    };

    let outcome = execute(args, config, &mut catalog);

    if catalog.is_modified()
        && let Err(e) = store.save(&catalog)
    {
        eprintln!("Error: Failed to save catalog: {e}");
        return 4;
    }

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}, aborting.");
            eprintln!();
            e.exit_code()
        }
    }
}

fn execute(args: &CliArgs, config: &Config, catalog: &mut Catalog) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.add {
        handle_add(&mut out, args, config, catalog)?;
    }

    if args.brief {
        if args.json {
            writeln!(out, "{}", format_brief_json(catalog))?;
        } else {
            write_brief(&mut out, catalog, args.verbose)?;
        }
    }

    if args.list {
        if args.json {
            writeln!(out, "{}", format_listing_json(catalog))?;
        } else {
            write_listing(&mut out, catalog, args.verbose)?;
        }
    }

    if let Some(words) = &args.search {
        let query = Query::new(words, args.strict);
        let hits = search_catalog(catalog, &query);
        log::debug!("Search {:?} matched {} discs", query.words(), hits.len());
        if args.json {
            writeln!(out, "{}", format_search_json(&hits))?;
        } else {
            write_search_results(&mut out, &hits, args.verbose)?;
        }
    }

    if let Some(raw_id) = &args.remove {
        handle_remove(&mut out, raw_id, catalog)?;
    }

    Ok(())
}

fn handle_add<W: Write>(
    out: &mut W,
    args: &CliArgs,
    config: &Config,
    catalog: &mut Catalog,
) -> Result<()> {
    let inspector = UdevadmInspector::new(&config.device);
    let scan = discgatherer::scan_disc(&inspector, &args.scan_options(config))?;
    let disc = &scan.disc;

    if args.verbose {
        writeln!(out, "Interrogating the disc drive yielded following (among others): ")?;
        for (key, value) in disc.properties() {
            writeln!(out, "    {key}: {value:?}")?;
        }
        writeln!(out)?;
        writeln!(out, "The label used for the disc: ")?;
        writeln!(out, "{:?}", disc.label())?;
        writeln!(out)?;
        writeln!(out, "Path up to the mountpoint should be: ")?;
        writeln!(out, "{:?}", scan.mount_path)?;
        writeln!(out)?;
        writeln!(out, "The disc content was found as follows: ")?;
        write_tree(out, disc.content(), 1, true)?;
        writeln!(out)?;
    }

    let label = disc.label().to_string();
    let id = catalog.add(scan.disc);
    writeln!(out, "The disc was successfully scanned and added under ID/label: ")?;
    writeln!(out, "{id} -> {label}")?;
    writeln!(out)?;
    Ok(())
}

fn handle_remove<W: Write>(out: &mut W, raw_id: &str, catalog: &mut Catalog) -> Result<()> {
    let id: DiscId = raw_id.trim().parse().map_err(|_| {
        Error::InvalidInput(format!("disc ID must be a positive integer, got {raw_id:?}"))
    })?;

    let disc = catalog.remove(id)?;
    writeln!(out, "Entry under following ID/label was successfully removed.")?;
    writeln!(out, "{id} -> {}", disc.label())?;
    writeln!(out)?;
    Ok(())
}
