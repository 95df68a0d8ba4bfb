//! Command-line interface for grammar-render.
//!
//! Usage:
//!   grammar-render --text|--xml --parser `<file>` --lexer `<file>` [-o `<out>`] [--docs `<dir>`] [--config `<toml>`]

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgGroup, Command};

use grammar_render::config::RenderConfig;
use grammar_render::docs::{DirectoryDocs, DocStore, NoDocs};
use grammar_render::{convert, Format};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let matches = Command::new("grammar-render")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a grammar as a flat notation listing or a cross-referenced XML document")
        .arg_required_else_help(true)
        .arg(
            Arg::new("text")
                .long("text")
                .help("Render the flat notation listing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("xml")
                .long("xml")
                .help("Render the structured XML document")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("format")
                .args(["text", "xml"])
                .required(true),
        )
        .arg(
            Arg::new("parser")
                .long("parser")
                .help("Parser grammar notation file")
                .required(true),
        )
        .arg(
            Arg::new("lexer")
                .long("lexer")
                .help("Lexer grammar notation file")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file (default: stdout)"),
        )
        .arg(
            Arg::new("docs")
                .long("docs")
                .help("Directory of documentation snippets (<key>.md)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Render configuration (TOML)"),
        )
        .get_matches();

    let format = if matches.get_flag("xml") {
        Format::Xml
    } else {
        Format::Text
    };
    let parser = matches
        .get_one::<String>("parser")
        .expect("parser is required");
    let lexer = matches
        .get_one::<String>("lexer")
        .expect("lexer is required");

    let config = match matches.get_one::<String>("config") {
        Some(path) => RenderConfig::load_from_path(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None => RenderConfig::default(),
    };

    let directory_docs;
    let docs: &dyn DocStore = match matches.get_one::<String>("docs") {
        Some(dir) => {
            directory_docs = DirectoryDocs::new(dir);
            &directory_docs
        }
        None => &NoDocs,
    };

    let rendered = convert(format, parser, lexer, &config, docs).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match matches.get_one::<String>("output").map(PathBuf::from) {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, rendered) {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
            log::info!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }
}
