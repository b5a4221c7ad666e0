//! standoff - HTML to stand-off annotation converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use standoff::util::decode_html;
use standoff::{Config, Converter, FileStore, Jdom, JdomStore, Reconstructor, SaveOutcome, UserMark};

#[derive(Parser)]
#[command(name = "standoff")]
#[command(version, about = "HTML to stand-off annotation converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    standoff convert page.html -o page.json       Convert HTML to JDOM
    standoff text page.json                       Print the readable text
    standoff render page.json --marks notes.json  Rebuild HTML with highlights
    standoff save page.html --store db.json --url https://example.com/")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an HTML file to JDOM JSON
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Source URL recorded in the JDOM
        #[arg(long)]
        url: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the readable text of a JDOM (or of an HTML file with --html)
    Text {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Treat INPUT as HTML and convert it first
        #[arg(long)]
        html: bool,
    },

    /// Rebuild HTML from a JDOM JSON file
    Render {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// JSON array of user marks: [{"start": 3, "end": 9, "markType": "note"}]
        #[arg(short, long, value_name = "FILE")]
        marks: Option<PathBuf>,

        /// Wrap the output in <html><head></head><body>
        #[arg(long)]
        wrap: bool,

        /// Omit data-start/data-end attributes
        #[arg(long)]
        no_diagnostics: bool,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Convert an HTML file and add it to a store
    Save {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Store file
        #[arg(short, long, value_name = "FILE")]
        store: PathBuf,

        /// Source URL; saves are idempotent per URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the default (earliest) record of a store
    ShowDefault {
        /// Store file
        #[arg(short, long, value_name = "FILE")]
        store: PathBuf,

        /// Render the record as HTML instead of JSON
        #[arg(long)]
        html: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "standoff=debug",
        _ => "standoff=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> standoff::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    tracing::debug!(
        non_readable = ?config.non_readable_tags.iter().collect::<Vec<_>>(),
        "excluding subtrees"
    );
    let converter = Converter::with_options(config.convert_options());

    match cli.command {
        Command::Convert {
            input,
            url,
            output,
            pretty,
        } => {
            let jdom = convert_file(&converter, &input, url.as_deref())?;
            let json = if pretty {
                serde_json::to_string_pretty(&jdom)?
            } else {
                serde_json::to_string(&jdom)?
            };
            write_output(output.as_deref(), &json)
        }
        Command::Text { input, html } => {
            let jdom = if html {
                convert_file(&converter, &input, None)?
            } else {
                read_jdom(&input)?
            };
            println!("{}", jdom.to_text());
            Ok(())
        }
        Command::Render {
            input,
            marks,
            wrap,
            no_diagnostics,
            output,
        } => {
            let jdom = read_jdom(&input)?;
            let user_marks: Vec<UserMark> = match marks {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => Vec::new(),
            };
            let mut options = config.reconstruct_options();
            options.wrap_document |= wrap;
            options.diagnostic_attributes &= !no_diagnostics;
            let html = Reconstructor::with_options(options).reconstruct(&jdom, &user_marks);
            write_output(output.as_deref(), &html)
        }
        Command::Save { input, store, url } => {
            let jdom = convert_file(&converter, &input, url.as_deref())?;
            let mut store = FileStore::open(store)?;
            match store.save(&jdom)? {
                SaveOutcome::Inserted(id) => println!("Saved record {id}"),
                SaveOutcome::AlreadyStored(id) => println!("Already stored as record {id}"),
            }
            Ok(())
        }
        Command::ShowDefault { store, html } => {
            let store = FileStore::open(store)?;
            let Some(record) = store.get_default()? else {
                println!("Store is empty");
                return Ok(());
            };
            if html {
                let reconstructor = Reconstructor::with_options(config.reconstruct_options());
                println!("{}", reconstructor.reconstruct(&record.jdom, &[]));
            } else {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Ok(())
        }
    }
}

fn convert_file(converter: &Converter, path: &Path, url: Option<&str>) -> standoff::Result<Jdom> {
    let bytes = std::fs::read(path)?;
    let html = decode_html(&bytes);
    match url {
        Some(url) => converter.convert_with_url(&html, url),
        None => converter.convert(&html),
    }
}

fn read_jdom(path: &Path) -> standoff::Result<Jdom> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn write_output(path: Option<&Path>, content: &str) -> standoff::Result<()> {
    match path {
        Some(path) => Ok(std::fs::write(path, content)?),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
