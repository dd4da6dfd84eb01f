use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use compat_json::{
    ConvertError, Formatting, FromJsonInput, JsonSource, PathContext, convert_from_json, convert_to_json,
};

#[derive(Parser)]
#[command(name = "compat-json")]
#[command(about = "Convert compatibility profile data to and from JSON", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize objects to JSON text, one string per object
    #[command(name = "to-json")]
    ToJson {
        /// Objects to serialize, given as JSON values (reads a stream of values from STDIN when omitted)
        #[arg(allow_negative_numbers = true)]
        item: Vec<String>,

        /// Emit compact JSON with no insignificant whitespace
        #[arg(short = 'c', long, visible_alias = "compress")]
        no_whitespace: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Deserialize JSON text from strings, STDIN or files
    #[command(name = "from-json")]
    FromJson {
        /// JSON text to deserialize ('-' reads from STDIN)
        #[arg(required_unless_present = "path", conflicts_with = "path", allow_negative_numbers = true)]
        json_source: Vec<String>,

        /// Paths of JSON files to deserialize
        #[arg(short, long, num_args = 1.., value_parser = NonEmptyStringValueParser::new())]
        path: Vec<String>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_output(output: Option<PathBuf>) -> Result<Box<dyn Write>, ConvertError> {
    match output {
        Some(path) => {
            info!(path = %path.display(), "writing to file");
            let file = File::create(&path).map_err(|source| ConvertError::PathResolution {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn run_to_json(items: Vec<String>, no_whitespace: bool, output: Option<PathBuf>) -> Result<(), ConvertError> {
    let formatting = Formatting::from_compact(no_whitespace);
    let mut out = open_output(output)?;
    let mut written = 0usize;

    if items.is_empty() {
        info!("reading items from STDIN");
        let stdin = io::stdin().lock();
        let stream = serde_json::Deserializer::from_reader(stdin).into_iter::<Value>();

        // Values are converted as they arrive; a parse error ends the stream.
        let mut parse_error = None;
        let values = stream.map_while(|value| value.map_err(|e| parse_error = Some(e)).ok());
        for json in convert_to_json(values, formatting) {
            writeln!(out, "{}", json?)?;
            out.flush()?;
            written += 1;
        }

        if let Some(source) = parse_error {
            return Err(ConvertError::Deserialization {
                origin: "stdin".to_string(),
                source,
            });
        }
    } else {
        let values = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_str::<Value>(item).map_err(|source| ConvertError::Deserialization {
                    origin: format!("item {index}"),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for json in convert_to_json(values, formatting) {
            writeln!(out, "{}", json?)?;
            written += 1;
        }
    }

    out.flush()?;
    info!(written, "serialized items");
    Ok(())
}

fn run_from_json(json_source: Vec<String>, path: Vec<String>, output: Option<PathBuf>) -> Result<(), ConvertError> {
    let context = PathContext::current()?;
    let mut stdin = io::stdin().lock();
    let mut stdin_source: Option<&mut dyn Read> = Some(&mut stdin);

    let input = if path.is_empty() {
        let mut sources = Vec::with_capacity(json_source.len());
        for text in json_source {
            if text == "-" {
                let reader = stdin_source.take().ok_or_else(|| ConvertError::InvalidArgument {
                    parameter: "json_source",
                    message: "'-' (STDIN) can only be given once".to_string(),
                })?;
                sources.push(JsonSource::Reader(reader));
            } else {
                sources.push(JsonSource::Text(text));
            }
        }
        FromJsonInput::from_parameters(Some(sources), None)?
    } else {
        FromJsonInput::from_parameters(None, Some(path))?
    };

    let mut out = open_output(output)?;
    let mut written = 0usize;
    for value in convert_from_json(input, context) {
        let value = value?;
        serde_json::to_writer(&mut out, &value).map_err(|source| ConvertError::Serialization { source })?;
        writeln!(out)?;
        written += 1;
    }

    out.flush()?;
    info!(written, "deserialized objects");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::ToJson { item, no_whitespace, output } => {
            debug!(items = item.len(), no_whitespace, "running to-json");
            run_to_json(item, no_whitespace, output)
        }
        Commands::FromJson { json_source, path, output } => {
            debug!(sources = json_source.len(), paths = path.len(), "running from-json");
            run_from_json(json_source, path, output)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
