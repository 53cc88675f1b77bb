use objlex::frontend::{Keywords, Lexer, Options, Parser, ReadCursor};
use objlex::geometry::{Event, GeometrySink, IndexTriplet, Normal, Parameter, TexCoord, Vertex};

use clap::Parser as _;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Lex and parse a Wavefront OBJ file
#[derive(clap::Parser, Debug)]
#[clap(name = "objlex", version)]
struct Args {
    /// OBJ file to read
    #[clap(parse(from_os_str))]
    file: PathBuf,

    /// Print the token stream instead of parsing it
    #[clap(long)]
    tokens: bool,

    /// Print every parsed record
    #[clap(long)]
    events: bool,

    /// Let missing coordinates read as zero
    #[clap(long)]
    lenient: bool,

    /// Fail on tokens left over after a statement
    #[clap(long)]
    reject_trailing: bool,

    /// Fail on unrecognized statements instead of skipping them
    #[clap(long)]
    reject_unknown: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("{path}:{error}")]
    Parse { path: String, error: objlex::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        // sysexits.h: EX_DATAERR, EX_NOINPUT
        match self {
            CliError::Parse { .. } => 65,
            CliError::Io { .. } => 66,
        }
    }
}

type RunResult = Result<(), CliError>;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(args: &Args) -> RunResult {
    let path = args.file.display().to_string();
    let io_err = |source| CliError::Io {
        path: path.clone(),
        source,
    };

    let file = File::open(&args.file).map_err(io_err)?;
    let mut cursor = ReadCursor::new(BufReader::new(file));

    let options = Options {
        strict: !args.lenient,
        reject_trailing_tokens: args.reject_trailing,
        skip_unknown_statements: !args.reject_unknown,
    };
    let lexer = Lexer::with_options(&mut cursor, Keywords::obj(), options);

    let stdout = io::stdout();
    let result = if args.tokens {
        dump_tokens(lexer, stdout.lock(), &path)
    } else {
        run_parser(lexer, stdout.lock(), args.events, &path)
    };

    // A failed read looks like the end of the file to the lexer, so it
    // trumps whatever the parser made of that
    match cursor.take_error() {
        Some(e) => Err(io_err(e)),
        None => result,
    }
}

fn dump_tokens<R: io::Read>(
    lexer: Lexer<&mut ReadCursor<R>>,
    mut out: impl Write,
    path: &str,
) -> RunResult {
    let stdout_err = |source| CliError::Io {
        path: "<stdout>".to_owned(),
        source,
    };

    for token in lexer.tokens() {
        let token = token.map_err(|error| CliError::Parse {
            path: path.to_owned(),
            error,
        })?;
        writeln!(out, "{:<8} {}", token.position.to_string(), token).map_err(stdout_err)?;
    }

    Ok(())
}

fn run_parser<R: io::Read>(
    lexer: Lexer<&mut ReadCursor<R>>,
    out: impl Write,
    print_events: bool,
    path: &str,
) -> RunResult {
    let stdout_err = |source| CliError::Io {
        path: "<stdout>".to_owned(),
        source,
    };

    let mut parser = Parser::new(lexer, EventPrinter::new(out, print_events));
    parser.parse().map_err(|error| CliError::Parse {
        path: path.to_owned(),
        error,
    })?;

    let stats = parser.statistics();
    let mut printer = parser.into_sink();
    if let Some(e) = printer.error.take() {
        return Err(stdout_err(e));
    }

    // Written as a comment so the output still reads as OBJ
    writeln!(printer.out, "# {}", stats).map_err(stdout_err)
}

/// Writes each event back out as the OBJ statement it came from.
struct EventPrinter<W> {
    out: W,
    enabled: bool,
    error: Option<io::Error>,
}

impl<W: Write> EventPrinter<W> {
    fn new(out: W, enabled: bool) -> Self {
        EventPrinter {
            out,
            enabled,
            error: None,
        }
    }

    fn emit(&mut self, event: Event) {
        if !self.enabled || self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", event) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> GeometrySink for EventPrinter<W> {
    fn on_vertex(&mut self, vertex: Vertex) {
        self.emit(Event::Vertex(vertex));
    }

    fn on_texture(&mut self, texture: TexCoord) {
        self.emit(Event::Texture(texture));
    }

    fn on_normal(&mut self, normal: Normal) {
        self.emit(Event::Normal(normal));
    }

    fn on_parameter(&mut self, parameter: Parameter) {
        self.emit(Event::Parameter(parameter));
    }

    fn on_face(&mut self, indices: &[IndexTriplet]) {
        if self.enabled {
            self.emit(Event::Face(indices.to_vec()));
        }
    }
}
