//! foldlex - style and fold Haskell and R sources from the command line
//!
//! Prints a file with terminal colours, its token spans, or its fold
//! levels.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Once;

use crossterm::style::Stylize;

use foldlex::syntax::{Document, Encoding, FoldLevel, SyntaxManager, TextBuffer};
use foldlex::{Config, Error, Result};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber when `FOLDLEX_LOG` is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if env::var("FOLDLEX_LOG").is_ok() {
            let filter = EnvFilter::from_env("FOLDLEX_LOG");
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

/// What to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Colour,
    Tokens,
    Folds,
}

/// Parsed command line
#[derive(Debug)]
struct Options {
    language: Option<String>,
    properties: Vec<(String, String)>,
    output: Output,
    file: PathBuf,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    // Handle --help and --version
    if let Some(first) = args.first() {
        match first.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-V" => {
                print_version();
                return Ok(());
            }
            _ => {}
        }
    }

    let options = parse_args(&args)?;
    let manager = SyntaxManager::with_config(Config::load()?);

    let bytes = fs::read(&options.file)?;
    let first_line = first_line(&bytes);
    let language = match &options.language {
        Some(name) => name.clone(),
        None => manager
            .detect_language(&options.file, first_line.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Usage(format!(
                    "cannot detect the language of {}; use --language",
                    options.file.display()
                ))
            })?,
    };

    let mut highlighter = manager.highlighter(&language)?;
    for (key, value) in &options.properties {
        highlighter.set_property(key, value)?;
    }

    let mut doc = TextBuffer::from_bytes(bytes, Encoding::Utf8);
    let len = doc.length();
    highlighter.ensure_styled_to(&mut doc, len);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match options.output {
        Output::Colour => print_coloured(&mut out, &doc)?,
        Output::Tokens => print_tokens(&mut out, &doc)?,
        Output::Folds => print_folds(&mut out, &doc)?,
    }
    out.flush()?;
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut language = None;
    let mut properties = Vec::new();
    let mut output = Output::Colour;
    let mut file = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-l" | "--language" => {
                let name = iter
                    .next()
                    .ok_or_else(|| Error::Usage(format!("{} needs a language name", arg)))?;
                language = Some(name.clone());
            }
            "-s" | "--set" => {
                let setting = iter
                    .next()
                    .ok_or_else(|| Error::Usage(format!("{} needs KEY=VALUE", arg)))?;
                let (key, value) = setting
                    .split_once('=')
                    .ok_or_else(|| Error::Usage(format!("expected KEY=VALUE, got {}", setting)))?;
                properties.push((key.trim().to_string(), value.trim().to_string()));
            }
            "-t" | "--tokens" => output = Output::Tokens,
            "-f" | "--folds" => output = Output::Folds,
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(Error::Usage(format!("unknown option {}", arg)));
            }
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => return Err(Error::Usage(format!("unexpected argument {}", arg))),
        }
    }

    let file = file.ok_or_else(|| Error::Usage("no input file given".to_string()))?;
    Ok(Options {
        language,
        properties,
        output,
        file,
    })
}

/// First line of a file, if it decodes
fn first_line(bytes: &[u8]) -> Option<String> {
    let end = bytes
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end]).ok().map(str::to_string)
}

fn print_coloured(out: &mut impl Write, doc: &TextBuffer) -> io::Result<()> {
    for span in doc.style_runs() {
        let text = doc.text_range(span.start, span.end);
        let style = span.token.default_style();
        if style.is_default() {
            write!(out, "{}", text)?;
        } else {
            // Style each line on its own so line ends stay unstyled
            let mut lines = text.split('\n').peekable();
            while let Some(line) = lines.next() {
                if !line.is_empty() {
                    write!(out, "{}", style.to_content_style().apply(line))?;
                }
                if lines.peek().is_some() {
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

fn print_tokens(out: &mut impl Write, doc: &TextBuffer) -> io::Result<()> {
    for span in doc.style_runs() {
        writeln!(
            out,
            "{}..{} {} {:?}",
            span.start,
            span.end,
            span.token.name(),
            doc.text_range(span.start, span.end)
        )?;
    }
    Ok(())
}

fn print_folds(out: &mut impl Write, doc: &TextBuffer) -> io::Result<()> {
    for line in 0..doc.line_count() {
        let text = doc.line_text(line);
        if text.is_empty() && line + 1 == doc.line_count() {
            break;
        }
        let level = FoldLevel::from_raw(doc.level(line));
        let marker = if level.header { "+".bold() } else { " ".stylize() };
        let white = if level.white { 'w' } else { ' ' };
        writeln!(
            out,
            "{:>3} {}{} | {}",
            level.depth(),
            marker,
            white,
            text.trim_end_matches(['\r', '\n'])
        )?;
    }
    Ok(())
}

fn print_usage() {
    println!("foldlex {} - syntax styling and code folding", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: foldlex [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -l, --language NAME   Force a language instead of detecting it");
    println!("  -s, --set KEY=VALUE   Set a lexer property (repeatable)");
    println!("  -f, --folds           Prefix each line with its fold level and markers");
    println!("  -t, --tokens          Print spans as \"start..end Token\" instead of colour");
    println!("  -h, --help            Show this help message");
    println!("  -V, --version         Show version information");
    println!();
    println!("Languages: Haskell (.hs .lhs .hsc), R (.r .R .Rprofile)");
    println!();
    match Config::config_path() {
        Some(path) => println!("Configuration is read from {}", path.display()),
        None => println!("Set FOLDLEX_CONFIG to read a configuration file"),
    }
    println!("Set FOLDLEX_LOG (e.g. FOLDLEX_LOG=foldlex=trace) for diagnostics");
}

fn print_version() {
    println!("foldlex {}", env!("CARGO_PKG_VERSION"));
    println!("Haskell and R lexers with indentation and brace folding");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["-l", "R", "-s", "fold.at.else=1", "-t", "x.R"])).unwrap();
        assert_eq!(options.language.as_deref(), Some("R"));
        assert_eq!(
            options.properties,
            vec![("fold.at.else".to_string(), "1".to_string())]
        );
        assert_eq!(options.output, Output::Tokens);
        assert_eq!(options.file, PathBuf::from("x.R"));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(parse_args(&args(&[])), Err(Error::Usage(_))));
        assert!(matches!(parse_args(&args(&["-s", "fold"])), Err(Error::Usage(_))));
        assert!(matches!(parse_args(&args(&["-l"])), Err(Error::Usage(_))));
        assert!(matches!(parse_args(&args(&["--bogus", "a"])), Err(Error::Usage(_))));
        assert!(matches!(parse_args(&args(&["a", "b"])), Err(Error::Usage(_))));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line(b"#!/usr/bin/env Rscript\nx"), Some("#!/usr/bin/env Rscript".to_string()));
        assert_eq!(first_line(b"one\r\ntwo"), Some("one".to_string()));
        assert_eq!(first_line(b""), Some(String::new()));
    }

    #[test]
    fn test_print_tokens() {
        let manager = SyntaxManager::new();
        let mut hl = manager.highlighter("R").unwrap();
        let mut doc = TextBuffer::new("x <- 1");
        hl.ensure_styled_to(&mut doc, 6);

        let mut out = Vec::new();
        print_tokens(&mut out, &doc).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "0..1 Identifier \"x\"\n1..2 Default \" \"\n2..4 Operator \"<-\"\n4..5 Default \" \"\n5..6 Number \"1\"\n"
        );
    }
}
