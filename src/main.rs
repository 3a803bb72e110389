//! Chunkview - Chunked Document Formatting
//!
//! Command-line entry point: formats an HTML document and prints the result.

use chunkview::{ChunkviewError, DocumentProcessor, NAME, ProcessorConfig, Result, VERSION};
use std::env;
use std::io::Read;

#[derive(Debug, Default)]
struct Options {
    budget: Option<usize>,
    show_chunks: bool,
    show_html: bool,
    input: Option<String>,
}

const USAGE: &str = "usage: chunkview [--budget <words>] [--chunks] [--html] <file | ->";

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--budget" => {
                let value = iter
                    .next()
                    .ok_or_else(|| ChunkviewError::Input("--budget needs a value".into()))?;
                let budget = value
                    .parse::<usize>()
                    .map_err(|_| ChunkviewError::Input(format!("invalid word budget: {}", value)))?;
                options.budget = Some(budget);
            }
            "--chunks" => options.show_chunks = true,
            "--html" => options.show_html = true,
            flag if flag.starts_with("--") => {
                return Err(ChunkviewError::Input(format!("unknown flag: {}", flag)));
            }
            path => options.input = Some(path.to_string()),
        }
    }

    if options.input.is_none() {
        return Err(ChunkviewError::Input(USAGE.to_string()));
    }
    if !options.show_chunks && !options.show_html {
        options.show_chunks = true;
    }
    Ok(options)
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

async fn run(options: Options) -> Result<()> {
    let input = options.input.as_deref().unwrap_or("-");
    let html = read_input(input)?;

    let mut config = ProcessorConfig::default();
    if let Some(budget) = options.budget {
        config.word_budget = budget;
    }
    let processor = DocumentProcessor::new(config);

    let doc = processor
        .format_document(&html, |p| {
            log::info!("{:?} {}/{} ({}%)", p.stage, p.current, p.total, p.percentage);
        })
        .await;

    if options.show_chunks {
        println!(
            "{} v{}: {} words, {} processing chunks, {} render chunks",
            NAME,
            VERSION,
            doc.total_words,
            doc.processing_chunks,
            doc.chunks.len()
        );
        for chunk in &doc.chunks {
            let preview: String = chunk.plain_text().split_whitespace().collect::<Vec<_>>().join(" ");
            let preview: String = preview.chars().take(60).collect();
            println!(
                "  {:<10} {:<12} h={:<4} {}",
                chunk.id(),
                chunk.chunk_type().as_str(),
                chunk.estimated_height(),
                preview
            );
        }
    }

    if options.show_html {
        println!("{}", chunkview::chunk::chunks_to_html(&doc.chunks));
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(options).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults_to_summary() {
        let options = parse_args(&args(&["doc.html"])).unwrap();
        assert!(options.show_chunks);
        assert!(!options.show_html);
        assert_eq!(options.input.as_deref(), Some("doc.html"));
    }

    #[test]
    fn test_parse_args_budget() {
        let options = parse_args(&args(&["--budget", "500", "--html", "-"])).unwrap();
        assert_eq!(options.budget, Some(500));
        assert!(options.show_html);
        assert!(!options.show_chunks);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--budget"])).is_err());
        assert!(parse_args(&args(&["--budget", "many", "x"])).is_err());
        assert!(parse_args(&args(&["--verbose", "x"])).is_err());
    }
}
