//! Analyze one WAV file and print the result as JSON.
//!
//! ```text
//! analyze <file.wav> [--profile <key>] [--expected <text>] [--transcript <text>]
//!         [--language <pt-BR|en-US|auto>] [--config <file.json>] [--summary]
//! ```
//!
//! No speech recognizer ships with the crate. `--transcript` feeds a known
//! transcript through the stub transcriber so the text metrics can be tried.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use voicemeter::{
    load_config, AnalysisConfig, AnalysisOptions, AnalysisRequest, SpeechAnalyzer,
    StubTranscriber, TranscriberHandle, WavDecoder,
};

#[derive(Debug)]
struct Args {
    input: PathBuf,
    profile: String,
    expected: Option<String>,
    transcript: Option<String>,
    language: Option<String>,
    config: Option<PathBuf>,
    summary: bool,
}

fn usage() -> &'static str {
    "Usage: analyze <file.wav> [--profile <key>] [--expected <text>] [--transcript <text>] \\
  [--language <pt-BR|en-US|auto>] [--config <file.json>] [--summary]"
}

fn parse_args() -> anyhow::Result<Args> {
    let mut input: Option<PathBuf> = None;
    let mut profile = String::from("presentation");
    let mut expected = None;
    let mut transcript = None;
    let mut language = None;
    let mut config = None;
    let mut summary = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| {
            it.next()
                .with_context(|| format!("missing value for {name}"))
        };
        match arg.as_str() {
            "--profile" => profile = value("--profile")?,
            "--expected" => expected = Some(value("--expected")?),
            "--transcript" => transcript = Some(value("--transcript")?),
            "--language" => language = Some(value("--language")?),
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--summary" => summary = true,
            "--help" | "-h" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown argument: {other}"),
            other => {
                if input.is_some() {
                    bail!("more than one input file given");
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    let Some(input) = input else {
        bail!("no input file\n{}", usage());
    };
    Ok(Args {
        input,
        profile,
        expected,
        transcript,
        language,
        config,
        summary,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voicemeter=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => load_config(path),
        None => AnalysisConfig::default(),
    };
    config.apply_env_overrides();

    let transcriber = args
        .transcript
        .as_deref()
        .map(|text| TranscriberHandle::new(StubTranscriber::with_text(text)));
    let analyzer = Arc::new(SpeechAnalyzer::new(config, Arc::new(WavDecoder), transcriber));
    analyzer.warm_up()?;

    let audio = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut options = AnalysisOptions::new(args.profile);
    if let Some(text) = args.expected {
        options = options.with_expected_text(text);
    }
    if let Some(hint) = args.language {
        options = options.with_language(hint);
    }

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let result = runtime.block_on(analyzer.analyze(AnalysisRequest::new(audio, options)))?;

    let json = if args.summary {
        serde_json::to_string_pretty(&result.summary())?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(())
}
