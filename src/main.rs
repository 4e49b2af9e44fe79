use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use regpdf_checklist::{
    analyze_structure, check_deps, doc_slug, document_meta, emit_document, enumerate_pdfs, install_help_for,
    load_config, parse_fragments, sha256_hex, unique_slug, validate_input_file, ChecklistParser, EnumerateError,
    Language, Limits, ParserOptions, PopplerPositioner,
};

#[derive(Parser, Debug)]
#[command(
    name = "regpdf2checklist",
    version,
    about = "Extract compliance checklists from bilingual regulatory PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one PDF and print or emit its checklist.
    Parse(ParseArgs),
    /// Parse every PDF matched by the config's input glob.
    Batch(BatchArgs),
    /// Print per-page language and structure statistics.
    Analyze(AnalyzeArgs),
    /// Check that pdftotext is installed.
    CheckDeps,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LangArg {
    En,
    Ar,
}

impl From<LangArg> for Language {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Language::En,
            LangArg::Ar => Language::Ar,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct ParseArgs {
    #[arg(long)]
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = LangArg::En)]
    lang: LangArg,

    /// Write `<slug>.<lang>.json` and meta here instead of printing.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = regpdf_checklist::lines::DEFAULT_LINE_TOLERANCE)]
    line_tolerance: f64,
}

#[derive(Args, Debug, Clone)]
struct BatchArgs {
    #[arg(long, default_value = "checklist.yaml")]
    config: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[arg(long)]
    file: PathBuf,

    #[arg(long, default_value_t = regpdf_checklist::lines::DEFAULT_LINE_TOLERANCE)]
    line_tolerance: f64,
}

fn main() {
    init_tracing();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => run_parse(args).map(|_| 0),
        Commands::Batch(args) => run_batch(args),
        Commands::Analyze(args) => run_analyze(args).map(|_| 0),
        Commands::CheckDeps => Ok(run_check_deps()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn file_name_of(path: &Path) -> String {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("doc.pdf").to_string()
}

fn read_pdf(path: &Path, limits: &Limits) -> Result<Vec<u8>> {
    validate_input_file(path, limits)?;
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run_check_deps() -> i32 {
    let deps = check_deps();
    if deps.ok {
        info!("pdftotext found");
        return 0;
    }
    warn!(missing = ?deps.missing, "missing dependencies");
    eprintln!("{}", install_help_for(&deps.missing));
    2
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let started_ms = now_ms();
    let buffer = read_pdf(&args.file, &Limits::default())?;
    let file_name = file_name_of(&args.file);
    let options = ParserOptions { line_tolerance: args.line_tolerance, ..ParserOptions::default() };
    let parser = ChecklistParser::with_options(PopplerPositioner::default(), options);

    let doc = parser
        .parse(&buffer, &file_name, args.lang.into())
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    info!(file = %file_name, items = doc.items.len(), "checklist extracted");

    match args.out_dir {
        Some(out_dir) => {
            let doc_id = doc_slug(&doc.title);
            let meta = document_meta(&doc, &doc_id, &sha256_hex(&buffer), started_ms, now_ms());
            let outdir = out_dir.to_string_lossy();
            let paths = emit_document(&doc, &meta, &outdir, &doc_id)?;
            info!(json = %paths.json_path, meta = %paths.meta_path, "emitted");
        }
        None => println!("{}", serde_json::to_string_pretty(&doc)?),
    }
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let buffer = read_pdf(&args.file, &Limits::default())?;
    let parser = ChecklistParser::new(PopplerPositioner::default());
    let pages = parser.fragments(&buffer)?;
    let report = analyze_structure(&pages, args.line_tolerance);
    info!(
        pages = report.total_pages,
        numbered = report.total_numbered_items(),
        bullets = report.total_bullet_points(),
        "structure analyzed"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

struct BatchJob {
    path: PathBuf,
    doc_id: String,
}

fn run_batch(args: BatchArgs) -> Result<i32> {
    let cfg = load_config(&args.config)?;
    info!(id = %cfg.id, input = %cfg.input, output_dir = %cfg.output_dir, "config loaded");

    let deps = check_deps();
    if !deps.ok {
        warn!(missing = ?deps.missing, "missing dependencies");
        eprintln!("{}", install_help_for(&deps.missing));
        return Ok(2);
    }

    let files = match enumerate_pdfs(&cfg.input) {
        Ok(files) => files,
        Err(EnumerateError::NoFilesFound { guidance }) => {
            eprintln!("{}", guidance);
            bail!("no PDF files matched {}", cfg.input);
        }
    };
    info!(count = files.len(), "pdfs enumerated");

    let mut used = HashSet::new();
    let jobs: Vec<BatchJob> = files
        .into_iter()
        .map(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("doc").to_string();
            let doc_id = unique_slug(doc_slug(&stem), &mut used);
            BatchJob { path, doc_id }
        })
        .collect();

    let parser = ChecklistParser::with_options(PopplerPositioner::default(), cfg.parser);
    let failures: usize = jobs
        .par_iter()
        .map(|job| {
            let outdir = Path::new(&cfg.output_dir).join(&job.doc_id);
            match process_file(&parser, job, &cfg.languages, &cfg.limits, &outdir) {
                Ok(()) => 0,
                Err(err) => {
                    error!(file = %job.path.display(), error = %err, "file failed");
                    1
                }
            }
        })
        .sum();

    info!(files = jobs.len(), failures, "batch finished");
    Ok(if failures > 0 { 1 } else { 0 })
}

fn process_file(
    parser: &ChecklistParser<PopplerPositioner>,
    job: &BatchJob,
    languages: &[Language],
    limits: &Limits,
    outdir: &Path,
) -> Result<()> {
    let buffer = read_pdf(&job.path, limits)?;
    let source_sha = sha256_hex(&buffer);
    let file_name = file_name_of(&job.path);
    let outdir = outdir.to_string_lossy();
    let pages = parser.fragments(&buffer)?;

    for &language in languages {
        let started_ms = now_ms();
        let doc = parse_fragments(&pages, &file_name, language, parser.options())?;
        let meta = document_meta(&doc, &job.doc_id, &source_sha, started_ms, now_ms());
        let paths = emit_document(&doc, &meta, &outdir, &job.doc_id)?;
        info!(
            file = %file_name,
            language = %language,
            items = doc.items.len(),
            json = %paths.json_path,
            "emitted"
        );
    }
    Ok(())
}
