use anyhow::Result;
use clap::Parser;
use std::path::Path;

// Import from helpdoc-core
use helpdoc_core::diagnostics::{all_passed, run_self_checks};
use helpdoc_core::processor::{PipelineStages, StepProfiler};
use helpdoc_core::{DocumentModel, DocumentProcessor, OutputFormat, ParseError, ParsingConfig};

// Import CLI utilities
use helpdoc::report::{
    default_output_path, format_self_check, matching_paragraphs, render_query_listing,
    writes_to_stdout, STDOUT_PATH,
};

/// Status line on stdout, or on stderr when the rendered output goes to stdout.
macro_rules! status {
    ($piped:expr, $($arg:tt)*) => {
        if $piped {
            eprintln!($($arg)*);
        } else {
            println!($($arg)*);
        }
    };
}

#[derive(Parser)]
#[command(name = "helpdoc")]
#[command(about = "Turn t24help field-help XML into a structured, searchable document model")]
struct Args {
    /// Path to the help XML file to process
    #[arg(short, long)]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: model, outline, or flat
    #[arg(short = 'f', long, default_value = "model")]
    output_format: String,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Output file path (if not specified, auto-generated based on input; `-` for stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Print the entries matching this query instead of writing output
    #[arg(short, long)]
    query: Option<String>,

    /// Enable minimal parse mode (bypass block classification)
    #[arg(long)]
    minimal_parse: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: extracted entries, merged fragments and the final model as separate files
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output (default: test_outputs/stages)
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Run built-in self checks and exit
    #[arg(long)]
    self_check: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let piped = writes_to_stdout(args.output.as_deref());

    status!(piped, "🦀 Helpdoc Field-Help Parser");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    if args.self_check {
        let checks = run_self_checks();
        for check in &checks {
            println!("{}", format_self_check(check));
        }
        if !all_passed(&checks) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        eprintln!("❌ No input file given. Use -i <path> (or --show-configs for options)");
        std::process::exit(1);
    };

    // Check if input file exists
    if !Path::new(input).exists() {
        status!(piped, "⚠️  Input XML not found at: {}", input);
        status!(piped, "   Please check the file path.");
        std::process::exit(1);
    }

    let format: OutputFormat = match args.output_format.parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let mut config = ParsingConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        status!(piped, "📋 Loaded config from: {}", config_path);
    } else {
        status!(piped, "📋 Using default config");
    }

    // Apply CLI overrides to config
    if args.minimal_parse {
        config.minimal_parse = true;
    }

    let processor = DocumentProcessor::new(config);
    status!(
        piped,
        "📄 Processing: {} ({} preprocessor)",
        input,
        processor.preprocessor_name()
    );

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        status!(piped, "\n🔬 Pipeline stage dump mode");
        let markup = std::fs::read_to_string(input)?;
        match processor.capture_stages(&markup) {
            Ok(stages) => {
                save_stages(&stages, input, &args.stages_dir)?;
                status!(piped, "\n✅ All stages dumped to: {}", args.stages_dir);
                return Ok(());
            }
            Err(e) => exit_with_failure("Stage dump failed", &e),
        }
    }

    let model = if args.profile {
        let markup = std::fs::read_to_string(input)?;
        let mut profiler = StepProfiler::new(true);
        let result = processor.process_markup_with_profiling(&markup, &mut profiler);
        if !piped {
            profiler.print_summary();
        }
        result
    } else {
        processor.process_file(Path::new(input)).map(|loaded| {
            if !loaded.validation.is_clean() {
                status!(
                    piped,
                    "⚠️  {} model issues (quality {:.2})",
                    loaded.validation.issues.len(),
                    loaded.validation.quality_score
                );
            }
            loaded.model
        })
    };

    let model = match model {
        Ok(model) => model,
        Err(e) => exit_with_failure("Processing failed", &e),
    };

    status!(piped, "✅ Successfully processed document");
    status!(piped, "📊 Model metrics:");
    status!(piped, "   - Entries: {}", model.entries.len());
    status!(piped, "   - Blocks: {}", model.block_count());
    status!(piped, "   - Obsolete: {}", model.obsolete_count());

    if let Some(query) = &args.query {
        print_query_results(&model, query);
        return Ok(());
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        default_output_path(input, args.config.as_deref(), format)
    });
    save_model(&model, &output_path, format)?;

    Ok(())
}

fn exit_with_failure(context: &str, error: &anyhow::Error) -> ! {
    match error.downcast_ref::<ParseError>() {
        Some(parse_error) if parse_error.is_malformed_input() => {
            eprintln!("❌ {context}: {parse_error}");
        }
        _ => eprintln!("❌ {context}: {error:#}"),
    }
    std::process::exit(1);
}

fn print_query_results(model: &DocumentModel, query: &str) {
    let listing = render_query_listing(model, query);
    println!("\n🔍 {} matches for \"{}\":", listing.len(), query.trim());
    for line in listing {
        println!("   {line}");
    }

    for entry in helpdoc_core::query::filter(&model.entries, query) {
        for snippet in matching_paragraphs(&entry.paragraphs, query) {
            println!("   {}: {}", entry.label, snippet);
        }
    }
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>         Load custom config file");
    println!("  --input <path>          Help XML file to process");
    println!("  --output <path>         Output file path (auto-generated if not specified, - for stdout)");
    println!("  --output-format <fmt>   Output format: model, outline, or flat");
    println!("  --query <text>          List matching entries with [[highlighted]] matches");
    println!("  --minimal-parse         Enable minimal parse mode (bypass block classification)");
    println!("  --profile               Time each pipeline stage");
    println!("  --dump-stages           Write every intermediate stage to --stages-dir");
    println!("  --self-check            Run built-in self checks");

    println!("\n📄 Output Formats:");
    println!("  model    - Full document model with typed blocks (default)");
    println!("  outline  - Plain-text rendering in display order");
    println!("  flat     - Per-entry paragraph lists (legacy view)");

    println!("\n⚙️  Config file keys (YAML):");
    println!("  minimal_parse                     bool, default false");
    println!("  continuation.enabled              bool, default true");
    println!("  rule_list.short_item_max_chars    number, default 60");
    println!("  report_anchor_collisions          bool, default true");
    println!("  pipeline.rules[].name / enabled   Table, ValidationRules, NoteCallout,");
    println!("                                    ExampleCallout, UnavailableCallout,");
    println!("                                    NotUsedCallout, ListDetection");

    match ParsingConfig::default().to_yaml() {
        Ok(yaml) => {
            println!("\n📝 Default config:");
            println!("{yaml}");
        }
        Err(e) => log::warn!("Could not render default config: {e}"),
    }

    println!("📝 Usage Examples:");
    println!("  cargo run -- -i PM.LD.PARAM.xml");
    println!("  cargo run -- -i PM.LD.PARAM.xml -f outline -o -");
    println!("  cargo run -- -i PM.LD.PARAM.xml -q currency");
}

fn save_stages(stages: &PipelineStages, input: &str, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1: Extracted header, overview and raw fragments
    let extracted_path = format!("{}/stage1_extracted.json", output_dir);
    fs::write(
        &extracted_path,
        serde_json::to_string_pretty(&stages.extracted)?,
    )?;
    println!(
        "  💾 {} ({} entries)",
        extracted_path,
        stages.extracted.entries.len()
    );

    // Stage 2: Fragments after the continuation merge
    let merged_path = format!("{}/stage2_merged_fragments.json", output_dir);
    fs::write(
        &merged_path,
        serde_json::to_string_pretty(&stages.merged_fragments)?,
    )?;
    println!("  💾 {}", merged_path);

    // Stage 3: Final model
    let model_path = format!("{}/stage3_model.json", output_dir);
    stages
        .model
        .save_with_format(&model_path, OutputFormat::Model)?;
    println!(
        "  💾 {} ({} blocks)",
        model_path,
        stages.model.block_count()
    );

    // Summary file: quick reference for validation scripts
    let summary = serde_json::json!({
        "input": input,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "extracted_entries": stages.extracted.entries.len(),
            "fallback_entries": stages.extracted.entries.iter().filter(|e| e.used_fallback).count(),
            "merged_fragments": stages.merged_fragments.iter().map(|m| m.fragments.len()).sum::<usize>(),
            "model_blocks": stages.model.block_count(),
        }
    });
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}

fn save_model(model: &DocumentModel, output_path: &str, format: OutputFormat) -> Result<()> {
    if output_path == STDOUT_PATH {
        println!("{}", model.render(format)?);
        return Ok(());
    }

    model.save_with_format(output_path, format)?;
    match format {
        OutputFormat::Model => println!("💾 Model format results saved to: {}", output_path),
        OutputFormat::Outline => println!("💾 Outline saved to: {}", output_path),
        OutputFormat::Flat => println!("💾 Flat format results saved to: {}", output_path),
    }

    Ok(())
}
