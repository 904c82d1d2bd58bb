use crate::cli::AnalyzeArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tracing::{info, warn};
use vmdscript::{
    core::host::memory::MemoryHost, engine::progress::ProgressReporter, workflows,
};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialAnalysisConfig::from_file(path)?,
        None => PartialAnalysisConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let request = partial_config.merge_with_cli(&args)?;

    let num_files = request.analyzer.input_files.len();
    if num_files == 0 {
        warn!("No trajectory files given; nothing will be analyzed.");
    }
    if request.datasets.is_empty() {
        warn!("No datasets configured; frames are analyzed but nothing is written.");
    }

    let host = MemoryHost::new();
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Analyzing {} trajectory file(s), every {} frame(s), {} frame(s) at a time...",
        num_files, request.analyzer.sampling_step, request.analyzer.window_size
    );
    info!("Invoking the core analysis workflow...");

    let report = workflows::analyze::run(&host, &request, reporter)?;

    println!(
        "✓ Analyzed {} frame(s) from {} file(s) in {} window load(s).",
        report.summary.frames_analyzed,
        report.summary.files_processed,
        report.summary.windows_loaded
    );
    for path in &report.outputs {
        println!("  Dataset written to: {}", path.display());
    }

    Ok(())
}
