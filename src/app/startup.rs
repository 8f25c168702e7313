//! Application startup
//!
//! Resolves configuration (command line over config file over defaults),
//! initialises logging, runs the pipeline on a blocking thread under the
//! shutdown coordinator and prints the report.

use crate::app::cli::args::{Args, RunSettings};
use crate::app::cli::display::display_report;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version;
use crate::pipeline::api::{Pipeline, PipelineError, PipelineResult, RunReport, Sink, Source};
use std::io::IsTerminal;
use std::sync::Arc;

/// Every item went through
pub const EXIT_OK: i32 = 0;
/// Bad arguments, configuration or pipeline construction
pub const EXIT_CONFIG: i32 = 1;
/// The run finished but counts do not match, or it was cut short by a signal
pub const EXIT_INCOMPLETE: i32 = 2;

/// `10, 20, ..., items * 10`
pub fn dataset(items: usize) -> Vec<i64> {
    (1..=items as i64).map(|i| i * 10).collect()
}

/// Exit code for a finished run
///
/// A run that was asked to shut down never counts as a success, even when
/// every item made it through before the request landed.
pub fn exit_code(report: &RunReport) -> i32 {
    if report.is_complete() && !report.shutdown_requested {
        EXIT_OK
    } else {
        EXIT_INCOMPLETE
    }
}

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let args = match Args::parse_from_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { EXIT_CONFIG } else { EXIT_OK };
        }
    };

    let file_args = match Args::load_config_file(args.config_file.as_deref()).await {
        Ok(file_args) => file_args,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG;
        }
    };

    let settings = match args.merge_file_values(file_args).resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG;
        }
    };

    let use_color = settings.color.unwrap_or_else(|| {
        std::io::stdout().is_terminal() && colored::control::SHOULD_COLORIZE.should_colorize()
    });
    let log_file = settings.log_file.as_deref().and_then(|p| p.to_str());
    if let Err(e) = init_logging(
        Some(&settings.log_level),
        Some(&settings.log_format),
        log_file,
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return EXIT_CONFIG;
    }

    log::info!("handoff {} starting", version::describe());
    log::debug!("Settings: {:?}", settings);

    match run_pipeline(&settings).await {
        Ok(report) => {
            for worker in report.panicked_workers() {
                log::error!("{} panicked after moving {} items", worker.name, worker.items);
            }
            if let Err(e) = display_report(&report, settings.output, use_color) {
                log::error!("Failed to display report: {}", e);
            }
            let code = exit_code(&report);
            if code != EXIT_OK {
                log::warn!(
                    "Run incomplete: {} source items, {} produced, {} consumed{}",
                    report.source_items,
                    report.total_produced,
                    report.total_consumed,
                    if report.shutdown_requested {
                        " (shutdown requested)"
                    } else {
                        ""
                    }
                );
            }
            code
        }
        Err(e) => {
            log_error_with_context(&e, "Running pipeline");
            EXIT_CONFIG
        }
    }
}

/// Build the pipeline and run it, turning the first signal into a graceful
/// pipeline shutdown
async fn run_pipeline(settings: &RunSettings) -> PipelineResult<RunReport> {
    let source: Arc<Source<i64>> = Arc::new(dataset(settings.items).into_iter().collect());
    let sink = Arc::new(Sink::new());
    let pipeline = Pipeline::new(settings.pipeline.clone(), source, sink)?;
    let handle = pipeline.handle();

    ShutdownCoordinator::guard_with_coordinator(|mut shutdown_rx| async move {
        let watcher = tokio::spawn(async move {
            if shutdown_rx.recv().await.is_ok() {
                log::warn!("Signal received, stopping pipeline (repeat to exit immediately)");
                handle.shutdown();
            }
        });

        let joined = tokio::task::spawn_blocking(move || pipeline.run()).await;
        watcher.abort();

        joined
            .map_err(|e| PipelineError::ThreadSpawn {
                message: format!("pipeline runner failed: {}", e),
            })
            .and_then(|result| result)
    })
    .await
}
