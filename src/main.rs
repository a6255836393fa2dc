mod ui;

use citra_launcher::log_filter::{self, LogFilter, FRONTEND};
use citra_launcher::{
    CanonicalResolver, DocumentRequest, LauncherConfig, LauncherShim, NativeCore, ResourceHandle,
    ResultStatus, SelectionOutcome, GAME_EXTENSIONS,
};
use clap::Parser;
use std::fs::{create_dir_all, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "citra-launcher")]
#[command(about = "Pick a game and hand it to the Citra core")]
struct Args {
    /// Game path or document URI; skips the launcher window
    target: Option<String>,

    /// Native core library exporting the entry point
    #[arg(long)]
    core: Option<PathBuf>,

    /// Name of the exported entry point
    #[arg(long)]
    symbol: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// A writer that writes to both stdout and a file
struct DualWriter {
    file: File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

fn init_logging(filter: &LogFilter, debug: bool) {
    let logs_dir = PathBuf::from("logs");
    if let Err(e) = create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not create logs directory: {}", e);
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let log_path = logs_dir.join(format!("citra_launcher_{}.log", timestamp));

    let log_file = match File::create(&log_path) {
        Ok(file) => {
            println!("Log file: {}", log_path.display());
            Some(file)
        }
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            None
        }
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if debug {
        log::LevelFilter::Debug
    } else {
        filter.default
    });
    for (class, level) in &filter.classes {
        builder.filter_module(class, *level);
    }
    // RUST_LOG still wins when set
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if let Some(file) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(DualWriter { file })));
    }

    builder.init();
}

fn main() {
    let args = Args::parse();

    // Opened before logging exists; how it went is reported once the logger is up
    let config_path = LauncherConfig::config_path();
    let (mut config, config_source) = LauncherConfig::open(&config_path);
    if let Some(core) = args.core {
        config.core_library = Some(core);
    }
    if let Some(symbol) = args.symbol {
        config.entry_symbol = symbol;
    }

    let (filter, rejected) = LogFilter::parse_quiet(&config.log_filter);
    init_logging(&filter, args.debug);
    config_source.log(&config_path);
    log_filter::log_rejected(&rejected);

    let Some(core_path) = config.core_library.clone() else {
        eprintln!("No native core configured; pass --core <LIBRARY>");
        return;
    };

    let core = match NativeCore::open(&core_path, &config.entry_symbol) {
        Ok(core) => core,
        Err(e) => {
            eprintln!("Error loading native core: {}", e);
            return;
        }
    };

    let request = DocumentRequest::default()
        .with_start_dir(config.last_directory.clone())
        .with_filter("3DS games", GAME_EXTENSIONS);
    let mut shim =
        LauncherShim::new(CanonicalResolver::new(config.storage_volumes()), core).with_request(request);

    if let Some(target) = args.target {
        let outcome = shim.on_selection_complete(ResultStatus::Ok, Some(ResourceHandle::new(target)));
        if let SelectionOutcome::Loaded(resource) = outcome {
            config.add_recent(PathBuf::from(resource.path));
            if let Err(e) = config.save() {
                log::error!(target: FRONTEND, "Failed to save configuration: {}", e);
            }
        }
        return;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Citra")
            .with_inner_size([420.0, 560.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Citra",
        options,
        Box::new(|_cc| Ok(Box::new(ui::LauncherApp::new(shim, config)))),
    ) {
        eprintln!("Error running launcher window: {}", e);
    }
}
