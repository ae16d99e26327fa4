use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use signpad::EngineConfig;
use signpad::script::ScriptReport;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  replay <dir> [config.json]   Replay every .gesture script and write its outputs");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "replay" => {
            let Some(dir) = args.get(2) else {
                eprintln!("Usage: cargo xtask replay <dir> [config.json]");
                std::process::exit(1);
            };
            let config = match args.get(3) {
                Some(path) => match EngineConfig::load(Utf8Path::new(path)) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(1);
                    }
                },
                None => EngineConfig::default(),
            };
            if !replay(Utf8Path::new(dir), &config) {
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            std::process::exit(1);
        }
    }
}

/// Replay every script under `dir` in parallel. Returns false if any failed.
fn replay(dir: &Utf8Path, config: &EngineConfig) -> bool {
    let scripts = match collect_scripts(dir) {
        Ok(scripts) => scripts,
        Err(e) => {
            eprintln!("Failed to read {dir}: {e}");
            return false;
        }
    };
    tracing::info!(count = scripts.len(), %dir, "replaying gesture scripts");

    let results: Vec<(Utf8PathBuf, Result<usize, String>)> = scripts
        .into_par_iter()
        .map(|path| {
            let result = replay_one(&path, config);
            (path, result)
        })
        .collect();

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(written) => println!("ok    {path} ({written} file(s) written)"),
            Err(report) => {
                failed += 1;
                println!("FAIL  {path}");
                eprintln!("{report}");
            }
        }
    }
    println!("{} passed, {} failed", results.len() - failed, failed);
    failed == 0
}

fn collect_scripts(dir: &Utf8Path) -> std::io::Result<Vec<Utf8PathBuf>> {
    let mut scripts = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let path = entry?.into_path();
        if path.extension() == Some("gesture") {
            scripts.push(path);
        }
    }
    scripts.sort();
    Ok(scripts)
}

fn replay_one(path: &Utf8Path, config: &EngineConfig) -> Result<usize, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    // a sibling `<script>.config.json` wins over the command-line config
    let local = path.with_extension("config.json");
    let local = if local.exists() {
        Some(EngineConfig::load(&local).map_err(|e| format!("{:?}", miette::Report::new(e)))?)
    } else {
        None
    };
    let config = local.as_ref().unwrap_or(config);
    let report = signpad::script::run(path.as_str(), &source, config).map_err(|e| format!("{e:?}"))?;
    write_outputs(path, &report).map_err(|e| format!("{path}: {e}"))
}

/// `<script>.png` for the saved signature and `<script>.<document>.json`
/// for every document bundle
fn write_outputs(path: &Utf8Path, report: &ScriptReport) -> std::io::Result<usize> {
    let mut written = 0;
    if let Some(signature) = report.saved_signature() {
        std::fs::write(path.with_extension("png"), signature.png_bytes())?;
        written += 1;
    }
    for bundle in report.bundles() {
        if !bundle.document_id.is_file_safe() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("document id {:?} cannot be used in a file name", bundle.document_id.as_str()),
            ));
        }
        let out = path.with_extension(format!("{}.json", bundle.document_id));
        let json = serde_json::to_string_pretty(&bundle).map_err(std::io::Error::other)?;
        std::fs::write(out, json)?;
        written += 1;
    }
    tracing::debug!(%path, written, "outputs written");
    Ok(written)
}
