use std::io::Write as _;
use std::process::ExitCode;

use anyhow::Context as _;
use camino::Utf8PathBuf;
use clap::Parser;
use lunette_errors::Renderer;
use lunette_ide::{Analysis, Cancellation, File, PositionEncoding};
use lunette_lsp_server::Server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(version, about = "Semantic highlighting for Lua")]
enum Options {
    /// Run the language server on stdio.
    Server,
    /// Report syntax and binding errors in a file.
    Check { path: Utf8PathBuf },
    /// Print the semantic tokens of a file.
    Highlight {
        path: Utf8PathBuf,
        /// Count columns in bytes instead of UTF-16 code units.
        #[arg(long)]
        utf8: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Options::parse() {
        Options::Server => {
            log::info!("starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Server::stdio()?.run()?;
            Ok(ExitCode::SUCCESS)
        }
        Options::Check { path } => {
            let (analysis, file) = load(path)?;
            let db = analysis.db();
            let diagnostics = analysis.diagnostics(file);

            let renderer = Renderer::styled();
            let path = file.path(db).as_str();
            let text = file.text(db);
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic.render(&renderer, path, text));
            }

            Ok(if diagnostics.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Options::Highlight { path, utf8 } => {
            let (analysis, file) = load(path)?;
            let encoding = if utf8 { PositionEncoding::Utf8 } else { PositionEncoding::Utf16 };
            let tokens = analysis.semantic_tokens(file, None, encoding, &Cancellation::new())?;
            log::debug!("{} tokens", tokens.len());

            let mut stdout = std::io::stdout().lock();
            for token in tokens {
                writeln!(stdout, "{token}")?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: Utf8PathBuf) -> anyhow::Result<(Analysis, File)> {
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read `{path}`"))?;
    let analysis = Analysis::default();
    let file = File::new(analysis.db(), path, text);
    Ok((analysis, file))
}
