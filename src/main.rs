mod app;
mod config;
mod flow;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::Settings;
use flow::FlowSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the service that serves `GET /api/flow`.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Read the flow JSON from a local file instead of the server.
    #[arg(long)]
    flow_file: Option<PathBuf>,

    /// TOML file with `[layout]` and `[view]` overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

impl Args {
    fn flow_source(&self) -> FlowSource {
        match &self.flow_file {
            Some(path) => FlowSource::File(path.clone()),
            None => FlowSource::Server(self.server.clone()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    let source = args.flow_source();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width.max(320.0), args.height.max(240.0)]),
        ..Default::default()
    };

    eframe::run_native(
        "code-flow-lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::CodeFlowApp::new(cc, source, settings)))),
    )
    .map_err(|error| anyhow::anyhow!("failed to run the code flow window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_file_takes_precedence_over_server() {
        let args = Args::parse_from([
            "code-flow-lens",
            "--server",
            "http://docs.internal",
            "--flow-file",
            "flow.json",
        ]);
        assert_eq!(args.flow_source(), FlowSource::File(PathBuf::from("flow.json")));
    }

    #[test]
    fn server_defaults_to_localhost() {
        let args = Args::parse_from(["code-flow-lens"]);
        assert_eq!(
            args.flow_source(),
            FlowSource::Server("http://127.0.0.1:8000".to_owned())
        );
        assert_eq!(args.config, None);
    }
}
