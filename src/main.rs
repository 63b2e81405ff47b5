#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	critter_palettify::{batch, config::Config, initLogging, Result},
	std::{path::PathBuf, process::ExitCode},
	tracing::{error, info},
};

/// Recolors every orig/*.png once per palette found in palettes.png, writing palette<N>/*.png.
#[derive(Parser)]
#[clap(version)]
struct Args {
	/// TOML file overriding the default paths and marker colors
	#[clap(long, value_parser)]
	config: Option<PathBuf>,

	#[clap(long, value_parser)]
	palettesPNG: Option<PathBuf>,

	#[clap(long, value_parser)]
	origDir: Option<PathBuf>,

	/// Output directory name, "{}" is replaced by the palette number
	#[clap(long, value_parser)]
	paletteDirPattern: Option<String>,

	#[clap(long, value_parser, default_value = "warn")]
	logLevel: tracing::Level,
}

fn main() -> ExitCode {
	let Args { config, palettesPNG, origDir, paletteDirPattern, logLevel } = Args::parse();
	initLogging(logLevel);
	let run = || -> Result<batch::Summary> {
		let config = match config {
			Some(path) => Config::load(&path)?,
			None => Config::default(),
		}
		.overriddenBy(palettesPNG, origDir, paletteDirPattern);
		batch::run(&config)
	};
	match run() {
		Ok(batch::Summary { palettes, images }) => {
			info!(palettes, images, "done");
			ExitCode::SUCCESS
		}
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}
