#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	critter_palettify::{
		io_readToString,
		palette::{self, PalettesTOML},
		stdoutRaw,
	},
	std::io::{self, BufWriter, Write},
};

fn main() {
	let PalettesTOML { palettes } =
		toml::from_str(&io_readToString(io::stdin()).unwrap()).unwrap_or_else(|err| panic!("{err}"));
	assert!(!palettes.is_empty(), "no [[palette]] tables on stdin");
	let stdout = &mut BufWriter::new(stdoutRaw());
	palette::toImage(&palettes).writePNG(&mut *stdout).unwrap_or_else(|err| panic!("{err}"));
	stdout.flush().unwrap();
}
