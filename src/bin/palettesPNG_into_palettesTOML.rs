#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	critter_palettify::{
		image::Image,
		initLogging,
		palette::{self, PalettesTOML},
		stdoutRaw,
	},
	std::io::{self, Write},
};

fn main() {
	initLogging(tracing::Level::WARN);
	let image = Image::readPNG(io::stdin().lock()).unwrap_or_else(|err| panic!("{err}"));
	let palettesTOML = PalettesTOML { palettes: palette::fromPixels(&image.pixels) };
	stdoutRaw()
		.write_all(toml::to_string_pretty(&palettesTOML).unwrap_or_else(|err| panic!("{err}")).as_bytes())
		.unwrap();
}
