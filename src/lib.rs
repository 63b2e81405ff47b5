#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	const_format::concatcp,
	std::io::{self, Read},
};

pub const RGB_SIZE: usize = 3;
pub const RGBA_SIZE: usize = RGB_SIZE + 1;

pub type Rgb = [u8; RGB_SIZE];
pub type Rgba = [u8; RGBA_SIZE];

pub const ORIG_BRIGHT: Rgb = [255, 219, 77];
pub const ORIG_DARK: Rgb = [255, 144, 46];

pub const PALETTES_PNG: &str = "palettes.png";
pub const ORIG_DIR: &str = "orig";
pub const PNG_EXTENSION: &str = "png";
pub const PALETTE_NUMBER_PLACEHOLDER: &str = "{}";
pub const PALETTE_DIR_PATTERN: &str = concatcp!("palette", PALETTE_NUMBER_PLACEHOLDER);

pub use error::{Error, ImageError, Result};

pub mod error {
	use {
		std::{io, path::PathBuf},
		thiserror::Error,
	};

	pub type Result<T, E = Error> = core::result::Result<T, E>;

	#[derive(Error, Debug)]
	pub enum Error {
		#[error("{path:?}: failed to create directory: {source}")]
		CreateDir { path: PathBuf, source: io::Error },

		#[error("{path:?}: failed to list directory: {source}")]
		ReadDir { path: PathBuf, source: io::Error },

		#[error("{path:?}: {source}")]
		Io { path: PathBuf, source: io::Error },

		#[error("{path:?}: {source}")]
		Image { path: PathBuf, source: ImageError },

		#[error("{path:?}: invalid config: {source}")]
		Config { path: PathBuf, source: toml::de::Error },

		#[error("palette directory pattern {0:?} has no \"{{}}\" placeholder")]
		PaletteDirPattern(String),
	}

	#[derive(Error, Debug)]
	pub enum ImageError {
		#[error("failed to decode PNG: {0}")]
		Decode(#[from] png::DecodingError),

		#[error("failed to encode PNG: {0}")]
		Encode(#[from] png::EncodingError),

		#[error("unsupported PNG color type {0:?}")]
		UnsupportedColorType(png::ColorType),
	}
}

pub mod image {
	use {
		crate::{Error, ImageError, Result, Rgba, RGBA_SIZE, RGB_SIZE},
		png::{BitDepth, ColorType, Transformations},
		std::{
			fs::File,
			io::{BufReader, BufWriter, Read, Write},
			path::Path,
		},
	};

	/// Straight RGBA8 image, row-major, no padding between rows.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct Image {
		pub width: u32,
		pub height: u32,
		pub pixels: Vec<Rgba>,
	}

	impl Image {
		#[must_use]
		pub fn fromWidthPixels(width: u32, pixels: Vec<Rgba>) -> Image {
			let height = if width == 0 { 0 } else { (pixels.len() / width as usize) as _ };
			assert_eq!(pixels.len(), width as usize * height as usize);
			Image { width, height, pixels }
		}

		/// Decodes the first frame, whatever its color type or bit depth, into RGBA8.
		pub fn readPNG(read: impl Read) -> Result<Image, ImageError> {
			let mut decoder = png::Decoder::new(read);
			decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
			let png = &mut decoder.read_info()?;
			let mut data = vec![0; png.output_buffer_size()];
			let frame = png.next_frame(&mut data)?;
			data.truncate(frame.buffer_size());
			let pixels = match frame.color_type {
				ColorType::Rgba => {
					data.chunks_exact(RGBA_SIZE).map(|rgba| [rgba[0], rgba[1], rgba[2], rgba[3]]).collect()
				}
				ColorType::Rgb => {
					data.chunks_exact(RGB_SIZE).map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX]).collect()
				}
				ColorType::GrayscaleAlpha => data.chunks_exact(2).map(|ya| [ya[0], ya[0], ya[0], ya[1]]).collect(),
				ColorType::Grayscale => data.iter().map(|&y| [y, y, y, u8::MAX]).collect(),
				colorType => return Err(ImageError::UnsupportedColorType(colorType)),
			};
			Ok(Image { width: frame.width, height: frame.height, pixels })
		}

		pub fn writePNG(&self, write: impl Write) -> Result<(), ImageError> {
			let mut png = png::Encoder::new(write, self.width, self.height);
			png.set_color(ColorType::Rgba);
			png.set_depth(BitDepth::Eight);
			let mut writer = png.write_header()?;
			writer.write_image_data(&self.pixels.concat())?;
			writer.finish()?;
			Ok(())
		}

		pub fn open(path: &Path) -> Result<Image> {
			let file = File::open(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
			Image::readPNG(BufReader::new(file)).map_err(|source| Error::Image { path: path.to_owned(), source })
		}

		pub fn save(&self, path: &Path) -> Result<()> {
			let ioError = |source| Error::Io { path: path.to_owned(), source };
			let writer = &mut BufWriter::new(File::create(path).map_err(ioError)?);
			self.writePNG(&mut *writer).map_err(|source| Error::Image { path: path.to_owned(), source })?;
			writer.flush().map_err(ioError)
		}
	}

}

pub mod palette {
	use {
		crate::{image::Image, Result, Rgb, Rgba, RGB_SIZE},
		serde::{Deserialize, Serialize},
		std::path::Path,
		tracing::warn,
	};

	/// Replacement colors for one recolor pass.
	#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
	pub struct Palette {
		pub bright: Rgb,
		pub dark: Rgb,
	}

	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	pub struct PalettesTOML {
		#[serde(rename = "palette", default)]
		pub palettes: Vec<Palette>,
	}

	fn rgb(rgba: Rgba) -> Rgb {
		let mut rgb = [0; RGB_SIZE];
		rgb.copy_from_slice(&rgba[..RGB_SIZE]);
		rgb
	}

	/// Pixels 2n and 2n + 1 are the bright and dark colors of palette n.
	#[must_use]
	pub fn fromPixels(pixels: &[Rgba]) -> Vec<Palette> {
		let pairs = pixels.chunks_exact(2);
		if let [unpaired] = pairs.remainder() {
			warn!(pixel = ?unpaired, "palette image has an odd number of pixels, ignoring the last one");
		}
		pairs.map(|pair| Palette { bright: rgb(pair[0]), dark: rgb(pair[1]) }).collect()
	}

	pub fn load(path: &Path) -> Result<Vec<Palette>> {
		Ok(fromPixels(&Image::open(path)?.pixels))
	}

	/// One opaque row of bright/dark pairs, readable back by [`fromPixels`].
	#[must_use]
	pub fn toImage(palettes: &[Palette]) -> Image {
		let pixels: Vec<Rgba> = palettes
			.iter()
			.flat_map(|&Palette { bright, dark }| [bright, dark])
			.map(|[red, green, blue]| [red, green, blue, u8::MAX])
			.collect();
		Image::fromWidthPixels(pixels.len() as _, pixels)
	}

}

pub mod recolor {
	use {
		crate::{image::Image, palette::Palette, Rgb, Rgba, ORIG_BRIGHT, ORIG_DARK},
		serde::{Deserialize, Serialize},
	};

	/// The two flat colors the source artwork is drawn with.
	#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
	pub struct Markers {
		pub bright: Rgb,
		pub dark: Rgb,
	}

	impl Default for Markers {
		fn default() -> Self {
			Markers { bright: ORIG_BRIGHT, dark: ORIG_DARK }
		}
	}

	impl Markers {
		/// Exact RGB match only; alpha always passes through.
		#[must_use]
		pub fn recolorPixel(&self, pixel: Rgba, palette: &Palette) -> Rgba {
			let [red, green, blue, alpha] = pixel;
			let [red, green, blue] = match [red, green, blue] {
				rgb if rgb == self.bright => palette.bright,
				rgb if rgb == self.dark => palette.dark,
				_ => return pixel,
			};
			[red, green, blue, alpha]
		}

		pub fn recolorImage(&self, image: &mut Image, palette: &Palette) {
			for pixel in &mut image.pixels {
				*pixel = self.recolorPixel(*pixel, palette);
			}
		}
	}

}

pub mod config {
	use {
		crate::{recolor::Markers, Error, Result, ORIG_DIR, PALETTES_PNG, PALETTE_DIR_PATTERN, PALETTE_NUMBER_PLACEHOLDER},
		serde::{Deserialize, Serialize},
		std::{
			fs,
			path::{Path, PathBuf},
		},
	};

	/// Paths are taken relative to the working directory.
	#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
	#[serde(default, deny_unknown_fields)]
	pub struct Config {
		pub palettesPNG: PathBuf,
		pub origDir: PathBuf,
		pub paletteDirPattern: String,
		pub markers: Markers,
	}

	impl Default for Config {
		fn default() -> Self {
			Config {
				palettesPNG: PALETTES_PNG.into(),
				origDir: ORIG_DIR.into(),
				paletteDirPattern: PALETTE_DIR_PATTERN.into(),
				markers: Markers::default(),
			}
		}
	}

	impl Config {
		pub fn load(path: &Path) -> Result<Config> {
			let toml = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
			toml::from_str(&toml).map_err(|source| Error::Config { path: path.to_owned(), source })
		}

		/// Values given on the command line win over the file and the defaults.
		#[must_use]
		pub fn overriddenBy(
			self,
			palettesPNG: Option<PathBuf>,
			origDir: Option<PathBuf>,
			paletteDirPattern: Option<String>,
		) -> Config {
			Config {
				palettesPNG: palettesPNG.unwrap_or(self.palettesPNG),
				origDir: origDir.unwrap_or(self.origDir),
				paletteDirPattern: paletteDirPattern.unwrap_or(self.paletteDirPattern),
				..self
			}
		}

		pub fn validate(&self) -> Result<()> {
			if self.paletteDirPattern.contains(PALETTE_NUMBER_PLACEHOLDER) {
				Ok(())
			} else {
				Err(Error::PaletteDirPattern(self.paletteDirPattern.clone()))
			}
		}

		#[must_use]
		pub fn paletteDir(&self, paletteNumber: usize) -> PathBuf {
			self.paletteDirPattern.replacen(PALETTE_NUMBER_PLACEHOLDER, &paletteNumber.to_string(), 1).into()
		}
	}

}

pub mod batch {
	use {
		crate::{config::Config, image::Image, palette::{self, Palette}, Error, Result, PNG_EXTENSION},
		std::{
			fs, io,
			path::{Path, PathBuf},
		},
		tracing::{debug, info},
	};

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum DirCreation {
		Created,
		AlreadyExisted,
	}

	/// Only "already exists" is tolerated; any other failure is returned.
	pub fn ensureDir(path: &Path) -> Result<DirCreation> {
		let createDirError = |source| Error::CreateDir { path: path.to_owned(), source };
		match fs::create_dir(path) {
			Ok(()) => Ok(DirCreation::Created),
			Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(DirCreation::AlreadyExisted),
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				fs::create_dir_all(path).map_err(createDirError)?;
				Ok(DirCreation::Created)
			}
			Err(err) => Err(createDirError(err)),
		}
	}

	/// Same selection as the `*.png` glob (dot-files excluded), sorted by path.
	pub fn listSourcePNGs(origDir: &Path) -> Result<Vec<PathBuf>> {
		let readDirError = |source| Error::ReadDir { path: origDir.to_owned(), source };
		let mut sources = Vec::new();
		for entry in fs::read_dir(origDir).map_err(readDirError)? {
			let path = entry.map_err(readDirError)?.path();
			let isCandidate = path.extension().map_or(false, |extension| extension == PNG_EXTENSION)
				&& path.file_name().map_or(false, |name| !name.to_string_lossy().starts_with('.'));
			if isCandidate && path.is_file() {
				sources.push(path);
			}
		}
		sources.sort();
		Ok(sources)
	}

	#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
	pub struct Summary {
		pub palettes: usize,
		pub images: usize,
	}

	pub fn applyPalettes(config: &Config, palettes: &[Palette], sources: &[PathBuf]) -> Result<Summary> {
		let mut summary = Summary::default();
		for (paletteNumber, palette) in palettes.iter().enumerate() {
			let paletteDir = config.paletteDir(paletteNumber);
			let dirCreation = ensureDir(&paletteDir)?;
			info!(paletteNumber, ?palette, dir = ?paletteDir, ?dirCreation, "applying palette");
			for source in sources {
				let destination = match source.file_name() {
					Some(fileName) => paletteDir.join(fileName),
					None => continue,
				};
				let image = &mut Image::open(source)?;
				config.markers.recolorImage(image, palette);
				image.save(&destination)?;
				debug!(?source, ?destination, "recolored");
				summary.images += 1;
			}
			summary.palettes += 1;
		}
		Ok(summary)
	}

	pub fn run(config: &Config) -> Result<Summary> {
		config.validate()?;
		let palettes = palette::load(&config.palettesPNG)?;
		let sources = listSourcePNGs(&config.origDir)?;
		info!(palettes = palettes.len(), sources = sources.len(), "loaded");
		applyPalettes(config, &palettes, &sources)
	}
}

pub fn io_readToString(mut read: impl Read) -> io::Result<String> {
	let mut string = String::new();
	read.read_to_string(&mut string)?;
	Ok(string)
}

#[cfg(unix)]
#[must_use]
pub fn stdoutRaw() -> std::fs::File {
	use std::os::unix::io::FromRawFd;
	unsafe { std::fs::File::from_raw_fd(1) }
}

#[cfg(windows)]
#[must_use]
pub fn stdoutRaw() -> std::fs::File {
	use std::os::windows::io::{AsRawHandle, FromRawHandle};
	unsafe { std::fs::File::from_raw_handle(io::stdout().as_raw_handle()) }
}

pub fn initLogging(level: tracing::Level) {
	tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
}
