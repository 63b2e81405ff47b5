#![allow(non_snake_case)]

use {
	critter_palettify::{
		batch::{self, DirCreation, Summary},
		config::Config,
		image::Image,
		palette::{self, Palette},
		Error,
	},
	std::{
		env, fs,
		ops::Deref,
		path::{Path, PathBuf},
		process,
	},
};

const BRIGHT: [u8; 4] = [255, 219, 77, 255];
const DARK: [u8; 4] = [255, 144, 46, 255];

/// Removed again when the test ends, pass or fail.
struct ScratchDir(PathBuf);

impl Deref for ScratchDir {
	type Target = Path;

	fn deref(&self) -> &Path {
		&self.0
	}
}

impl Drop for ScratchDir {
	fn drop(&mut self) {
		_ = fs::remove_dir_all(&self.0);
	}
}

fn scratchDir(name: &str) -> ScratchDir {
	let dir = env::temp_dir().join(format!("critter_palettify-{}-{name}", process::id()));
	if dir.exists() {
		fs::remove_dir_all(&dir).unwrap();
	}
	fs::create_dir_all(dir.join("orig")).unwrap();
	ScratchDir(dir)
}

fn configIn(dir: &Path) -> Config {
	Config {
		palettesPNG: dir.join("palettes.png"),
		origDir: dir.join("orig"),
		paletteDirPattern: dir.join("palette{}").to_string_lossy().into_owned(),
		..Config::default()
	}
}

fn sprite() -> Image {
	Image::fromWidthPixels(
		3,
		vec![BRIGHT, DARK, [0; 4], [255, 219, 77, 64], [255, 144, 46, 0], [255, 200, 60, 255]],
	)
}

fn plain() -> Image {
	Image::fromWidthPixels(2, vec![[1, 2, 3, 4], [255, 219, 76, 255]])
}

fn seed(dir: &Path, palettes: &[Palette]) {
	palette::toImage(palettes).save(&dir.join("palettes.png")).unwrap();
	sprite().save(&dir.join("orig/sprite.png")).unwrap();
	plain().save(&dir.join("orig/plain.png")).unwrap();
}

#[test]
fn single_palette_recolors_every_sprite() {
	let dir = &scratchDir("single");
	seed(dir, &[Palette { bright: [10, 20, 30], dark: [40, 50, 60] }]);

	let summary = batch::run(&configIn(dir)).unwrap();
	assert_eq!(summary, Summary { palettes: 1, images: 2 });
	assert!(dir.join("palette0").is_dir());
	assert!(!dir.join("palette1").exists());

	let recolored = Image::open(&dir.join("palette0/sprite.png")).unwrap();
	assert_eq!((recolored.width, recolored.height), (3, 2));
	assert_eq!(
		recolored.pixels,
		[[10, 20, 30, 255], [40, 50, 60, 255], [0; 4], [10, 20, 30, 64], [40, 50, 60, 0], [255, 200, 60, 255]]
	);
	assert_eq!(Image::open(&dir.join("palette0/plain.png")).unwrap(), plain());
}

#[test]
fn every_palette_gets_its_own_directory() {
	let dir = &scratchDir("several");
	let palettes = [
		Palette { bright: [10, 20, 30], dark: [40, 50, 60] },
		Palette { bright: [0, 0, 255], dark: [0, 0, 128] },
		Palette { bright: [255, 255, 255], dark: [0, 0, 0] },
	];
	seed(dir, &palettes);

	assert_eq!(batch::run(&configIn(dir)).unwrap(), Summary { palettes: 3, images: 6 });
	for (paletteNumber, palette) in palettes.iter().enumerate() {
		let paletteDir = dir.join(format!("palette{paletteNumber}"));
		let recolored = Image::open(&paletteDir.join("sprite.png")).unwrap();
		assert_eq!(recolored.pixels[0][..3], palette.bright);
		assert_eq!(recolored.pixels[1][..3], palette.dark);
		assert_eq!(Image::open(&paletteDir.join("plain.png")).unwrap(), plain());
	}
}

#[test]
fn rerun_is_idempotent() {
	let dir = &scratchDir("rerun");
	seed(dir, &[Palette { bright: [10, 20, 30], dark: [40, 50, 60] }]);
	let config = &configIn(dir);

	batch::run(config).unwrap();
	let first = fs::read(dir.join("palette0/sprite.png")).unwrap();
	batch::run(config).unwrap();
	assert_eq!(fs::read(dir.join("palette0/sprite.png")).unwrap(), first);
}

#[test]
fn only_visible_png_files_are_sources() {
	let dir = &scratchDir("listing");
	seed(dir, &[Palette { bright: [1, 1, 1], dark: [2, 2, 2] }]);
	fs::write(dir.join("orig/notes.txt"), "not an image").unwrap();
	fs::write(dir.join("orig/.hidden.png"), "not an image either").unwrap();
	fs::create_dir(dir.join("orig/nested.png")).unwrap();

	let sources = batch::listSourcePNGs(&dir.join("orig")).unwrap();
	assert_eq!(sources, [dir.join("orig/plain.png"), dir.join("orig/sprite.png")]);
}

#[test]
fn existing_directory_is_not_an_error() {
	let dir = &scratchDir("ensure");
	let target = dir.join("a/b");
	assert_eq!(batch::ensureDir(&target).unwrap(), DirCreation::Created);
	assert_eq!(batch::ensureDir(&target).unwrap(), DirCreation::AlreadyExisted);
}

#[test]
fn existing_file_counts_as_existing_directory() {
	let dir = &scratchDir("ensure_file");
	let file = dir.join("x");
	fs::write(&file, "").unwrap();
	assert_eq!(batch::ensureDir(&file).unwrap(), DirCreation::AlreadyExisted);
	assert!(file.is_file());
}

#[test]
fn uncreatable_palette_dir_aborts_the_run() {
	let dir = &scratchDir("uncreatable");
	seed(dir, &[Palette { bright: [10, 20, 30], dark: [40, 50, 60] }]);
	let blocker = dir.join("x");
	fs::write(&blocker, "").unwrap();
	let config =
		Config { paletteDirPattern: blocker.join("palette{}").to_string_lossy().into_owned(), ..configIn(dir) };

	assert!(matches!(
		batch::run(&config),
		Err(Error::CreateDir { path, .. }) if path == blocker.join("palette0")
	));
	assert_eq!(fs::read(&blocker).unwrap(), b"");
	assert!(!dir.join("palette0").exists());
	let mut entries: Vec<_> = fs::read_dir(&**dir).unwrap().map(|entry| entry.unwrap().file_name()).collect();
	entries.sort();
	assert_eq!(entries, ["orig", "palettes.png", "x"]);
}

#[test]
fn missing_inputs_abort_the_run() {
	let dir = &scratchDir("missing");
	assert!(matches!(batch::run(&configIn(dir)), Err(Error::Io { .. })));

	seed(dir, &[Palette { bright: [1, 1, 1], dark: [2, 2, 2] }]);
	fs::remove_dir_all(dir.join("orig")).unwrap();
	assert!(matches!(batch::run(&configIn(dir)), Err(Error::ReadDir { .. })));
}

#[test]
fn undecodable_source_aborts_the_run() {
	let dir = &scratchDir("undecodable");
	seed(dir, &[Palette { bright: [1, 1, 1], dark: [2, 2, 2] }]);
	fs::write(dir.join("orig/broken.png"), "garbage").unwrap();
	assert!(matches!(batch::run(&configIn(dir)), Err(Error::Image { path, .. }) if path.ends_with("broken.png")));
}
