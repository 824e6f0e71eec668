//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use schwa::analyzer;
use schwa::generator;
use schwa::lexer;
use schwa::parser;
use schwa::rebuilder;
use schwa::stdout::{Options, StdOut};
use schwa::validator;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[clap(version, about = "Compiles Schwa source code to WebAssembly.")]
struct Cli
{
	/// The source file to compile
	filename: std::path::PathBuf,

	/// Where to write the module; defaults to the source filename with a
	/// .wasm extension
	#[clap(short, long)]
	output: Option<std::path::PathBuf>,

	/// Stop after analysis without emitting a module
	#[clap(long)]
	check: bool,

	/// Print the formatted source instead of compiling
	#[clap(long)]
	format: bool,

	#[clap(flatten)]
	options: Options,
}

/// Project-level presets, read from a `schwa.toml` next to the source file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Manifest
{
	output: Option<std::path::PathBuf>,
	options: Options,
}

impl Manifest
{
	fn load(
		source_path: &std::path::Path,
	) -> Result<Manifest, anyhow::Error>
	{
		let path = source_path
			.parent()
			.map(|dir| dir.join("schwa.toml"))
			.filter(|path| path.exists());
		match path
		{
			Some(path) =>
			{
				let raw = std::fs::read_to_string(&path).with_context(
					|| format!("failed to read {}", path.to_string_lossy()),
				)?;
				let manifest = toml::from_str(&raw).with_context(|| {
					format!("failed to parse {}", path.to_string_lossy())
				})?;
				Ok(manifest)
			}
			None => Ok(Manifest::default()),
		}
	}
}

fn main() -> Result<(), anyhow::Error>
{
	let cli = Cli::parse();
	let manifest = Manifest::load(&cli.filename)?;
	let options = cli.options.merged(manifest.options);
	let mut stdout = StdOut::new(options);

	let filename = cli.filename.to_string_lossy().to_string();
	let source = std::fs::read_to_string(&cli.filename)
		.with_context(|| format!("failed to read {}", filename))?;

	stdout.header("Lexing", &filename)?;
	let tokens = lexer::lex(&source, &filename);
	stdout.dump_tokens(&tokens)?;

	stdout.header("Parsing", &filename)?;
	let (mut tree, mut errors) = parser::parse(tokens, &filename);
	errors.append(validator::validate(&mut tree));

	stdout.header("Analyzing", &filename)?;
	let analysis = analyzer::analyze(&mut tree);
	errors.append(analysis.errors);
	stdout.dump_code(&filename, &tree)?;

	if cli.format && !errors.has_errors()
	{
		let indentation = rebuilder::Indentation {
			value: "    ",
			amount: 0,
		};
		print!("{}", rebuilder::rebuild(&tree, &indentation)?);
		return Ok(());
	}

	if !errors.is_empty()
	{
		let failed = errors.has_errors();
		stdout.prepare_for_errors()?;
		let cache =
			ariadne::sources(vec![(filename.clone(), source.clone())]);
		stdout.show_errors(errors, cache)?;
		if failed
		{
			std::process::exit(1);
		}
	}

	if cli.check
	{
		stdout.done()?;
		return Ok(());
	}

	stdout.header("Generating", &filename)?;
	let binary = generator::generate(&tree, &analysis.symbols)?;

	let output = cli
		.output
		.or(manifest.output)
		.unwrap_or_else(|| cli.filename.with_extension("wasm"));
	std::fs::write(&output, binary).with_context(|| {
		format!("failed to write {}", output.to_string_lossy())
	})?;
	stdout.done()?;
	Ok(())
}
