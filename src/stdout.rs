//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The command line interface outputs colored dumps of intermediate stages
//! when run with the _verbose_ flag, and renders diagnostics as labeled
//! source reports.

use crate::ast::Tree;
use crate::error;
use crate::lexer;
use crate::rebuilder;

use serde::Deserialize;
use std::io::Write;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

#[derive(Debug, Default, Deserialize, clap::Args)]
#[serde(default, deny_unknown_fields)]
pub struct Options
{
	/// Show a lot of intermediate output
	#[clap(short, long)]
	verbose: bool,

	/// When to use ANSI colors in error messages and intermediate output
	#[clap(long, value_name("WHEN"))]
	#[clap(value_enum, default_value_t=ColorChoice::Auto)]
	color: ColorChoice,

	/// Which character set to use to draw the arrows in error messages
	#[clap(long, value_name("CHARSET"))]
	#[clap(value_enum, default_value_t=CharSet::Unicode)]
	arrows: CharSet,
}

impl Options
{
	/// Command line flags win; whatever was left at its default falls back
	/// to the project manifest.
	pub fn merged(self, fallback: Options) -> Options
	{
		Options {
			verbose: self.verbose || fallback.verbose,
			color: match self.color
			{
				ColorChoice::Auto => fallback.color,
				choice => choice,
			},
			arrows: match self.arrows
			{
				CharSet::Unicode => fallback.arrows,
				charset => charset,
			},
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[derive(clap::ValueEnum)]
pub enum ColorChoice
{
	#[default]
	Auto,
	Always,
	Never,
}

impl From<ColorChoice> for termcolor::ColorChoice
{
	fn from(choice: ColorChoice) -> termcolor::ColorChoice
	{
		match choice
		{
			ColorChoice::Auto => termcolor::ColorChoice::Auto,
			ColorChoice::Always => termcolor::ColorChoice::Always,
			ColorChoice::Never => termcolor::ColorChoice::Never,
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[derive(clap::ValueEnum)]
pub enum CharSet
{
	#[default]
	Unicode,
	Ascii,
}

impl From<CharSet> for ariadne::CharSet
{
	fn from(choice: CharSet) -> ariadne::CharSet
	{
		match choice
		{
			CharSet::Unicode => ariadne::CharSet::Unicode,
			CharSet::Ascii => ariadne::CharSet::Ascii,
		}
	}
}

pub struct StdOut
{
	stdout: StandardStream,
	is_verbose: bool,
	report_config: ariadne::Config,
}

impl StdOut
{
	pub fn new(options: Options) -> StdOut
	{
		let stdout = StandardStream::stdout(options.color.into());
		let is_verbose = options.verbose;
		let with_color = match options.color
		{
			ColorChoice::Auto => stdout.supports_color(),
			ColorChoice::Always => true,
			ColorChoice::Never => false,
		};
		let report_config = ariadne::Config::default()
			.with_color(with_color)
			.with_char_set(options.arrows.into());
		StdOut {
			stdout,
			is_verbose,
			report_config,
		}
	}

	pub fn header(
		&mut self,
		preamble: &str,
		filename: &str,
	) -> Result<(), std::io::Error>
	{
		if self.is_verbose
		{
			self.stdout.set_color(&ColorSpec::new())?;
			writeln!(self.stdout, "{} {}...", preamble, filename)?;
		}
		Ok(())
	}

	pub fn dump_tokens(
		&mut self,
		tokens: &[lexer::LexedToken],
	) -> Result<(), anyhow::Error>
	{
		if self.is_verbose
		{
			let colorspec_dump = ColorSpec::new().set_dimmed(true).to_owned();
			self.stdout.set_color(&colorspec_dump)?;
			for token in tokens
			{
				match &token.result
				{
					Result::Ok(token) => write!(self.stdout, "{:?}   ", token)?,
					Result::Err(_) => write!(self.stdout, "ERROR   ")?,
				}
			}
			writeln!(self.stdout)?;
			writeln!(self.stdout)?;
		}
		Ok(())
	}

	pub fn dump_code(
		&mut self,
		filename: &str,
		tree: &Tree,
	) -> Result<(), anyhow::Error>
	{
		if self.is_verbose
		{
			let colorspec_dump = ColorSpec::new().set_dimmed(true).to_owned();
			self.stdout.set_color(&colorspec_dump)?;

			self.header("Rebuilding", filename)?;

			self.stdout.set_color(&colorspec_dump)?;
			let indentation = rebuilder::Indentation {
				value: "\u{00a6}   ",
				amount: 0,
			};
			let code = rebuilder::rebuild(tree, &indentation)?;
			writeln!(self.stdout, "{}", code)?;
		}
		Ok(())
	}

	pub fn prepare_for_errors(&mut self) -> Result<(), std::io::Error>
	{
		let colorspec_error = ColorSpec::new()
			.set_fg(Some(Color::Red))
			.set_bold(true)
			.to_owned();
		self.stdout.set_color(&colorspec_error)?;
		writeln!(self.stdout)?;
		Ok(())
	}

	pub fn show_errors(
		&mut self,
		errors: impl IntoIterator<Item = error::Error>,
		mut source_cache: impl ariadne::Cache<String>,
	) -> Result<(), std::io::Error>
	{
		for error in errors
		{
			writeln!(self.stdout)?;
			let report = error.build_report(self.report_config);
			report.eprint(&mut source_cache)?;
		}
		writeln!(self.stdout)?;
		Ok(())
	}

	pub fn done(&mut self) -> Result<(), std::io::Error>
	{
		self.stdout.reset()?;
		writeln!(self.stdout, "Done.")?;
		Ok(())
	}
}
