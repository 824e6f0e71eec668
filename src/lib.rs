//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The compiler for the Schwa programming language, a small statically typed
//! indentation-structured language compiled ahead of time to WebAssembly.
//!
//! The syntax tree is detailed in [ast] and [data_type]; symbols and scopes
//! in [symbol]. Diagnostics are laid out in [error]. The other modules are
//! the compiler stages, in order: [lexer], [parser], [validator], [analyzer]
//! and [generator]. The [rebuilder] module turns a tree back into formatted
//! source, and [builtin] holds the intrinsics preloaded into the root scope.

pub mod analyzer;
pub mod ast;
pub mod builtin;
pub mod data_type;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod rebuilder;
pub mod stdout;
pub mod symbol;
pub mod validator;

pub use error::Error;
pub use error::Errors;

use analyzer::Analysis;
use ast::Tree;

/// Runs the front half of the pipeline: lexing, parsing, validation and
/// semantic analysis. Diagnostics from every stage are collected into the
/// analysis, in stage order.
pub fn check_source(source: &str, source_filename: &str) -> (Tree, Analysis)
{
	let tokens = lexer::lex(source, source_filename);
	let (mut tree, mut errors) = parser::parse(tokens, source_filename);
	errors.append(validator::validate(&mut tree));
	let analysis = analyzer::analyze(&mut tree);
	errors.append(analysis.errors);
	let analysis = Analysis {
		symbols: analysis.symbols,
		errors,
	};
	(tree, analysis)
}

/// Compiles source code to a WebAssembly binary module. Emission is refused
/// if any diagnostic of error severity was produced; warnings pass.
pub fn compile_source(
	source: &str,
	source_filename: &str,
) -> Result<Vec<u8>, anyhow::Error>
{
	let (tree, analysis) = check_source(source, source_filename);
	if analysis.errors.has_errors()
	{
		return Err(anyhow::anyhow!(
			"cannot compile {}: {} diagnostic(s), codes {:?}",
			source_filename,
			analysis.errors.errors.len(),
			analysis.errors.codes()
		));
	}
	generator::generate(&tree, &analysis.symbols)
}
