//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use pretty_assertions::assert_eq;

use schwa::lexer;
use schwa::parser;
use schwa::rebuilder;

fn format(source: &str) -> String
{
	let tokens = lexer::lex(source, "test.schwa");
	let (tree, errors) = parser::parse(tokens, "test.schwa");
	assert!(errors.is_empty(), "{:?}", errors);
	let indentation = rebuilder::Indentation {
		value: "    ",
		amount: 0,
	};
	rebuilder::rebuild(&tree, &indentation).unwrap()
}

fn assert_fixpoint(filename: &str)
{
	let source = std::fs::read_to_string(filename).unwrap();
	let once = format(&source);
	let twice = format(&once);
	assert_eq!(once, twice, "formatting {} is not stable", filename);
}

#[test]
fn format_arithmetic()
{
	assert_fixpoint("tests/samples/valid/arithmetic.schwa");
}

#[test]
fn format_mapped_struct()
{
	assert_fixpoint("tests/samples/valid/mapped_struct.schwa");
}

#[test]
fn format_control_flow()
{
	assert_fixpoint("tests/samples/valid/control_flow.schwa");
}

#[test]
fn format_builtins()
{
	assert_fixpoint("tests/samples/valid/builtins.schwa");
}

#[test]
fn format_casts()
{
	assert_fixpoint("tests/samples/valid/casts.schwa");
}

#[test]
fn format_exports()
{
	assert_fixpoint("tests/samples/valid/exports.schwa");
}

#[test]
fn format_preserves_operator_structure()
{
	let source = "int f(int a, int b)\n    return (a + b) * a\n";
	let formatted = format(source);
	assert_eq!(formatted, "int f(int a, int b)\n    return (a + b) * a\n");
}
