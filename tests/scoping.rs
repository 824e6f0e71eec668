//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use pretty_assertions::assert_eq;

use schwa::analyzer::Analysis;
use schwa::ast::Tree;
use schwa::data_type::DataType;
use schwa::symbol::VariableFlag;

fn analyze(filename: &str) -> (Tree, Analysis)
{
	let source = std::fs::read_to_string(filename).unwrap();
	schwa::check_source(&source, filename)
}

fn compile_to_fail(codes: &[u16], filename: &str)
{
	let (_, analysis) = analyze(filename);
	assert_eq!(
		analysis.errors.codes(),
		codes,
		"unexpected {:?}",
		analysis.errors
	);
}

#[test]
fn scope_functions_and_parameters()
{
	let (tree, analysis) = analyze("tests/samples/valid/arithmetic.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let f = symbols.get_function(program_scope, "f").unwrap();
	let record = symbols.function(f);
	assert_eq!(record.return_type, DataType::Int);
	assert_eq!(record.parameters.len(), 2);
	let names: Vec<&str> = record
		.parameters
		.iter()
		.map(|&id| symbols.variable(id).name.as_str())
		.collect();
	assert_eq!(names, vec!["a", "b"]);
	// The parameters live in the function's scope, not the program's.
	let function_scope = symbols.get_scope(program_scope, "f").unwrap();
	assert!(symbols.local_variable(function_scope, "a").is_some());
	assert!(symbols.local_variable(program_scope, "a").is_none());
}

#[test]
fn scope_mapped_struct_layout()
{
	let (tree, analysis) =
		analyze("tests/samples/valid/mapped_struct.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let p = symbols.get_variable(program_scope, "p").unwrap();
	let record = symbols.variable(p);
	assert_eq!(record.offset, 1024);
	assert!(record.flags.contains(VariableFlag::Mapped));
	assert!(record.flags.contains(VariableFlag::Global));
	// Member access materialized a scope with the concrete layout.
	let p_scope = symbols.get_scope(program_scope, "p").unwrap();
	let x = symbols.local_variable(p_scope, "x").unwrap();
	let y = symbols.local_variable(p_scope, "y").unwrap();
	assert_eq!(symbols.variable(x).offset, 1024);
	assert_eq!(symbols.variable(y).offset, 1028);
	assert!(symbols.variable(x).flags.contains(VariableFlag::Mapped));
}

#[test]
fn scope_builtins_resolve_from_any_scope()
{
	let (_, analysis) = analyze("tests/samples/valid/builtins.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let root = symbols.root();
	assert!(symbols.get_function(root, "nop").is_some());
	for family in ["int", "uint", "long", "ulong", "float", "double"]
	{
		let scope = symbols.get_scope(root, family).unwrap();
		assert!(symbols.get_function(scope, "load").is_some());
		assert!(symbols.get_function(scope, "store").is_some());
	}
	for family in ["int", "uint", "long", "ulong"]
	{
		let scope = symbols.get_scope(root, family).unwrap();
		for op in ["clz", "ctz", "popcnt", "eqz"]
		{
			assert!(symbols.get_function(scope, op).is_some());
		}
	}
	let double = symbols.get_scope(root, "double").unwrap();
	assert!(symbols.get_function(double, "max").is_some());
	let float = symbols.get_scope(root, "float").unwrap();
	let sqrt = symbols.get_function(float, "sqrt").unwrap();
	assert_eq!(symbols.path(float, "sqrt"), "float.sqrt");
	assert_eq!(symbols.function(sqrt).return_type, DataType::Float);
}

#[test]
fn scope_export_and_const_flags()
{
	let (tree, analysis) = analyze("tests/samples/valid/exports.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let function = symbols
		.get_function(program_scope, "get_answer")
		.unwrap();
	assert!(symbols.function(function).is_export);
	let answer = symbols.get_variable(program_scope, "answer").unwrap();
	let flags = symbols.variable(answer).flags;
	assert!(flags.contains(VariableFlag::Const));
	assert!(flags.contains(VariableFlag::Export));
	assert!(flags.contains(VariableFlag::Global));
}

#[test]
fn scope_locals_shadow_globals()
{
	let (_, analysis) = analyze("tests/samples/valid/shadowing.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
}

#[test]
fn fail_to_scope_duplicate_variable()
{
	compile_to_fail(
		&[400],
		"tests/samples/invalid/duplicate_variable.schwa",
	);
}

#[test]
fn fail_to_scope_duplicate_function()
{
	compile_to_fail(
		&[401],
		"tests/samples/invalid/duplicate_function.schwa",
	);
}

#[test]
fn fail_to_scope_duplicate_struct()
{
	compile_to_fail(&[402], "tests/samples/invalid/duplicate_struct.schwa");
}

#[test]
fn fail_to_scope_undefined_variable()
{
	compile_to_fail(
		&[410, 513],
		"tests/samples/invalid/undefined_variable.schwa",
	);
}

#[test]
fn fail_to_scope_undefined_function()
{
	compile_to_fail(
		&[411],
		"tests/samples/invalid/undefined_function.schwa",
	);
}

#[test]
fn fail_to_scope_undefined_member()
{
	compile_to_fail(
		&[413, 410, 512],
		"tests/samples/invalid/undefined_member.schwa",
	);
}
