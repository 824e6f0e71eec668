//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use pretty_assertions::assert_eq;

use schwa::analyzer;
use schwa::analyzer::Analysis;
use schwa::ast::{NodeId, Tree};

fn analyze(filename: &str) -> (Tree, Analysis)
{
	let source = std::fs::read_to_string(filename).unwrap();
	schwa::check_source(&source, filename)
}

fn reachable(tree: &Tree) -> Vec<NodeId>
{
	let mut nodes = Vec::new();
	let mut stack = vec![tree.root()];
	while let Some(node) = stack.pop()
	{
		nodes.push(node);
		stack.extend(tree[node].children.iter().copied());
	}
	nodes
}

/// After analysis, every reachable node has a scope and a data type, even
/// in programs full of errors.
#[test]
fn annotate_every_reachable_node()
{
	let filenames = [
		"tests/samples/valid/arithmetic.schwa",
		"tests/samples/valid/mapped_struct.schwa",
		"tests/samples/valid/builtins.schwa",
		"tests/samples/valid/control_flow.schwa",
		"tests/samples/invalid/assignment_type_mismatch.schwa",
		"tests/samples/invalid/undefined_member.schwa",
		"tests/samples/invalid/wrong_argument_count.schwa",
	];
	for filename in filenames
	{
		let (tree, _) = analyze(filename);
		for node in reachable(&tree)
		{
			assert!(
				tree[node].scope.is_some(),
				"{}: no scope on {:?}",
				filename,
				tree[node].kind
			);
			assert!(
				tree[node].data_type.is_some(),
				"{}: no data type on {:?}",
				filename,
				tree[node].kind
			);
		}
	}
}

/// Analyzing an already-annotated tree is a no-op: the scope and type
/// getters short-circuit, and no diagnostics are repeated.
#[test]
fn reanalysis_is_idempotent()
{
	let (mut tree, first) =
		analyze("tests/samples/valid/arithmetic.schwa");
	assert!(first.errors.is_empty(), "{:?}", first.errors);
	let annotations: Vec<_> = reachable(&tree)
		.into_iter()
		.map(|id| (tree[id].scope, tree[id].data_type.clone()))
		.collect();
	let again = analyzer::analyze(&mut tree);
	assert!(again.errors.is_empty(), "{:?}", again.errors);
	let after: Vec<_> = reachable(&tree)
		.into_iter()
		.map(|id| (tree[id].scope, tree[id].data_type.clone()))
		.collect();
	assert_eq!(annotations, after);
}

/// A struct that contains itself still gets a finite layout; the size
/// recursion is bounded instead of overflowing the stack.
#[test]
fn size_self_referential_struct()
{
	let (tree, analysis) =
		analyze("tests/samples/valid/recursive_struct.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let n_scope = symbols.get_scope(program_scope, "n").unwrap();
	let value = symbols.local_variable(n_scope, "value").unwrap();
	let next = symbols.local_variable(n_scope, "next").unwrap();
	assert_eq!(symbols.variable(value).offset, 0);
	// The int field is four bytes, so the cyclic field starts right after.
	assert_eq!(symbols.variable(next).offset, 4);
}

/// Exactly one diagnostic per duplicate, and the incumbent symbol wins.
#[test]
fn reject_duplicates_once()
{
	let (tree, analysis) =
		analyze("tests/samples/invalid/duplicate_variable.schwa");
	assert_eq!(analysis.errors.codes(), &[400]);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let x = symbols.get_variable(program_scope, "x").unwrap();
	let record = symbols.variable(x);
	assert_eq!(record.name, "x");
}

/// Lookup is monotone: anything resolvable in a scope stays resolvable in
/// scopes nested below it.
#[test]
fn lookup_from_nested_scopes()
{
	let (tree, analysis) = analyze("tests/samples/valid/globals.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let symbols = &analysis.symbols;
	let program_scope = tree[tree.root()].scope.unwrap();
	let from_program =
		symbols.get_variable(program_scope, "counter").unwrap();
	let bump_scope = symbols.get_scope(program_scope, "bump").unwrap();
	let from_bump = symbols.get_variable(bump_scope, "counter").unwrap();
	assert_eq!(from_program, from_bump);
	// Builtins resolve from the innermost scopes as well.
	assert!(symbols.get_function(bump_scope, "nop").is_some());
}
