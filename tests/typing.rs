//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use pretty_assertions::assert_eq;

use schwa::analyzer::Analysis;
use schwa::ast::{NodeKind, Tree};
use schwa::data_type::DataType;

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

fn find_nodes(tree: &Tree, kind: NodeKind) -> Vec<schwa::ast::NodeId>
{
	tree.ids().filter(|&id| tree[id].kind == kind).collect()
}

#[test]
fn type_well_typed_arithmetic()
{
	let (tree, analysis) = analyze("tests/samples/valid/arithmetic.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	let additions = find_nodes(&tree, NodeKind::BinaryOp);
	assert_eq!(additions.len(), 1);
	assert_eq!(tree[additions[0]].data_type, Some(DataType::Int));
	let returns = find_nodes(&tree, NodeKind::Return);
	assert_eq!(returns.len(), 1);
	assert_eq!(tree[returns[0]].data_type, Some(DataType::Int));
}

#[test]
fn type_casts()
{
	let (_, analysis) = analyze("tests/samples/valid/casts.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
}

#[test]
fn type_control_flow()
{
	let (tree, analysis) =
		analyze("tests/samples/valid/control_flow.schwa");
	assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
	for node in find_nodes(&tree, NodeKind::While)
	{
		let condition = tree.child(node, 0).unwrap();
		assert_eq!(tree[condition].data_type, Some(DataType::Bool));
	}
}

#[test]
fn warn_about_missing_return()
{
	let (_, analysis) =
		analyze("tests/samples/valid/missing_return.schwa");
	assert_eq!(analysis.errors.codes(), &[900]);
	assert!(!analysis.errors.has_errors());
}

#[test]
fn fail_to_type_assignment_type_mismatch()
{
	compile_to_fail(
		&[500],
		"tests/samples/invalid/assignment_type_mismatch.schwa",
	);
}

#[test]
fn fail_to_type_wrong_argument_count()
{
	compile_to_fail(
		&[510],
		"tests/samples/invalid/wrong_argument_count.schwa",
	);
}

#[test]
fn fail_to_type_const_assignment()
{
	compile_to_fail(&[511], "tests/samples/invalid/const_assignment.schwa");
}

#[test]
fn fail_to_type_cast_to_bool()
{
	compile_to_fail(
		&[520, 513],
		"tests/samples/invalid/cast_to_bool.schwa",
	);
}

#[test]
fn fail_to_type_operand_type_mismatch()
{
	compile_to_fail(
		&[501, 501],
		"tests/samples/invalid/operand_type_mismatch.schwa",
	);
}

#[test]
fn fail_to_type_relational_bool()
{
	compile_to_fail(
		&[501, 501],
		"tests/samples/invalid/relational_bool.schwa",
	);
}

#[test]
fn fail_to_type_shift_float()
{
	compile_to_fail(
		&[501, 501],
		"tests/samples/invalid/shift_float.schwa",
	);
}

#[test]
fn fail_to_type_return_type_mismatch()
{
	compile_to_fail(
		&[503],
		"tests/samples/invalid/return_type_mismatch.schwa",
	);
}

#[test]
fn fail_to_type_return_value_in_void()
{
	compile_to_fail(
		&[503],
		"tests/samples/invalid/return_value_in_void.schwa",
	);
}

#[test]
fn fail_to_type_missing_return_value()
{
	compile_to_fail(
		&[504],
		"tests/samples/invalid/missing_return_value.schwa",
	);
}

#[test]
fn fail_to_type_argument_type_mismatch()
{
	compile_to_fail(
		&[502],
		"tests/samples/invalid/argument_type_mismatch.schwa",
	);
}

#[test]
fn fail_to_type_condition_not_bool()
{
	compile_to_fail(
		&[505],
		"tests/samples/invalid/condition_not_bool.schwa",
	);
}

#[test]
fn fail_to_type_cross_width_as()
{
	compile_to_fail(
		&[520, 513],
		"tests/samples/invalid/cross_width_as.schwa",
	);
}

#[test]
fn fail_to_type_cast_target_not_type()
{
	compile_to_fail(
		&[521, 513, 410],
		"tests/samples/invalid/cast_target_not_type.schwa",
	);
}

#[test]
fn poison_propagates_to_the_call()
{
	let (tree, _) =
		analyze("tests/samples/invalid/wrong_argument_count.schwa");
	let calls = find_nodes(&tree, NodeKind::FunctionCall);
	assert_eq!(calls.len(), 1);
	assert_eq!(tree[calls[0]].data_type, Some(DataType::Invalid));
	// The enclosing return is poisoned too, without its own diagnostic.
	let poisoned = find_nodes(&tree, NodeKind::Return)
		.into_iter()
		.filter(|&id| tree[id].data_type == Some(DataType::Invalid))
		.count();
	assert_eq!(poisoned, 1);
}
