//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The structural validator checks that every node has the child shape its
//! kind requires, before any semantics are considered. A node that fails is
//! marked invalid; the analyzer types it as `invalid` and runs no rules on
//! it, so later stages never need to defend against malformed shapes.

use crate::ast::{NodeId, NodeKind, Tree};
use crate::error::{Error, Errors};

pub fn validate(tree: &mut Tree) -> Errors
{
	let mut errors = Errors::new();
	if tree.is_empty()
	{
		return errors;
	}
	let root = tree.root();
	validate_node(tree, root, &mut errors);
	errors
}

fn validate_node(tree: &mut Tree, node: NodeId, errors: &mut Errors)
{
	if let Some(expectation) = check_shape(tree, node)
	{
		tree[node].valid = false;
		errors.add(Error::MalformedNode {
			location: tree[node].location.clone(),
			expectation: expectation.to_string(),
		});
	}
	let children = tree[node].children.clone();
	for child in children
	{
		validate_node(tree, child, errors);
	}
}

fn check_shape(tree: &Tree, node: NodeId) -> Option<&'static str>
{
	let children = &tree[node].children;
	let child_kind = |i: usize| children.get(i).map(|&id| tree[id].kind);
	match tree[node].kind
	{
		NodeKind::Program => None,
		NodeKind::Block => None,
		NodeKind::Arguments => None,
		NodeKind::StructDef =>
		{
			if children.len() == 2
				&& child_kind(0) == Some(NodeKind::StructId)
				&& child_kind(1) == Some(NodeKind::Fields)
			{
				None
			}
			else
			{
				Some("a name and a field list")
			}
		}
		NodeKind::FunctionDef =>
		{
			if children.len() == 3
				&& child_kind(0) == Some(NodeKind::FunctionId)
				&& child_kind(1) == Some(NodeKind::Parameters)
				&& child_kind(2) == Some(NodeKind::Block)
			{
				None
			}
			else
			{
				Some("a name, a parameter list and a body")
			}
		}
		NodeKind::VariableDef =>
		{
			if children.len() == 1
				&& child_kind(0) == Some(NodeKind::VariableId)
			{
				None
			}
			else
			{
				Some("a variable name")
			}
		}
		NodeKind::Global =>
		{
			if children.len() == 2
				&& child_kind(0) == Some(NodeKind::VariableDef)
			{
				None
			}
			else
			{
				Some("a definition and a value")
			}
		}
		NodeKind::Map =>
		{
			if children.len() == 2
				&& child_kind(0) == Some(NodeKind::VariableDef)
				&& child_kind(1) == Some(NodeKind::Literal)
			{
				None
			}
			else
			{
				Some("a definition and an offset literal")
			}
		}
		NodeKind::Const =>
		{
			if children.len() == 1 && child_kind(0) == Some(NodeKind::Global)
			{
				None
			}
			else
			{
				Some("a global definition")
			}
		}
		NodeKind::Export =>
		{
			let allowed = matches!(
				child_kind(0),
				Some(NodeKind::Global)
					| Some(NodeKind::FunctionDef)
					| Some(NodeKind::StructDef)
					| Some(NodeKind::Const)
					| Some(NodeKind::Map)
			);
			if children.len() == 1 && allowed
			{
				None
			}
			else
			{
				Some("an exportable definition")
			}
		}
		NodeKind::Access =>
		{
			if children.len() == 2
			{
				None
			}
			else
			{
				Some("a scope and a member")
			}
		}
		NodeKind::Assignment =>
		{
			if children.len() == 2
			{
				None
			}
			else
			{
				Some("a target and a value")
			}
		}
		NodeKind::BinaryOp =>
		{
			if children.len() == 2
			{
				None
			}
			else
			{
				Some("two operands")
			}
		}
		NodeKind::UnaryOp =>
		{
			if children.len() == 1
			{
				None
			}
			else
			{
				Some("one operand")
			}
		}
		NodeKind::FunctionCall =>
		{
			let callee = matches!(
				child_kind(0),
				Some(NodeKind::FunctionId) | Some(NodeKind::Access)
			);
			if children.len() == 2
				&& callee && child_kind(1) == Some(NodeKind::Arguments)
			{
				None
			}
			else
			{
				Some("a callee and an argument list")
			}
		}
		NodeKind::Parameters | NodeKind::Fields =>
		{
			let all_definitions = children
				.iter()
				.all(|&id| tree[id].kind == NodeKind::VariableDef);
			if all_definitions
			{
				None
			}
			else
			{
				Some("variable definitions only")
			}
		}
		NodeKind::Return =>
		{
			if children.len() == 1
			{
				None
			}
			else
			{
				Some("a return value")
			}
		}
		NodeKind::ReturnVoid | NodeKind::Break | NodeKind::Continue =>
		{
			if children.is_empty()
			{
				None
			}
			else
			{
				Some("no children")
			}
		}
		NodeKind::If =>
		{
			if children.len() == 2 || children.len() == 3
			{
				None
			}
			else
			{
				Some("a condition, a body and an optional else branch")
			}
		}
		NodeKind::While =>
		{
			if children.len() == 2
			{
				None
			}
			else
			{
				Some("a condition and a body")
			}
		}
		NodeKind::Type
		| NodeKind::VariableId
		| NodeKind::FunctionId
		| NodeKind::StructId
		| NodeKind::Literal =>
		{
			if children.is_empty()
			{
				None
			}
			else
			{
				Some("no children")
			}
		}
	}
}
