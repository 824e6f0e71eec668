//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Analysis rules: pure diagnostic checks that run after every node has a
//! scope and a data type.

use crate::analyzer::Analyzer;
use crate::ast::{NodeId, NodeKind};
use crate::data_type::DataType;
use crate::error::Error;

pub fn check(analyzer: &mut Analyzer, node: NodeId)
{
	if !analyzer.tree[node].valid
	{
		return;
	}
	match analyzer.tree[node].kind
	{
		NodeKind::If | NodeKind::While => condition(analyzer, node),
		NodeKind::FunctionDef => missing_return(analyzer, node),
		_ => (),
	}
}

fn condition(analyzer: &mut Analyzer, node: NodeId)
{
	let condition = match analyzer.tree.child(node, 0)
	{
		Some(condition) => condition,
		None => return,
	};
	let condition_type = analyzer.data_type_of(condition);
	if condition_type != DataType::Bool
		&& condition_type != DataType::Invalid
	{
		analyzer.errors.add(Error::ConditionTypeMismatch {
			actual: condition_type,
			location: analyzer.tree[condition].location.clone(),
		});
	}
}

/// Warns when a function that is declared to return a value may fall off the
/// end of its body. Warnings never block emission.
fn missing_return(analyzer: &mut Analyzer, node: NodeId)
{
	let return_type =
		DataType::from_annotation(&analyzer.tree[node].token.text);
	if return_type == DataType::Void
	{
		return;
	}
	let body = match analyzer.tree.child(node, 2)
	{
		Some(body) => body,
		None => return,
	};
	if ends_in_return(analyzer, body)
	{
		return;
	}
	let function = match analyzer.tree.child(node, 0)
	{
		Some(id) => analyzer.tree[id].token.text.clone(),
		None => return,
	};
	analyzer.errors.add(Error::MissingReturn {
		function,
		location: analyzer.tree[node].location.clone(),
	});
}

fn ends_in_return(analyzer: &Analyzer, node: NodeId) -> bool
{
	match analyzer.tree[node].kind
	{
		NodeKind::Return | NodeKind::ReturnVoid => true,
		NodeKind::Block =>
		{
			match analyzer.tree[node].children.last()
			{
				Some(&last) => ends_in_return(analyzer, last),
				None => false,
			}
		}
		// An if statement only guarantees a return when both branches do.
		NodeKind::If => match
			(analyzer.tree.child(node, 1), analyzer.tree.child(node, 2))
		{
			(Some(then_branch), Some(else_branch)) =>
			{
				ends_in_return(analyzer, then_branch)
					&& ends_in_return(analyzer, else_branch)
			}
			_ => false,
		},
		_ => false,
	}
}
