//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Type rules. Operator typing is table-driven: each operator family admits
//! a fixed set of uniform operand rows, and an expression that matches no
//! row is diagnosed and poisoned as `invalid`. Rules that see an `invalid`
//! child record their own structural finding at most, never a follow-up
//! type mismatch, so one root cause produces one cascade-free report.

use crate::analyzer::Analyzer;
use crate::ast::{NodeId, NodeKind};
use crate::data_type::DataType;
use crate::error::Error;
use crate::lexer::TokenKind;
use crate::symbol::VariableFlag;

const NUMERIC: [DataType; 6] = [
	DataType::Int,
	DataType::Uint,
	DataType::Long,
	DataType::Ulong,
	DataType::Float,
	DataType::Double,
];

const INTEGERS: [DataType; 4] = [
	DataType::Int,
	DataType::Uint,
	DataType::Long,
	DataType::Ulong,
];

const SIGNED: [DataType; 4] = [
	DataType::Int,
	DataType::Long,
	DataType::Float,
	DataType::Double,
];

const EQUATABLE: [DataType; 7] = [
	DataType::Int,
	DataType::Uint,
	DataType::Long,
	DataType::Ulong,
	DataType::Float,
	DataType::Double,
	DataType::Bool,
];

const BOOLEAN: [DataType; 1] = [DataType::Bool];

/// The 32-bit and 64-bit width classes. A value cast (`as`) converts within
/// one class; a widening cast (`to`) crosses between them. `bool` is in
/// neither class and can never be cast.
const CLASS_32: [DataType; 3] =
	[DataType::Int, DataType::Uint, DataType::Float];

const CLASS_64: [DataType; 3] =
	[DataType::Long, DataType::Ulong, DataType::Double];

/// Applies the type rules for the node's kind; `None` lets the data type
/// default to `void`.
pub fn apply(analyzer: &mut Analyzer, node: NodeId) -> Option<DataType>
{
	match analyzer.tree[node].kind
	{
		NodeKind::VariableId => Some(variable_id(analyzer, node)),
		NodeKind::FunctionId => Some(function_id(analyzer, node)),
		NodeKind::StructId => Some(struct_id(analyzer, node)),
		NodeKind::Access => Some(access(analyzer, node)),
		NodeKind::Type => Some(DataType::Type),
		NodeKind::VariableDef | NodeKind::FunctionDef => Some(
			DataType::from_annotation(&analyzer.tree[node].token.text),
		),
		NodeKind::StructDef =>
		{
			Some(DataType::Struct(analyzer.tree[node].token.text.clone()))
		}
		NodeKind::Literal => Some(literal(analyzer, node)),
		NodeKind::BinaryOp => Some(binary_op(analyzer, node)),
		NodeKind::UnaryOp => Some(unary_op(analyzer, node)),
		NodeKind::Assignment => Some(assignment(analyzer, node, true)),
		NodeKind::Global => Some(assignment(analyzer, node, false)),
		NodeKind::FunctionCall => Some(function_call(analyzer, node)),
		NodeKind::Return => Some(return_value(analyzer, node)),
		NodeKind::ReturnVoid => Some(return_void(analyzer, node)),
		_ => None,
	}
}

fn variable_id(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let scope = analyzer.scope_of(node);
	let name = analyzer.tree[node].token.text.clone();
	match analyzer.symbols.get_variable(scope, &name)
	{
		Some(id) => analyzer.symbols.variable(id).data_type.clone(),
		None =>
		{
			analyzer.errors.add(Error::UndefinedVariable {
				name,
				location: analyzer.tree[node].location.clone(),
			});
			DataType::Invalid
		}
	}
}

fn function_id(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let scope = analyzer.scope_of(node);
	let name = analyzer.tree[node].token.text.clone();
	match analyzer.symbols.get_function(scope, &name)
	{
		Some(id) => analyzer.symbols.function(id).return_type.clone(),
		None =>
		{
			analyzer.errors.add(Error::UndefinedFunction {
				name,
				location: analyzer.tree[node].location.clone(),
			});
			DataType::Invalid
		}
	}
}

fn struct_id(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let scope = analyzer.scope_of(node);
	let name = analyzer.tree[node].token.text.clone();
	match analyzer.symbols.get_structure(scope, &name)
	{
		Some(id) =>
		{
			DataType::Struct(analyzer.symbols.structure(id).name.clone())
		}
		None =>
		{
			analyzer.errors.add(Error::UndefinedStructure {
				name,
				location: analyzer.tree[node].location.clone(),
			});
			DataType::Invalid
		}
	}
}

/// A member access is typed by its innermost identifier, found by descending
/// the second child of nested access nodes.
fn access(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let mut current = node;
	while analyzer.tree[current].kind == NodeKind::Access
	{
		match analyzer.tree.child(current, 1)
		{
			Some(next) => current = next,
			None => return DataType::Invalid,
		}
	}
	analyzer.data_type_of(current)
}

fn literal(analyzer: &Analyzer, node: NodeId) -> DataType
{
	DataType::from_literal(analyzer.tree[node].token.kind)
		.unwrap_or(DataType::Invalid)
}

fn binary_op(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let op = analyzer.tree[node].token.kind;
	if op == TokenKind::As || op == TokenKind::To
	{
		return cast(analyzer, node);
	}
	let (left, right) =
		match (analyzer.tree.child(node, 0), analyzer.tree.child(node, 1))
		{
			(Some(left), Some(right)) => (left, right),
			_ => return DataType::Invalid,
		};
	let left_type = analyzer.data_type_of(left);
	let right_type = analyzer.data_type_of(right);
	if left_type == DataType::Invalid || right_type == DataType::Invalid
	{
		return DataType::Invalid;
	}
	let row: &[DataType] = match op
	{
		TokenKind::Plus
		| TokenKind::Minus
		| TokenKind::Times
		| TokenKind::Divide => &NUMERIC,
		TokenKind::Modulo
		| TokenKind::Ampersand
		| TokenKind::Pipe
		| TokenKind::Caret
		| TokenKind::ShiftLeft
		| TokenKind::ShiftRight
		| TokenKind::RotateLeft
		| TokenKind::RotateRight => &INTEGERS,
		TokenKind::Equals | TokenKind::NotEquals => &EQUATABLE,
		TokenKind::Less
		| TokenKind::LessEquals
		| TokenKind::Greater
		| TokenKind::GreaterEquals => &NUMERIC,
		TokenKind::AndAnd | TokenKind::OrOr => &BOOLEAN,
		_ => &[],
	};
	if left_type == right_type && row.contains(&left_type)
	{
		match op
		{
			TokenKind::Equals
			| TokenKind::NotEquals
			| TokenKind::Less
			| TokenKind::LessEquals
			| TokenKind::Greater
			| TokenKind::GreaterEquals
			| TokenKind::AndAnd
			| TokenKind::OrOr => DataType::Bool,
			_ => left_type,
		}
	}
	else
	{
		let op_text = analyzer.tree[node].token.text.clone();
		analyzer.errors.add(Error::InvalidOperand {
			op: op_text.clone(),
			data_type: left_type,
			location: analyzer.tree[left].location.clone(),
		});
		analyzer.errors.add(Error::InvalidOperand {
			op: op_text,
			data_type: right_type,
			location: analyzer.tree[right].location.clone(),
		});
		DataType::Invalid
	}
}

fn unary_op(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let operand = match analyzer.tree.child(node, 0)
	{
		Some(operand) => operand,
		None => return DataType::Invalid,
	};
	let operand_type = analyzer.data_type_of(operand);
	if operand_type == DataType::Invalid
	{
		return DataType::Invalid;
	}
	let row: &[DataType] = match analyzer.tree[node].token.kind
	{
		TokenKind::Minus => &SIGNED,
		TokenKind::Tilde => &INTEGERS,
		TokenKind::Not => &BOOLEAN,
		_ => &[],
	};
	if row.contains(&operand_type)
	{
		operand_type
	}
	else
	{
		let op_text = analyzer.tree[node].token.text.clone();
		analyzer.errors.add(Error::InvalidOperand {
			op: op_text,
			data_type: operand_type,
			location: analyzer.tree[operand].location.clone(),
		});
		DataType::Invalid
	}
}

fn as_castable(from: &DataType, to: &DataType) -> bool
{
	from != to
		&& ((CLASS_32.contains(from) && CLASS_32.contains(to))
			|| (CLASS_64.contains(from) && CLASS_64.contains(to)))
}

fn to_castable(from: &DataType, to: &DataType) -> bool
{
	(CLASS_32.contains(from) && CLASS_64.contains(to))
		|| (CLASS_64.contains(from) && CLASS_32.contains(to))
}

fn cast(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let (value, target) =
		match (analyzer.tree.child(node, 0), analyzer.tree.child(node, 1))
		{
			(Some(value), Some(target)) => (value, target),
			_ => return DataType::Invalid,
		};
	let value_type = analyzer.data_type_of(value);
	if analyzer.tree[target].kind != NodeKind::Type
	{
		analyzer.errors.add(Error::CastTargetNotType {
			location: analyzer.tree[target].location.clone(),
		});
		return DataType::Invalid;
	}
	let target_type =
		DataType::from_annotation(&analyzer.tree[target].token.text);
	if value_type == DataType::Invalid
	{
		return DataType::Invalid;
	}
	let allowed = match analyzer.tree[node].token.kind
	{
		TokenKind::As => as_castable(&value_type, &target_type),
		TokenKind::To => to_castable(&value_type, &target_type),
		_ => false,
	};
	if allowed
	{
		target_type
	}
	else
	{
		analyzer.errors.add(Error::InvalidCast {
			op: analyzer.tree[node].token.text.clone(),
			from: value_type,
			to: target_type,
			location: analyzer.tree[node].location.clone(),
		});
		DataType::Invalid
	}
}

/// Finds the identifier a target or callee ultimately names: the innermost
/// member of an access chain, or the name of a fresh definition.
fn inner_identifier(analyzer: &Analyzer, node: NodeId) -> Option<NodeId>
{
	let mut current = node;
	loop
	{
		match analyzer.tree[current].kind
		{
			NodeKind::Access =>
			{
				current = analyzer.tree.child(current, 1)?;
			}
			NodeKind::VariableDef =>
			{
				current = analyzer.tree.child(current, 0)?;
			}
			NodeKind::VariableId | NodeKind::FunctionId =>
			{
				return Some(current);
			}
			_ => return None,
		}
	}
}

/// Assignments require both sides to agree exactly; global definitions have
/// the same typing but skip the constant check, since the definition itself
/// may be the constant.
fn assignment(
	analyzer: &mut Analyzer,
	node: NodeId,
	check_const: bool,
) -> DataType
{
	let (target, value) =
		match (analyzer.tree.child(node, 0), analyzer.tree.child(node, 1))
		{
			(Some(target), Some(value)) => (target, value),
			_ => return DataType::Invalid,
		};
	if check_const
	{
		if let Some(identifier) = inner_identifier(analyzer, target)
		{
			let scope = analyzer.scope_of(identifier);
			let name = analyzer.tree[identifier].token.text.clone();
			if let Some(id) = analyzer.symbols.get_variable(scope, &name)
			{
				let is_const = analyzer
					.symbols
					.variable(id)
					.flags
					.contains(VariableFlag::Const);
				if is_const
				{
					analyzer.errors.add(Error::ConstantAssignment {
						name,
						location: analyzer.tree[node].location.clone(),
					});
					return DataType::Invalid;
				}
			}
		}
	}
	let left_type = analyzer.data_type_of(target);
	let right_type = analyzer.data_type_of(value);
	if left_type == DataType::Invalid
	{
		analyzer.errors.add(Error::InvalidLeftHandSide {
			location: analyzer.tree[target].location.clone(),
		});
	}
	if right_type == DataType::Invalid
	{
		analyzer.errors.add(Error::InvalidRightHandSide {
			location: analyzer.tree[value].location.clone(),
		});
	}
	if left_type == DataType::Invalid || right_type == DataType::Invalid
	{
		return DataType::Invalid;
	}
	if left_type != right_type
	{
		analyzer.errors.add(Error::AssignmentTypeMismatch {
			left: left_type,
			right: right_type,
			location: analyzer.tree[node].location.clone(),
		});
		return DataType::Invalid;
	}
	left_type
}

fn function_call(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let (callee, arguments) =
		match (analyzer.tree.child(node, 0), analyzer.tree.child(node, 1))
		{
			(Some(callee), Some(arguments)) => (callee, arguments),
			_ => return DataType::Invalid,
		};
	let identifier = match inner_identifier(analyzer, callee)
	{
		Some(identifier) => identifier,
		None => return DataType::Invalid,
	};
	let scope = analyzer.scope_of(identifier);
	let name = analyzer.tree[identifier].token.text.clone();
	let function = match analyzer.symbols.get_function(scope, &name)
	{
		Some(id) => id,
		None =>
		{
			// Typing the callee surfaces the undefined-function diagnostic.
			return analyzer.data_type_of(callee);
		}
	};
	let (function_name, return_type, parameters) = {
		let record = analyzer.symbols.function(function);
		(
			record.name.clone(),
			record.return_type.clone(),
			record.parameters.clone(),
		)
	};
	let argument_nodes = analyzer.tree[arguments].children.clone();
	if argument_nodes.len() != parameters.len()
	{
		analyzer.errors.add(Error::ArgumentCountMismatch {
			function: function_name,
			expected: parameters.len(),
			actual: argument_nodes.len(),
			location: analyzer.tree[node].location.clone(),
		});
		return DataType::Invalid;
	}
	let mut mismatched = false;
	for (i, (&argument, &parameter)) in
		argument_nodes.iter().zip(parameters.iter()).enumerate()
	{
		let argument_type = analyzer.data_type_of(argument);
		let (parameter_name, parameter_type) = {
			let record = analyzer.symbols.variable(parameter);
			(record.name.clone(), record.data_type.clone())
		};
		if argument_type == DataType::Invalid
		{
			// Already diagnosed at its root cause.
			mismatched = true;
		}
		else if argument_type != parameter_type
		{
			mismatched = true;
			analyzer.errors.add(Error::ArgumentTypeMismatch {
				ordinal: i + 1,
				parameter: parameter_name,
				function: function_name.clone(),
				expected: parameter_type,
				actual: argument_type,
				location: analyzer.tree[argument].location.clone(),
			});
		}
	}
	if mismatched
	{
		DataType::Invalid
	}
	else
	{
		return_type
	}
}

fn enclosing_function(analyzer: &Analyzer, node: NodeId) -> Option<NodeId>
{
	let mut current = analyzer.tree[node].parent;
	while let Some(ancestor) = current
	{
		if analyzer.tree[ancestor].kind == NodeKind::FunctionDef
		{
			return Some(ancestor);
		}
		current = analyzer.tree[ancestor].parent;
	}
	None
}

fn return_value(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let value = match analyzer.tree.child(node, 0)
	{
		Some(value) => value,
		None => return DataType::Invalid,
	};
	let value_type = analyzer.data_type_of(value);
	let function = match enclosing_function(analyzer, node)
	{
		Some(function) => function,
		None => return DataType::Invalid,
	};
	let return_type =
		DataType::from_annotation(&analyzer.tree[function].token.text);
	if value_type == DataType::Invalid
	{
		return DataType::Invalid;
	}
	// A value return inside a void function is always a mismatch.
	if value_type != return_type || return_type == DataType::Void
	{
		analyzer.errors.add(Error::ReturnTypeMismatch {
			expected: return_type,
			actual: value_type,
			location: analyzer.tree[node].location.clone(),
		});
		return DataType::Invalid;
	}
	value_type
}

fn return_void(analyzer: &mut Analyzer, node: NodeId) -> DataType
{
	let function = match enclosing_function(analyzer, node)
	{
		Some(function) => function,
		None => return DataType::Invalid,
	};
	let return_type =
		DataType::from_annotation(&analyzer.tree[function].token.text);
	if return_type != DataType::Void
	{
		analyzer.errors.add(Error::MissingReturnValue {
			expected: return_type,
			location: analyzer.tree[node].location.clone(),
		});
		return DataType::Invalid;
	}
	DataType::Void
}
