//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The rebuilder turns a syntax tree back into canonical source: four-space
//! indentation, one statement per line, single spaces around operators.
//! Formatting already-formatted source is a fixpoint.

use std::fmt::Write;

use crate::ast::{NodeId, NodeKind, Tree};
use crate::lexer::TokenKind;

pub fn rebuild(
	tree: &Tree,
	indentation: &Indentation,
) -> Result<String, anyhow::Error>
{
	let mut buffer = String::new();
	if tree.is_empty()
	{
		return Ok(buffer);
	}
	for &child in &tree[tree.root()].children
	{
		write!(&mut buffer, "{}", statement(tree, child, indentation)?)?;
	}
	Ok(buffer)
}

pub struct Indentation
{
	pub value: &'static str,
	pub amount: usize,
}

impl Indentation
{
	fn increased(&self) -> Indentation
	{
		Indentation {
			value: self.value,
			amount: self.amount + 1,
		}
	}
}

impl std::fmt::Display for Indentation
{
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
	{
		write!(f, "{}", self.value.repeat(self.amount))
	}
}

fn statement(
	tree: &Tree,
	node: NodeId,
	indentation: &Indentation,
) -> Result<String, anyhow::Error>
{
	let mut buffer = String::new();
	match tree[node].kind
	{
		NodeKind::StructDef =>
		{
			writeln!(
				&mut buffer,
				"{}struct {}",
				indentation, tree[node].token.text
			)?;
			if let Some(fields) = tree.child(node, 1)
			{
				let inner = indentation.increased();
				for &field in &tree[fields].children
				{
					writeln!(
						&mut buffer,
						"{}{}",
						inner,
						definition_text(tree, field)
					)?;
				}
			}
		}
		NodeKind::FunctionDef =>
		{
			let name = match tree.child(node, 0)
			{
				Some(id) => tree[id].token.text.as_str(),
				None => "",
			};
			let mut parameters = Vec::new();
			if let Some(list) = tree.child(node, 1)
			{
				for &parameter in &tree[list].children
				{
					parameters.push(definition_text(tree, parameter));
				}
			}
			writeln!(
				&mut buffer,
				"{}{} {}({})",
				indentation,
				tree[node].token.text,
				name,
				parameters.join(", ")
			)?;
			if let Some(body) = tree.child(node, 2)
			{
				write!(
					&mut buffer,
					"{}",
					block(tree, body, &indentation.increased())?
				)?;
			}
		}
		NodeKind::VariableDef =>
		{
			writeln!(
				&mut buffer,
				"{}{}",
				indentation,
				definition_text(tree, node)
			)?;
		}
		NodeKind::Global =>
		{
			writeln!(
				&mut buffer,
				"{}{}",
				indentation,
				global_text(tree, node)?
			)?;
		}
		NodeKind::Map =>
		{
			let definition = match tree.child(node, 0)
			{
				Some(id) => definition_text(tree, id),
				None => String::new(),
			};
			let offset = match tree.child(node, 1)
			{
				Some(id) => literal_text(tree, id),
				None => String::new(),
			};
			writeln!(
				&mut buffer,
				"{}map {} {}",
				indentation, definition, offset
			)?;
		}
		NodeKind::Const =>
		{
			let global = match tree.child(node, 0)
			{
				Some(id) => global_text(tree, id)?,
				None => String::new(),
			};
			writeln!(&mut buffer, "{}const {}", indentation, global)?;
		}
		NodeKind::Export =>
		{
			let inner = match tree.child(node, 0)
			{
				Some(id) => statement(tree, id, indentation)?,
				None => String::new(),
			};
			// Splice the keyword in after the indentation of the first line.
			let prefix = indentation.to_string();
			let rest = inner.strip_prefix(&prefix).unwrap_or(&inner);
			write!(&mut buffer, "{}export {}", prefix, rest)?;
		}
		NodeKind::Assignment =>
		{
			let target = match tree.child(node, 0)
			{
				Some(id) if tree[id].kind == NodeKind::VariableDef =>
				{
					definition_text(tree, id)
				}
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			let value = match tree.child(node, 1)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			writeln!(
				&mut buffer,
				"{}{} = {}",
				indentation, target, value
			)?;
		}
		NodeKind::Return =>
		{
			let value = match tree.child(node, 0)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			writeln!(&mut buffer, "{}return {}", indentation, value)?;
		}
		NodeKind::ReturnVoid =>
		{
			writeln!(&mut buffer, "{}return", indentation)?;
		}
		NodeKind::If =>
		{
			write!(
				&mut buffer,
				"{}",
				if_statement(tree, node, indentation)?
			)?;
		}
		NodeKind::While =>
		{
			let condition = match tree.child(node, 0)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			writeln!(&mut buffer, "{}while {}", indentation, condition)?;
			if let Some(body) = tree.child(node, 1)
			{
				write!(
					&mut buffer,
					"{}",
					block(tree, body, &indentation.increased())?
				)?;
			}
		}
		NodeKind::Break =>
		{
			writeln!(&mut buffer, "{}break", indentation)?;
		}
		NodeKind::Continue =>
		{
			writeln!(&mut buffer, "{}continue", indentation)?;
		}
		NodeKind::Block =>
		{
			write!(&mut buffer, "{}", block(tree, node, indentation)?)?;
		}
		_ =>
		{
			writeln!(
				&mut buffer,
				"{}{}",
				indentation,
				expression(tree, node)
			)?;
		}
	}
	Ok(buffer)
}

fn if_statement(
	tree: &Tree,
	node: NodeId,
	indentation: &Indentation,
) -> Result<String, anyhow::Error>
{
	let mut buffer = String::new();
	let condition = match tree.child(node, 0)
	{
		Some(id) => expression(tree, id),
		None => String::new(),
	};
	writeln!(&mut buffer, "{}if {}", indentation, condition)?;
	if let Some(body) = tree.child(node, 1)
	{
		write!(
			&mut buffer,
			"{}",
			block(tree, body, &indentation.increased())?
		)?;
	}
	if let Some(else_branch) = tree.child(node, 2)
	{
		match tree[else_branch].kind
		{
			NodeKind::If =>
			{
				let inner = if_statement(tree, else_branch, indentation)?;
				let prefix = indentation.to_string();
				let rest = inner.strip_prefix(&prefix).unwrap_or(&inner);
				write!(&mut buffer, "{}else {}", prefix, rest)?;
			}
			_ =>
			{
				writeln!(&mut buffer, "{}else", indentation)?;
				write!(
					&mut buffer,
					"{}",
					block(tree, else_branch, &indentation.increased())?
				)?;
			}
		}
	}
	Ok(buffer)
}

fn block(
	tree: &Tree,
	node: NodeId,
	indentation: &Indentation,
) -> Result<String, anyhow::Error>
{
	let mut buffer = String::new();
	for &child in &tree[node].children
	{
		write!(&mut buffer, "{}", statement(tree, child, indentation)?)?;
	}
	Ok(buffer)
}

fn definition_text(tree: &Tree, node: NodeId) -> String
{
	let name = match tree.child(node, 0)
	{
		Some(id) => tree[id].token.text.as_str(),
		None => "",
	};
	format!("{} {}", tree[node].token.text, name)
}

fn global_text(tree: &Tree, node: NodeId) -> Result<String, anyhow::Error>
{
	let definition = match tree.child(node, 0)
	{
		Some(id) => definition_text(tree, id),
		None => String::new(),
	};
	let value = match tree.child(node, 1)
	{
		Some(id) => expression(tree, id),
		None => String::new(),
	};
	Ok(format!("{} = {}", definition, value))
}

/// Binding strength of a binary operator, for re-inserting the parentheses
/// the tree shape implies.
fn precedence(kind: TokenKind) -> u8
{
	match kind
	{
		TokenKind::OrOr => 0,
		TokenKind::AndAnd => 1,
		TokenKind::Equals | TokenKind::NotEquals => 2,
		TokenKind::Less
		| TokenKind::LessEquals
		| TokenKind::Greater
		| TokenKind::GreaterEquals => 3,
		TokenKind::Pipe => 4,
		TokenKind::Caret => 5,
		TokenKind::Ampersand => 6,
		TokenKind::ShiftLeft
		| TokenKind::ShiftRight
		| TokenKind::RotateLeft
		| TokenKind::RotateRight => 7,
		TokenKind::Plus | TokenKind::Minus => 8,
		TokenKind::Times | TokenKind::Divide | TokenKind::Modulo => 9,
		TokenKind::As | TokenKind::To => 10,
		_ => u8::MAX,
	}
}

fn operand(tree: &Tree, node: NodeId, parent: TokenKind, is_right: bool)
	-> String
{
	let text = expression(tree, node);
	if tree[node].kind == NodeKind::BinaryOp
	{
		let inner = precedence(tree[node].token.kind);
		let outer = precedence(parent);
		if inner < outer || (inner == outer && is_right)
		{
			return format!("({})", text);
		}
	}
	text
}

fn expression(tree: &Tree, node: NodeId) -> String
{
	match tree[node].kind
	{
		NodeKind::Literal => literal_text(tree, node),
		NodeKind::VariableId
		| NodeKind::FunctionId
		| NodeKind::StructId
		| NodeKind::Type => tree[node].token.text.clone(),
		NodeKind::Access =>
		{
			let left = match tree.child(node, 0)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			let right = match tree.child(node, 1)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			format!("{}.{}", left, right)
		}
		NodeKind::UnaryOp =>
		{
			let inner = match tree.child(node, 0)
			{
				Some(id) if tree[id].kind == NodeKind::BinaryOp =>
				{
					format!("({})", expression(tree, id))
				}
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			format!("{}{}", tree[node].token.text, inner)
		}
		NodeKind::BinaryOp =>
		{
			let kind = tree[node].token.kind;
			let left = match tree.child(node, 0)
			{
				Some(id) => operand(tree, id, kind, false),
				None => String::new(),
			};
			let right = match tree.child(node, 1)
			{
				Some(id) => operand(tree, id, kind, true),
				None => String::new(),
			};
			format!("{} {} {}", left, tree[node].token.text, right)
		}
		NodeKind::FunctionCall =>
		{
			let callee = match tree.child(node, 0)
			{
				Some(id) => expression(tree, id),
				None => String::new(),
			};
			let mut arguments = Vec::new();
			if let Some(list) = tree.child(node, 1)
			{
				for &argument in &tree[list].children
				{
					arguments.push(expression(tree, argument));
				}
			}
			format!("{}({})", callee, arguments.join(", "))
		}
		_ => String::new(),
	}
}

/// Literal text with the suffix the lexer classified away.
fn literal_text(tree: &Tree, node: NodeId) -> String
{
	let text = &tree[node].token.text;
	match tree[node].token.kind
	{
		TokenKind::Uint => format!("{}u", text),
		TokenKind::Long => format!("{}l", text),
		TokenKind::Ulong => format!("{}ul", text),
		TokenKind::Float => format!("{}f", text),
		TokenKind::Double if !text.contains('.') => format!("{}.0", text),
		_ => text.clone(),
	}
}
