//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Scope rules. Each rule decides which scope its node inhabits, creating
//! scopes and declaring symbols along the way. Member access additionally
//! materializes a per-variable scope for struct-typed variables on first
//! use, which is where the concrete memory layout of mapped structs is
//! computed.

use enumset::EnumSet;

use crate::analyzer::Analyzer;
use crate::ast::{NodeId, NodeKind};
use crate::data_type::DataType;
use crate::error::Error;
use crate::lexer::Location;
use crate::symbol::{
	Function, ScopeId, Structure, VarId, Variable, VariableFlag,
};

/// Applies the scope rule for the node's kind, if it has one.
pub fn apply(
	analyzer: &mut Analyzer,
	node: NodeId,
	parent: ScopeId,
) -> Option<ScopeId>
{
	match analyzer.tree[node].kind
	{
		NodeKind::Program | NodeKind::Block =>
		{
			Some(analyzer.symbols.add_scope(parent, "", Some(node)))
		}
		NodeKind::StructDef => Some(struct_definition(analyzer, node, parent)),
		NodeKind::FunctionDef =>
		{
			Some(function_definition(analyzer, node, parent))
		}
		NodeKind::VariableDef =>
		{
			variable_definition(analyzer, node, parent);
			None
		}
		NodeKind::Access => access(analyzer, node, parent),
		NodeKind::Const =>
		{
			constant(analyzer, node, parent);
			None
		}
		NodeKind::Export =>
		{
			export(analyzer, node, parent);
			None
		}
		_ => None,
	}
}

fn struct_definition(
	analyzer: &mut Analyzer,
	node: NodeId,
	parent: ScopeId,
) -> ScopeId
{
	let name = analyzer.tree[node].token.text.clone();
	let scope = analyzer.symbols.add_scope(parent, &name, Some(node));
	// Memoize early so that the field definitions resolve into this scope.
	analyzer.tree[node].scope = Some(scope);
	let mut fields = Vec::new();
	if let Some(fields_node) = analyzer.tree.child(node, 1)
	{
		let field_nodes = analyzer.tree[fields_node].children.clone();
		for field_node in field_nodes
		{
			analyzer.scope_of(field_node);
			let field_name = match analyzer.tree.child(field_node, 0)
			{
				Some(id) => analyzer.tree[id].token.text.clone(),
				None => continue,
			};
			if let Some(id) =
				analyzer.symbols.local_variable(scope, &field_name)
			{
				if !fields.contains(&id)
				{
					fields.push(id);
				}
			}
		}
	}
	let structure = Structure {
		name: name.clone(),
		fields,
		scope: parent,
		node: Some(node),
		is_export: false,
	};
	if let Err(existing) = analyzer.symbols.declare_structure(structure)
	{
		let previous = analyzer
			.symbols
			.structure(existing)
			.node
			.map(|id| analyzer.tree[id].location.clone());
		analyzer.errors.add(Error::DuplicateDeclarationStructure {
			name,
			location: analyzer.tree[node].location.clone(),
			previous,
		});
	}
	scope
}

fn function_definition(
	analyzer: &mut Analyzer,
	node: NodeId,
	parent: ScopeId,
) -> ScopeId
{
	let name = match analyzer.tree.child(node, 0)
	{
		Some(id) => analyzer.tree[id].token.text.clone(),
		None => String::new(),
	};
	let scope = analyzer.symbols.add_scope(parent, &name, Some(node));
	analyzer.tree[node].scope = Some(scope);
	let mut parameters = Vec::new();
	if let Some(parameters_node) = analyzer.tree.child(node, 1)
	{
		let parameter_nodes =
			analyzer.tree[parameters_node].children.clone();
		for parameter_node in parameter_nodes
		{
			analyzer.scope_of(parameter_node);
			let parameter_name = match analyzer.tree.child(parameter_node, 0)
			{
				Some(id) => analyzer.tree[id].token.text.clone(),
				None => continue,
			};
			if let Some(id) =
				analyzer.symbols.local_variable(scope, &parameter_name)
			{
				if !parameters.contains(&id)
				{
					parameters.push(id);
				}
			}
		}
	}
	let return_type =
		DataType::from_annotation(&analyzer.tree[node].token.text);
	let function = Function {
		name: name.clone(),
		return_type,
		parameters,
		scope: parent,
		node: Some(node),
		is_export: false,
	};
	if let Err(existing) = analyzer.symbols.declare_function(function)
	{
		let previous = analyzer
			.symbols
			.function(existing)
			.node
			.map(|id| analyzer.tree[id].location.clone());
		analyzer.errors.add(Error::DuplicateDeclarationFunction {
			name,
			location: analyzer.tree[node].location.clone(),
			previous,
		});
	}
	scope
}

fn variable_definition(analyzer: &mut Analyzer, node: NodeId, parent: ScopeId)
{
	let name = match analyzer.tree.child(node, 0)
	{
		Some(id) => analyzer.tree[id].token.text.clone(),
		None => return,
	};
	let data_type =
		DataType::from_annotation(&analyzer.tree[node].token.text);
	let mut flags = EnumSet::new();
	let mut offset = 0;
	let mut current = analyzer.tree[node].parent;
	while let Some(ancestor) = current
	{
		match analyzer.tree[ancestor].kind
		{
			NodeKind::Global =>
			{
				flags |= VariableFlag::Global;
			}
			NodeKind::Map =>
			{
				flags |= VariableFlag::Global | VariableFlag::Mapped;
				if let Some(literal) = analyzer.tree.child(ancestor, 1)
				{
					if analyzer.tree[literal].kind == NodeKind::Literal
					{
						offset =
							parse_offset(&analyzer.tree[literal].token.text);
					}
				}
			}
			_ => (),
		}
		current = analyzer.tree[ancestor].parent;
	}
	let variable = Variable {
		name: name.clone(),
		data_type,
		scope: parent,
		node: Some(node),
		offset,
		flags,
	};
	if let Err(existing) = analyzer.symbols.declare_variable(variable)
	{
		let previous = analyzer
			.symbols
			.variable(existing)
			.node
			.map(|id| analyzer.tree[id].location.clone());
		analyzer.errors.add(Error::DuplicateDeclarationVariable {
			name,
			location: analyzer.tree[node].location.clone(),
			previous,
		});
	}
}

fn parse_offset(text: &str) -> u32
{
	match text.strip_prefix("0x")
	{
		Some(hex) => u32::from_str_radix(hex, 16).unwrap_or(0),
		None => text.parse().unwrap_or(0),
	}
}

/// The member-access rule: the first child names a nested scope, either a
/// registered one (a builtin family or a struct definition) or the lazily
/// materialized scope of a struct-typed variable.
fn access(
	analyzer: &mut Analyzer,
	node: NodeId,
	parent: ScopeId,
) -> Option<ScopeId>
{
	let first = match analyzer.tree.child(node, 0)
	{
		Some(id) => id,
		None => return None,
	};
	let name = analyzer.tree[first].token.text.clone();
	if let Some(scope) = analyzer.symbols.get_scope(parent, &name)
	{
		return Some(scope);
	}
	if let Some(variable) = analyzer.symbols.get_variable(parent, &name)
	{
		let data_type = analyzer.symbols.variable(variable).data_type.clone();
		if let DataType::Struct(_) = data_type
		{
			let location = analyzer.tree[first].location.clone();
			make_struct_scope(analyzer, variable, &location);
			if let Some(scope) = analyzer.symbols.get_scope(parent, &name)
			{
				return Some(scope);
			}
		}
	}
	analyzer.errors.add(Error::UndefinedMember {
		name,
		location: analyzer.tree[first].location.clone(),
	});
	None
}

/// Materializes the member scope of a struct-typed variable: a scope named
/// after the variable, holding one synthesized variable per struct field,
/// with offsets laid out from the variable's own offset onward.
fn make_struct_scope(
	analyzer: &mut Analyzer,
	variable: VarId,
	location: &Location,
)
{
	let (name, owner, base_offset, flags, struct_name) = {
		let record = analyzer.symbols.variable(variable);
		let struct_name = match &record.data_type
		{
			DataType::Struct(struct_name) => struct_name.clone(),
			_ => return,
		};
		(
			record.name.clone(),
			record.scope,
			record.offset,
			record.flags,
			struct_name,
		)
	};
	let structure = match analyzer.symbols.get_structure(owner, &struct_name)
	{
		Some(id) => id,
		None =>
		{
			analyzer.errors.add(Error::UndefinedStructure {
				name: struct_name,
				location: location.clone(),
			});
			return;
		}
	};
	let scope = analyzer.symbols.add_scope(owner, &name, None);
	let mut inherited: EnumSet<VariableFlag> = EnumSet::new();
	for flag in [
		VariableFlag::Const,
		VariableFlag::Export,
		VariableFlag::Mapped,
	]
	{
		if flags.contains(flag)
		{
			inherited |= flag;
		}
	}
	if inherited.contains(VariableFlag::Const)
		|| inherited.contains(VariableFlag::Mapped)
	{
		inherited |= VariableFlag::Global;
	}
	let fields = analyzer.symbols.structure(structure).fields.clone();
	let mut cursor = base_offset;
	for field in fields
	{
		let (field_name, field_type) = {
			let record = analyzer.symbols.variable(field);
			(record.name.clone(), record.data_type.clone())
		};
		let size = size_of(analyzer, &field_type, owner, location, 0);
		let _ = analyzer.symbols.declare_variable(Variable {
			name: field_name,
			data_type: field_type,
			scope,
			node: None,
			offset: cursor,
			flags: inherited,
		});
		cursor += size;
	}
}

/// The size of a value of the given type. Struct sizes sum their fields
/// recursively; the recursion is hard-bounded so that a self-referential
/// struct still terminates with a finite size.
pub fn size_of(
	analyzer: &mut Analyzer,
	data_type: &DataType,
	scope: ScopeId,
	location: &Location,
	depth: u32,
) -> u32
{
	if depth > 16
	{
		return 0;
	}
	match data_type
	{
		DataType::Struct(name) =>
		{
			let structure = match analyzer.symbols.get_structure(scope, name)
			{
				Some(id) => id,
				None =>
				{
					analyzer.errors.add(Error::UndefinedStructure {
						name: name.clone(),
						location: location.clone(),
					});
					return 0;
				}
			};
			let fields = analyzer.symbols.structure(structure).fields.clone();
			let mut size = 0;
			for field in fields
			{
				let field_type =
					analyzer.symbols.variable(field).data_type.clone();
				size +=
					size_of(analyzer, &field_type, scope, location, depth + 1);
			}
			size
		}
		primitive => primitive.size_in_bytes(),
	}
}

fn leftmost_identifier(analyzer: &Analyzer, node: NodeId) -> NodeId
{
	let mut current = node;
	while let Some(&child) = analyzer.tree[current].children.first()
	{
		current = child;
	}
	current
}

/// The const rule descends to the declared identifier and marks its
/// variable; a constant is implicitly a global.
fn constant(analyzer: &mut Analyzer, node: NodeId, parent: ScopeId)
{
	let identifier = leftmost_identifier(analyzer, node);
	analyzer.scope_of(identifier);
	let name = analyzer.tree[identifier].token.text.clone();
	if let Some(id) = analyzer.symbols.get_variable(parent, &name)
	{
		let variable = analyzer.symbols.variable_mut(id);
		variable.flags |= VariableFlag::Const | VariableFlag::Global;
	}
}

/// The export rule descends to the declared identifier and marks whichever
/// symbol bears that name.
fn export(analyzer: &mut Analyzer, node: NodeId, parent: ScopeId)
{
	let identifier = leftmost_identifier(analyzer, node);
	analyzer.scope_of(identifier);
	let name = analyzer.tree[identifier].token.text.clone();
	if let Some(id) = analyzer.symbols.get_variable(parent, &name)
	{
		analyzer.symbols.variable_mut(id).flags |= VariableFlag::Export;
	}
	else if let Some(id) = analyzer.symbols.get_function(parent, &name)
	{
		analyzer.symbols.function_mut(id).is_export = true;
	}
	else if let Some(id) = analyzer.symbols.get_structure(parent, &name)
	{
		analyzer.symbols.structure_mut(id).is_export = true;
	}
}
