//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Symbol records and the hierarchical scope tree. All records live in arenas
//! owned by the `SymbolTable` and refer to each other by id, so that the
//! cyclic links between scopes, symbols and AST nodes never imply ownership.

use std::collections::HashMap;

use enumset::{EnumSet, EnumSetType};

use crate::ast::NodeId;
use crate::data_type::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(u32);

#[derive(EnumSetType, Debug)]
pub enum VariableFlag
{
	/// Immutable after initialization. Implies `Global`.
	Const,
	Export,
	/// Lives at program scope rather than in a function frame.
	Global,
	/// Backed by a fixed byte offset in linear memory. Implies `Global`.
	Mapped,
}

#[must_use]
#[derive(Debug)]
pub struct Variable
{
	pub name: String,
	pub data_type: DataType,
	pub scope: ScopeId,
	/// The defining AST node; absent for builtins and for the synthesized
	/// field copies of a materialized struct scope.
	pub node: Option<NodeId>,
	/// Byte offset within the mapped region; zero otherwise.
	pub offset: u32,
	pub flags: EnumSet<VariableFlag>,
}

#[must_use]
#[derive(Debug)]
pub struct Function
{
	pub name: String,
	pub return_type: DataType,
	pub parameters: Vec<VarId>,
	pub scope: ScopeId,
	pub node: Option<NodeId>,
	pub is_export: bool,
}

#[must_use]
#[derive(Debug)]
pub struct Structure
{
	pub name: String,
	pub fields: Vec<VarId>,
	pub scope: ScopeId,
	pub node: Option<NodeId>,
	pub is_export: bool,
}

#[must_use]
#[derive(Debug)]
pub struct Scope
{
	/// Empty for anonymous block scopes.
	pub name: String,
	pub parent: Option<ScopeId>,
	pub node: Option<NodeId>,
	children: Vec<ScopeId>,
	named_scopes: HashMap<String, ScopeId>,
	variables: HashMap<String, VarId>,
	functions: HashMap<String, FnId>,
	structures: HashMap<String, StructId>,
}

impl Scope
{
	fn new(name: &str, parent: Option<ScopeId>, node: Option<NodeId>)
		-> Scope
	{
		Scope {
			name: name.to_string(),
			parent,
			node,
			children: Vec::new(),
			named_scopes: HashMap::new(),
			variables: HashMap::new(),
			functions: HashMap::new(),
			structures: HashMap::new(),
		}
	}

	pub fn children(&self) -> &[ScopeId]
	{
		&self.children
	}
}

#[must_use]
#[derive(Debug)]
pub struct SymbolTable
{
	scopes: Vec<Scope>,
	variables: Vec<Variable>,
	functions: Vec<Function>,
	structures: Vec<Structure>,
}

impl SymbolTable
{
	pub fn new() -> SymbolTable
	{
		SymbolTable {
			scopes: vec![Scope::new("", None, None)],
			variables: Vec::new(),
			functions: Vec::new(),
			structures: Vec::new(),
		}
	}

	pub fn root(&self) -> ScopeId
	{
		ScopeId(0)
	}

	pub fn scope(&self, id: ScopeId) -> &Scope
	{
		&self.scopes[id.0 as usize]
	}

	pub fn variable(&self, id: VarId) -> &Variable
	{
		&self.variables[id.0 as usize]
	}

	pub fn variable_mut(&mut self, id: VarId) -> &mut Variable
	{
		&mut self.variables[id.0 as usize]
	}

	pub fn function(&self, id: FnId) -> &Function
	{
		&self.functions[id.0 as usize]
	}

	pub fn function_mut(&mut self, id: FnId) -> &mut Function
	{
		&mut self.functions[id.0 as usize]
	}

	pub fn structure(&self, id: StructId) -> &Structure
	{
		&self.structures[id.0 as usize]
	}

	pub fn structure_mut(&mut self, id: StructId) -> &mut Structure
	{
		&mut self.structures[id.0 as usize]
	}

	/// Creates a child scope. A named scope is registered in the parent's
	/// by-name map unless that name is already taken, in which case the new
	/// scope is kept isolated (reachable through its id, not by lookup).
	/// Anonymous scopes are only tracked in the parent's child list.
	pub fn add_scope(
		&mut self,
		parent: ScopeId,
		name: &str,
		node: Option<NodeId>,
	) -> ScopeId
	{
		let id = ScopeId(self.scopes.len() as u32);
		self.scopes.push(Scope::new(name, Some(parent), node));
		let parent = &mut self.scopes[parent.0 as usize];
		parent.children.push(id);
		if !name.is_empty() && !parent.named_scopes.contains_key(name)
		{
			parent.named_scopes.insert(name.to_string(), id);
		}
		id
	}

	/// Looks up a nested scope by name, here or in any ancestor.
	pub fn get_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId>
	{
		let record = self.scope(scope);
		match record.named_scopes.get(name)
		{
			Some(&id) => Some(id),
			None => match record.parent
			{
				Some(parent) => self.get_scope(parent, name),
				None => None,
			},
		}
	}

	/// Looks up a nested scope in this scope only.
	pub fn local_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId>
	{
		self.scope(scope).named_scopes.get(name).copied()
	}

	/// Looks up a variable in this scope only.
	pub fn local_variable(&self, scope: ScopeId, name: &str) -> Option<VarId>
	{
		self.scope(scope).variables.get(name).copied()
	}

	pub fn get_variable(&self, scope: ScopeId, name: &str) -> Option<VarId>
	{
		let record = self.scope(scope);
		match record.variables.get(name)
		{
			Some(&id) => Some(id),
			None => match record.parent
			{
				Some(parent) => self.get_variable(parent, name),
				None => None,
			},
		}
	}

	pub fn get_function(&self, scope: ScopeId, name: &str) -> Option<FnId>
	{
		let record = self.scope(scope);
		match record.functions.get(name)
		{
			Some(&id) => Some(id),
			None => match record.parent
			{
				Some(parent) => self.get_function(parent, name),
				None => None,
			},
		}
	}

	pub fn get_structure(&self, scope: ScopeId, name: &str)
		-> Option<StructId>
	{
		let record = self.scope(scope);
		match record.structures.get(name)
		{
			Some(&id) => Some(id),
			None => match record.parent
			{
				Some(parent) => self.get_structure(parent, name),
				None => None,
			},
		}
	}

	/// Declares a variable in its owning scope. On a name collision the new
	/// record is discarded and the incumbent's id is returned as the error.
	pub fn declare_variable(&mut self, variable: Variable)
		-> Result<VarId, VarId>
	{
		let scope = variable.scope;
		if let Some(&existing) =
			self.scope(scope).variables.get(&variable.name)
		{
			return Err(existing);
		}
		let id = VarId(self.variables.len() as u32);
		let name = variable.name.clone();
		self.variables.push(variable);
		self.scopes[scope.0 as usize].variables.insert(name, id);
		Ok(id)
	}

	pub fn declare_function(&mut self, function: Function)
		-> Result<FnId, FnId>
	{
		let scope = function.scope;
		if let Some(&existing) =
			self.scope(scope).functions.get(&function.name)
		{
			return Err(existing);
		}
		let id = FnId(self.functions.len() as u32);
		let name = function.name.clone();
		self.functions.push(function);
		self.scopes[scope.0 as usize].functions.insert(name, id);
		Ok(id)
	}

	pub fn declare_structure(&mut self, structure: Structure)
		-> Result<StructId, StructId>
	{
		let scope = structure.scope;
		if let Some(&existing) =
			self.scope(scope).structures.get(&structure.name)
		{
			return Err(existing);
		}
		let id = StructId(self.structures.len() as u32);
		let name = structure.name.clone();
		self.structures.push(structure);
		self.scopes[scope.0 as usize].structures.insert(name, id);
		Ok(id)
	}

	/// Adds a parameter or field variable that belongs to a function or
	/// struct record rather than to a scope's by-name map.
	pub fn add_detached_variable(&mut self, variable: Variable) -> VarId
	{
		let id = VarId(self.variables.len() as u32);
		self.variables.push(variable);
		id
	}

	/// The fully qualified name of a symbol: the dot-joined chain of
	/// non-empty scope names from the root, then the symbol's own name.
	pub fn path(&self, scope: ScopeId, name: &str) -> String
	{
		let mut components = Vec::new();
		let mut current = Some(scope);
		while let Some(id) = current
		{
			let record = self.scope(id);
			if !record.name.is_empty()
			{
				components.push(record.name.as_str());
			}
			current = record.parent;
		}
		components.reverse();
		components.push(name);
		components.join(".")
	}
}

impl Default for SymbolTable
{
	fn default() -> SymbolTable
	{
		SymbolTable::new()
	}
}
