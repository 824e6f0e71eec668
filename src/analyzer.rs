//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The semantic analyzer decorates the syntax tree in place: it builds the
//! scope tree, resolves every name, assigns a data type to every node and
//! enforces the static typing rules. It runs four passes in fixed order:
//! a hoist pass that realizes struct types ahead of any expression that may
//! reference them, a scope pass, a type pass and a pure-diagnostic analysis
//! pass. Diagnostics are never fatal; every rule completes and poisons its
//! node with the `invalid` data type instead of unwinding.

pub mod checks;
pub mod scoping;
pub mod typing;

use crate::ast::{NodeId, NodeKind, Tree};
use crate::builtin;
use crate::data_type::DataType;
use crate::error::Errors;
use crate::symbol::{ScopeId, SymbolTable};

/// The result of analyzing a tree: the symbol table the scope annotations
/// point into, and everything the analyzer had to say about the program.
#[must_use]
pub struct Analysis
{
	pub symbols: SymbolTable,
	pub errors: Errors,
}

pub fn analyze(tree: &mut Tree) -> Analysis
{
	let mut analyzer = Analyzer::new(tree);
	analyzer.analyze();
	Analysis {
		symbols: analyzer.symbols,
		errors: analyzer.errors,
	}
}

pub struct Analyzer<'a>
{
	pub tree: &'a mut Tree,
	pub symbols: SymbolTable,
	pub errors: Errors,
}

impl<'a> Analyzer<'a>
{
	/// Creates an analyzer whose root scope is preloaded with the builtin
	/// intrinsics.
	pub fn new(tree: &'a mut Tree) -> Analyzer<'a>
	{
		let mut symbols = SymbolTable::new();
		builtin::install(&mut symbols);
		Analyzer {
			tree,
			symbols,
			errors: Errors::new(),
		}
	}

	pub fn analyze(&mut self)
	{
		if self.tree.is_empty()
		{
			return;
		}
		let root = self.tree.root();
		self.hoist(root);
		self.scope_pass(root);
		self.type_pass(root);
		self.analysis_pass(root);
	}

	/// Realizes the scope of every struct definition before anything else,
	/// so that code may reference struct types declared further down.
	fn hoist(&mut self, node: NodeId)
	{
		let children = self.tree[node].children.clone();
		for child in children
		{
			if self.tree[child].kind == NodeKind::StructDef
			{
				self.scope_of(child);
			}
			self.hoist(child);
		}
	}

	fn scope_pass(&mut self, node: NodeId)
	{
		self.scope_of(node);
		let children = self.tree[node].children.clone();
		for child in children
		{
			self.scope_pass(child);
		}
	}

	fn type_pass(&mut self, node: NodeId)
	{
		self.data_type_of(node);
		let children = self.tree[node].children.clone();
		for child in children
		{
			self.type_pass(child);
		}
	}

	fn analysis_pass(&mut self, node: NodeId)
	{
		checks::check(self, node);
		let children = self.tree[node].children.clone();
		for child in children
		{
			self.analysis_pass(child);
		}
	}

	/// The scope a node inhabits, computing and memoizing it on first use.
	///
	/// The parent scope is memoized provisionally before the node's own rule
	/// runs, so that a rule may force the scopes of descendants (the const
	/// and export descents do, as does field gathering) without recursing
	/// back into itself.
	pub fn scope_of(&mut self, node: NodeId) -> ScopeId
	{
		if let Some(scope) = self.tree[node].scope
		{
			return scope;
		}
		let parent_scope = match self.tree[node].parent
		{
			Some(parent) => self.scope_of(parent),
			None => self.symbols.root(),
		};
		self.tree[node].scope = Some(parent_scope);
		if self.tree[node].valid
		{
			if let Some(scope) = scoping::apply(self, node, parent_scope)
			{
				self.tree[node].scope = Some(scope);
				return scope;
			}
		}
		parent_scope
	}

	/// The data type of a node's value, computing and memoizing it on first
	/// use. Nodes rejected by the validator are poisoned as `invalid` and no
	/// type rules run on them.
	pub fn data_type_of(&mut self, node: NodeId) -> DataType
	{
		if !self.tree[node].valid
		{
			self.tree[node].data_type = Some(DataType::Invalid);
			return DataType::Invalid;
		}
		if let Some(data_type) = &self.tree[node].data_type
		{
			return data_type.clone();
		}
		let data_type =
			typing::apply(self, node).unwrap_or(DataType::Void);
		self.tree[node].data_type = Some(data_type.clone());
		data_type
	}

	/// The size in bytes of a value of the given type, as resolved from the
	/// given scope. Struct sizes are the sum of their field sizes.
	pub fn size_of(
		&mut self,
		data_type: &DataType,
		scope: ScopeId,
		location: &crate::lexer::Location,
	) -> u32
	{
		scoping::size_of(self, data_type, scope, location, 0)
	}
}
