//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The generator lowers an analyzed tree to a WebAssembly binary module.
//! Functions become Wasm functions, plain globals become Wasm globals, and
//! mapped variables become absolute-offset loads and stores against a single
//! exported linear memory. The driver only invokes this stage when analysis
//! produced no error-severity diagnostics.

use std::collections::HashMap;

use anyhow::anyhow;
use wasm_encoder::{
	BlockType, CodeSection, ConstExpr, ExportKind, ExportSection, Function,
	FunctionSection, GlobalSection, GlobalType, Instruction, MemArg,
	MemorySection, MemoryType, Module, TypeSection, ValType,
};

use crate::ast::{NodeId, NodeKind, Tree};
use crate::data_type::DataType;
use crate::lexer::TokenKind;
use crate::symbol::{FnId, ScopeId, SymbolTable, VarId, VariableFlag};

const PAGE_SIZE: u32 = 65536;

pub fn generate(
	tree: &Tree,
	symbols: &SymbolTable,
) -> Result<Vec<u8>, anyhow::Error>
{
	let mut generator = Generator {
		tree,
		symbols,
		functions: HashMap::new(),
		globals: HashMap::new(),
		locals: HashMap::new(),
		depth: 0,
		loops: Vec::new(),
	};
	generator.generate()
}

struct LoopLabels
{
	break_depth: u32,
	continue_depth: u32,
}

struct Generator<'a>
{
	tree: &'a Tree,
	symbols: &'a SymbolTable,
	functions: HashMap<FnId, u32>,
	globals: HashMap<VarId, u32>,
	// State of the function currently being generated.
	locals: HashMap<VarId, u32>,
	depth: u32,
	loops: Vec<LoopLabels>,
}

impl<'a> Generator<'a>
{
	fn generate(&mut self) -> Result<Vec<u8>, anyhow::Error>
	{
		if self.tree.is_empty()
		{
			return Ok(Module::new().finish());
		}
		let program = self.tree.root();
		let program_scope = self.tree[program]
			.scope
			.ok_or_else(|| anyhow!("the tree has not been analyzed"))?;

		// Strip modifier wrappers to find the definitions themselves.
		let mut function_nodes = Vec::new();
		let mut global_nodes = Vec::new();
		for &child in &self.tree[program].children
		{
			let definition = unwrapped(self.tree, child);
			match self.tree[definition].kind
			{
				NodeKind::FunctionDef => function_nodes.push(definition),
				NodeKind::Global => global_nodes.push(definition),
				_ => (),
			}
		}

		for (index, &node) in function_nodes.iter().enumerate()
		{
			let id = self.function_id(node, program_scope)?;
			self.functions.insert(id, index as u32);
		}

		let mut types = TypeSection::new();
		let mut functions = FunctionSection::new();
		let mut globals = GlobalSection::new();
		let mut exports = ExportSection::new();
		let mut code = CodeSection::new();

		for (index, &node) in global_nodes.iter().enumerate()
		{
			let variable = self.global_variable(node)?;
			self.globals.insert(variable, index as u32);
			let record = self.symbols.variable(variable);
			let val_type = val_type(&record.data_type).ok_or_else(|| {
				anyhow!(
					"global \"{}\" has a type that cannot back a Wasm global",
					record.name
				)
			})?;
			let mutable = !record.flags.contains(VariableFlag::Const);
			let init = self.global_initializer(node, &record.data_type)?;
			globals.global(
				GlobalType {
					val_type,
					mutable,
				},
				&init,
			);
			if record.flags.contains(VariableFlag::Export)
			{
				exports.export(
					&record.name,
					ExportKind::Global,
					index as u32,
				);
			}
		}

		for (index, &node) in function_nodes.iter().enumerate()
		{
			let id = self.function_id(node, program_scope)?;
			let record = self.symbols.function(id);
			let mut parameter_types = Vec::new();
			for &parameter in &record.parameters
			{
				let data_type =
					&self.symbols.variable(parameter).data_type;
				parameter_types.push(val_type(data_type).ok_or_else(
					|| {
						anyhow!(
							"parameter of \"{}\" has an unrepresentable type",
							record.name
						)
					},
				)?);
			}
			let result_types = match &record.return_type
			{
				DataType::Void => Vec::new(),
				other => vec![val_type(other).ok_or_else(|| {
					anyhow!(
						"return type of \"{}\" is unrepresentable",
						record.name
					)
				})?],
			};
			types.function(parameter_types, result_types);
			functions.function(index as u32);
			if record.is_export
			{
				exports.export(&record.name, ExportKind::Func, index as u32);
			}
			let body = self.function_body(node, id)?;
			code.function(&body);
		}

		let memory_pages = self.memory_pages();

		let mut module = Module::new();
		module.section(&types);
		module.section(&functions);
		if let Some(pages) = memory_pages
		{
			let mut memory = MemorySection::new();
			memory.memory(MemoryType {
				minimum: u64::from(pages),
				maximum: None,
				memory64: false,
				shared: false,
			});
			module.section(&memory);
			exports.export("memory", ExportKind::Memory, 0);
		}
		module.section(&globals);
		module.section(&exports);
		module.section(&code);
		Ok(module.finish())
	}

	fn function_id(
		&self,
		node: NodeId,
		program_scope: ScopeId,
	) -> Result<FnId, anyhow::Error>
	{
		let name = self
			.tree
			.child(node, 0)
			.map(|id| self.tree[id].token.text.as_str())
			.unwrap_or("");
		self.symbols
			.get_function(program_scope, name)
			.ok_or_else(|| anyhow!("undeclared function \"{}\"", name))
	}

	fn global_variable(&self, node: NodeId)
		-> Result<VarId, anyhow::Error>
	{
		let definition = self
			.tree
			.child(node, 0)
			.ok_or_else(|| anyhow!("malformed global"))?;
		let name = self
			.tree
			.child(definition, 0)
			.map(|id| self.tree[id].token.text.as_str())
			.unwrap_or("");
		let scope = self.tree[definition]
			.scope
			.ok_or_else(|| anyhow!("the tree has not been analyzed"))?;
		self.symbols
			.get_variable(scope, name)
			.ok_or_else(|| anyhow!("undeclared global \"{}\"", name))
	}

	/// Globals are initialized from literal (possibly negated) initializers.
	fn global_initializer(
		&self,
		node: NodeId,
		data_type: &DataType,
	) -> Result<ConstExpr, anyhow::Error>
	{
		let value = self
			.tree
			.child(node, 1)
			.ok_or_else(|| anyhow!("malformed global"))?;
		let (literal, negated) = match self.tree[value].kind
		{
			NodeKind::Literal => (value, false),
			NodeKind::UnaryOp
				if self.tree[value].token.kind == TokenKind::Minus =>
			{
				match self.tree.child(value, 0)
				{
					Some(inner)
						if self.tree[inner].kind == NodeKind::Literal =>
					{
						(inner, true)
					}
					_ =>
					{
						return Err(anyhow!(
							"global initializers must be literals {}",
							self.tree[value].location.format()
						));
					}
				}
			}
			_ =>
			{
				return Err(anyhow!(
					"global initializers must be literals {}",
					self.tree[value].location.format()
				));
			}
		};
		let text = &self.tree[literal].token.text;
		let sign = if negated { -1.0 } else { 1.0 };
		match data_type
		{
			DataType::Int | DataType::Bool =>
			{
				let value = parse_i32(text)?;
				Ok(ConstExpr::i32_const(if negated { -value } else { value }))
			}
			DataType::Uint =>
			{
				Ok(ConstExpr::i32_const(parse_u32(text)? as i32))
			}
			DataType::Long =>
			{
				let value = parse_i64(text)?;
				Ok(ConstExpr::i64_const(if negated { -value } else { value }))
			}
			DataType::Ulong =>
			{
				Ok(ConstExpr::i64_const(parse_u64(text)? as i64))
			}
			DataType::Float =>
			{
				Ok(ConstExpr::f32_const(sign as f32 * text.parse::<f32>()?))
			}
			DataType::Double =>
			{
				Ok(ConstExpr::f64_const(sign * text.parse::<f64>()?))
			}
			other => Err(anyhow!(
				"global initializers of type {} are unsupported",
				other
			)),
		}
	}

	/// One linear memory if anything in the program touches it: a mapped
	/// region or a memory intrinsic.
	fn memory_pages(&self) -> Option<u32>
	{
		let mut touched = false;
		let mut end = 0;
		for id in self.tree.ids()
		{
			match self.tree[id].kind
			{
				NodeKind::Map =>
				{
					touched = true;
					if let Some(reach) = self.mapped_end(id)
					{
						end = end.max(reach);
					}
				}
				NodeKind::FunctionCall =>
				{
					if let Some((name, true)) = self.callee_of(id)
					{
						if name.starts_with("load")
							|| name.starts_with("store")
						{
							touched = true;
						}
					}
				}
				_ => (),
			}
		}
		if touched
		{
			Some((end / PAGE_SIZE + 1).max(1))
		}
		else
		{
			None
		}
	}

	fn mapped_end(&self, node: NodeId) -> Option<u32>
	{
		let definition = self.tree.child(node, 0)?;
		let name = self
			.tree
			.child(definition, 0)
			.map(|id| self.tree[id].token.text.as_str())?;
		let scope = self.tree[definition].scope?;
		let variable = self.symbols.get_variable(scope, name)?;
		let record = self.symbols.variable(variable);
		let size = self.silent_size(&record.data_type, scope, 0);
		Some(record.offset + size)
	}

	fn silent_size(
		&self,
		data_type: &DataType,
		scope: ScopeId,
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
				match self.symbols.get_structure(scope, name)
				{
					Some(id) =>
					{
						let mut size = 0;
						for &field in &self.symbols.structure(id).fields
						{
							let field_type =
								&self.symbols.variable(field).data_type;
							size += self.silent_size(
								field_type,
								scope,
								depth + 1,
							);
						}
						size
					}
					None => 0,
				}
			}
			primitive => primitive.size_in_bytes(),
		}
	}

	/// The name of a call's innermost callee, and whether it is a builtin.
	fn callee_of(&self, node: NodeId) -> Option<(&str, bool)>
	{
		let callee = self.tree.child(node, 0)?;
		let identifier = inner_identifier(self.tree, callee)?;
		let scope = self.tree[identifier].scope?;
		let name = self.tree[identifier].token.text.as_str();
		let function = self.symbols.get_function(scope, name)?;
		let is_builtin = self.symbols.function(function).node.is_none();
		Some((name, is_builtin))
	}

	fn function_body(
		&mut self,
		node: NodeId,
		id: FnId,
	) -> Result<Function, anyhow::Error>
	{
		self.locals.clear();
		self.depth = 0;
		self.loops.clear();
		let record = self.symbols.function(id);
		let return_type = record.return_type.clone();
		for (index, &parameter) in record.parameters.iter().enumerate()
		{
			self.locals.insert(parameter, index as u32);
		}
		let body = self
			.tree
			.child(node, 2)
			.ok_or_else(|| anyhow!("malformed function"))?;
		let mut local_types = Vec::new();
		let mut next_index = record.parameters.len() as u32;
		self.collect_locals(body, &mut local_types, &mut next_index)?;
		let mut function = Function::new(local_types);
		let statements = self.tree[body].children.clone();
		for statement in statements
		{
			self.statement(statement, &mut function)?;
		}
		if return_type != DataType::Void
		{
			// The analyzer only warns about fall-through, so pad the end.
			function.instruction(&Instruction::Unreachable);
		}
		function.instruction(&Instruction::End);
		Ok(function)
	}

	fn collect_locals(
		&mut self,
		node: NodeId,
		local_types: &mut Vec<(u32, ValType)>,
		next_index: &mut u32,
	) -> Result<(), anyhow::Error>
	{
		if self.tree[node].kind == NodeKind::VariableDef
		{
			let name = self
				.tree
				.child(node, 0)
				.map(|id| self.tree[id].token.text.as_str())
				.unwrap_or("");
			let scope = self.tree[node]
				.scope
				.ok_or_else(|| anyhow!("the tree has not been analyzed"))?;
			if let Some(variable) = self.symbols.local_variable(scope, name)
			{
				let data_type =
					&self.symbols.variable(variable).data_type;
				let val_type = val_type(data_type).ok_or_else(|| {
					anyhow!(
						"local \"{}\" of type {} is unsupported {}",
						name,
						data_type,
						self.tree[node].location.format()
					)
				})?;
				if !self.locals.contains_key(&variable)
				{
					self.locals.insert(variable, *next_index);
					*next_index += 1;
					local_types.push((1, val_type));
				}
			}
		}
		for &child in &self.tree[node].children
		{
			self.collect_locals(child, local_types, next_index)?;
		}
		Ok(())
	}

	fn statement(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		match self.tree[node].kind
		{
			NodeKind::VariableDef => Ok(()),
			NodeKind::Assignment => self.assignment(node, function),
			NodeKind::Return =>
			{
				let value = self
					.tree
					.child(node, 0)
					.ok_or_else(|| anyhow!("malformed return"))?;
				self.expression(value, function)?;
				function.instruction(&Instruction::Return);
				Ok(())
			}
			NodeKind::ReturnVoid =>
			{
				function.instruction(&Instruction::Return);
				Ok(())
			}
			NodeKind::If => self.if_statement(node, function),
			NodeKind::While => self.while_statement(node, function),
			NodeKind::Break =>
			{
				let target = self
					.loops
					.last()
					.ok_or_else(|| anyhow!("break outside of a loop"))?;
				function.instruction(&Instruction::Br(
					self.depth - target.break_depth,
				));
				Ok(())
			}
			NodeKind::Continue =>
			{
				let target = self
					.loops
					.last()
					.ok_or_else(|| anyhow!("continue outside of a loop"))?;
				function.instruction(&Instruction::Br(
					self.depth - target.continue_depth,
				));
				Ok(())
			}
			NodeKind::Block =>
			{
				let statements = self.tree[node].children.clone();
				for statement in statements
				{
					self.statement(statement, function)?;
				}
				Ok(())
			}
			_ =>
			{
				self.expression(node, function)?;
				let discards = match &self.tree[node].data_type
				{
					Some(DataType::Void) => false,
					Some(_) => true,
					None => false,
				};
				if discards
				{
					function.instruction(&Instruction::Drop);
				}
				Ok(())
			}
		}
	}

	fn if_statement(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let condition = self
			.tree
			.child(node, 0)
			.ok_or_else(|| anyhow!("malformed if"))?;
		self.expression(condition, function)?;
		function.instruction(&Instruction::If(BlockType::Empty));
		self.depth += 1;
		if let Some(then_branch) = self.tree.child(node, 1)
		{
			self.statement(then_branch, function)?;
		}
		if let Some(else_branch) = self.tree.child(node, 2)
		{
			function.instruction(&Instruction::Else);
			self.statement(else_branch, function)?;
		}
		function.instruction(&Instruction::End);
		self.depth -= 1;
		Ok(())
	}

	fn while_statement(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let condition = self
			.tree
			.child(node, 0)
			.ok_or_else(|| anyhow!("malformed while"))?;
		function.instruction(&Instruction::Block(BlockType::Empty));
		self.depth += 1;
		let break_depth = self.depth;
		function.instruction(&Instruction::Loop(BlockType::Empty));
		self.depth += 1;
		let continue_depth = self.depth;
		self.loops.push(LoopLabels {
			break_depth,
			continue_depth,
		});
		self.expression(condition, function)?;
		function.instruction(&Instruction::I32Eqz);
		function.instruction(&Instruction::BrIf(1));
		if let Some(body) = self.tree.child(node, 1)
		{
			self.statement(body, function)?;
		}
		function.instruction(&Instruction::Br(0));
		function.instruction(&Instruction::End);
		self.depth -= 1;
		function.instruction(&Instruction::End);
		self.depth -= 1;
		self.loops.pop();
		Ok(())
	}

	fn assignment(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let (target, value) = match (
			self.tree.child(node, 0),
			self.tree.child(node, 1),
		)
		{
			(Some(target), Some(value)) => (target, value),
			_ => return Err(anyhow!("malformed assignment")),
		};
		let variable = self.target_variable(target)?;
		let record = self.symbols.variable(variable);
		let flags = record.flags;
		let offset = record.offset;
		let data_type = record.data_type.clone();
		let name = record.name.clone();
		if flags.contains(VariableFlag::Mapped)
		{
			function.instruction(&Instruction::I32Const(offset as i32));
			self.expression(value, function)?;
			let store = store_instruction(&data_type).ok_or_else(|| {
				anyhow!("cannot store a value of type {}", data_type)
			})?;
			function.instruction(&store);
		}
		else if let Some(&index) = self.locals.get(&variable)
		{
			self.expression(value, function)?;
			function.instruction(&Instruction::LocalSet(index));
		}
		else if let Some(&index) = self.globals.get(&variable)
		{
			self.expression(value, function)?;
			function.instruction(&Instruction::GlobalSet(index));
		}
		else
		{
			return Err(anyhow!(
				"cannot address variable \"{}\" {}",
				name,
				self.tree[target].location.format()
			));
		}
		Ok(())
	}

	fn target_variable(&self, target: NodeId)
		-> Result<VarId, anyhow::Error>
	{
		let identifier = match self.tree[target].kind
		{
			NodeKind::VariableDef => self.tree.child(target, 0),
			_ => inner_identifier(self.tree, target),
		};
		let identifier = identifier
			.ok_or_else(|| anyhow!("malformed assignment target"))?;
		let scope = self.tree[identifier]
			.scope
			.ok_or_else(|| anyhow!("the tree has not been analyzed"))?;
		let name = self.tree[identifier].token.text.as_str();
		self.symbols
			.get_variable(scope, name)
			.ok_or_else(|| anyhow!("undeclared variable \"{}\"", name))
	}

	fn expression(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		match self.tree[node].kind
		{
			NodeKind::Literal =>
			{
				let instruction = literal_instruction(
					self.tree[node].token.kind,
					&self.tree[node].token.text,
				)?;
				function.instruction(&instruction);
				Ok(())
			}
			NodeKind::VariableId | NodeKind::Access =>
			{
				let identifier = match self.tree[node].kind
				{
					NodeKind::Access => inner_identifier(self.tree, node)
						.ok_or_else(|| anyhow!("malformed access"))?,
					_ => node,
				};
				let scope = self.tree[identifier].scope.ok_or_else(|| {
					anyhow!("the tree has not been analyzed")
				})?;
				let name = self.tree[identifier].token.text.as_str();
				let variable = self
					.symbols
					.get_variable(scope, name)
					.ok_or_else(|| {
						anyhow!("undeclared variable \"{}\"", name)
					})?;
				self.variable_get(variable, function)
			}
			NodeKind::UnaryOp => self.unary(node, function),
			NodeKind::BinaryOp => self.binary(node, function),
			NodeKind::FunctionCall => self.call(node, function),
			other => Err(anyhow!(
				"cannot generate code for {:?} {}",
				other,
				self.tree[node].location.format()
			)),
		}
	}

	fn variable_get(
		&self,
		variable: VarId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let record = self.symbols.variable(variable);
		if record.flags.contains(VariableFlag::Mapped)
		{
			function
				.instruction(&Instruction::I32Const(record.offset as i32));
			let load = load_instruction(&record.data_type).ok_or_else(
				|| anyhow!("cannot load a value of type {}", record.data_type),
			)?;
			function.instruction(&load);
		}
		else if let Some(&index) = self.locals.get(&variable)
		{
			function.instruction(&Instruction::LocalGet(index));
		}
		else if let Some(&index) = self.globals.get(&variable)
		{
			function.instruction(&Instruction::GlobalGet(index));
		}
		else
		{
			return Err(anyhow!(
				"cannot address variable \"{}\"",
				record.name
			));
		}
		Ok(())
	}

	fn unary(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let operand = self
			.tree
			.child(node, 0)
			.ok_or_else(|| anyhow!("malformed unary operator"))?;
		let operand_type = self.tree[operand]
			.data_type
			.clone()
			.unwrap_or(DataType::Invalid);
		match self.tree[node].token.kind
		{
			TokenKind::Minus => match operand_type
			{
				DataType::Int =>
				{
					function.instruction(&Instruction::I32Const(0));
					self.expression(operand, function)?;
					function.instruction(&Instruction::I32Sub);
				}
				DataType::Long =>
				{
					function.instruction(&Instruction::I64Const(0));
					self.expression(operand, function)?;
					function.instruction(&Instruction::I64Sub);
				}
				DataType::Float =>
				{
					self.expression(operand, function)?;
					function.instruction(&Instruction::F32Neg);
				}
				DataType::Double =>
				{
					self.expression(operand, function)?;
					function.instruction(&Instruction::F64Neg);
				}
				other =>
				{
					return Err(anyhow!("cannot negate {}", other));
				}
			},
			TokenKind::Tilde => match operand_type
			{
				DataType::Int | DataType::Uint =>
				{
					self.expression(operand, function)?;
					function.instruction(&Instruction::I32Const(-1));
					function.instruction(&Instruction::I32Xor);
				}
				DataType::Long | DataType::Ulong =>
				{
					self.expression(operand, function)?;
					function.instruction(&Instruction::I64Const(-1));
					function.instruction(&Instruction::I64Xor);
				}
				other =>
				{
					return Err(anyhow!("cannot complement {}", other));
				}
			},
			TokenKind::Not =>
			{
				self.expression(operand, function)?;
				function.instruction(&Instruction::I32Eqz);
			}
			other =>
			{
				return Err(anyhow!("unknown unary operator {:?}", other));
			}
		}
		Ok(())
	}

	fn binary(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let op = self.tree[node].token.kind;
		let (left, right) = match (
			self.tree.child(node, 0),
			self.tree.child(node, 1),
		)
		{
			(Some(left), Some(right)) => (left, right),
			_ => return Err(anyhow!("malformed binary operator")),
		};
		if op == TokenKind::As || op == TokenKind::To
		{
			self.expression(left, function)?;
			let from = self.tree[left]
				.data_type
				.clone()
				.unwrap_or(DataType::Invalid);
			let to = DataType::from_annotation(
				&self.tree[right].token.text,
			);
			if let Some(instruction) = cast_instruction(&from, &to)
			{
				function.instruction(&instruction);
			}
			return Ok(());
		}
		self.expression(left, function)?;
		self.expression(right, function)?;
		let operand_type = self.tree[left]
			.data_type
			.clone()
			.unwrap_or(DataType::Invalid);
		let instruction =
			binary_instruction(op, &operand_type).ok_or_else(|| {
				anyhow!(
					"no instruction for operator '{}' on {}",
					self.tree[node].token.text,
					operand_type
				)
			})?;
		function.instruction(&instruction);
		Ok(())
	}

	fn call(
		&mut self,
		node: NodeId,
		function: &mut Function,
	) -> Result<(), anyhow::Error>
	{
		let (callee, arguments) = match (
			self.tree.child(node, 0),
			self.tree.child(node, 1),
		)
		{
			(Some(callee), Some(arguments)) => (callee, arguments),
			_ => return Err(anyhow!("malformed call")),
		};
		let identifier = inner_identifier(self.tree, callee)
			.ok_or_else(|| anyhow!("malformed callee"))?;
		let scope = self.tree[identifier]
			.scope
			.ok_or_else(|| anyhow!("the tree has not been analyzed"))?;
		let name = self.tree[identifier].token.text.as_str();
		let id = self
			.symbols
			.get_function(scope, name)
			.ok_or_else(|| anyhow!("undeclared function \"{}\"", name))?;
		let argument_nodes = self.tree[arguments].children.clone();
		for argument in argument_nodes
		{
			self.expression(argument, function)?;
		}
		let record = self.symbols.function(id);
		if record.node.is_some()
		{
			let index = self.functions.get(&id).ok_or_else(|| {
				anyhow!("function \"{}\" was not laid out", record.name)
			})?;
			function.instruction(&Instruction::Call(*index));
			return Ok(());
		}
		// Builtins lower to single instructions, keyed by their full path.
		let path = self.symbols.path(record.scope, &record.name);
		for instruction in builtin_instructions(&path)
			.ok_or_else(|| anyhow!("unknown builtin \"{}\"", path))?
		{
			function.instruction(&instruction);
		}
		Ok(())
	}
}

/// Finds the node behind any modifier wrappers.
fn unwrapped(tree: &Tree, node: NodeId) -> NodeId
{
	match tree[node].kind
	{
		NodeKind::Export | NodeKind::Const => match tree.child(node, 0)
		{
			Some(inner) => unwrapped(tree, inner),
			None => node,
		},
		_ => node,
	}
}

fn inner_identifier(tree: &Tree, node: NodeId) -> Option<NodeId>
{
	let mut current = node;
	loop
	{
		match tree[current].kind
		{
			NodeKind::Access => current = tree.child(current, 1)?,
			NodeKind::VariableDef => current = tree.child(current, 0)?,
			NodeKind::VariableId | NodeKind::FunctionId =>
			{
				return Some(current)
			}
			_ => return None,
		}
	}
}

fn val_type(data_type: &DataType) -> Option<ValType>
{
	match data_type
	{
		DataType::Int | DataType::Uint | DataType::Bool => Some(ValType::I32),
		DataType::Long | DataType::Ulong => Some(ValType::I64),
		DataType::Float => Some(ValType::F32),
		DataType::Double => Some(ValType::F64),
		_ => None,
	}
}

fn parse_i32(text: &str) -> Result<i32, anyhow::Error>
{
	match text.strip_prefix("0x")
	{
		Some(hex) => Ok(u32::from_str_radix(hex, 16)? as i32),
		None => Ok(text.parse()?),
	}
}

fn parse_u32(text: &str) -> Result<u32, anyhow::Error>
{
	match text.strip_prefix("0x")
	{
		Some(hex) => Ok(u32::from_str_radix(hex, 16)?),
		None => Ok(text.parse()?),
	}
}

fn parse_i64(text: &str) -> Result<i64, anyhow::Error>
{
	match text.strip_prefix("0x")
	{
		Some(hex) => Ok(u64::from_str_radix(hex, 16)? as i64),
		None => Ok(text.parse()?),
	}
}

fn parse_u64(text: &str) -> Result<u64, anyhow::Error>
{
	match text.strip_prefix("0x")
	{
		Some(hex) => Ok(u64::from_str_radix(hex, 16)?),
		None => Ok(text.parse()?),
	}
}

fn literal_instruction(
	kind: TokenKind,
	text: &str,
) -> Result<Instruction<'static>, anyhow::Error>
{
	match kind
	{
		TokenKind::Int => Ok(Instruction::I32Const(parse_i32(text)?)),
		TokenKind::Uint =>
		{
			Ok(Instruction::I32Const(parse_u32(text)? as i32))
		}
		TokenKind::Long => Ok(Instruction::I64Const(parse_i64(text)?)),
		TokenKind::Ulong =>
		{
			Ok(Instruction::I64Const(parse_u64(text)? as i64))
		}
		TokenKind::Float => Ok(Instruction::F32Const(text.parse()?)),
		TokenKind::Double => Ok(Instruction::F64Const(text.parse()?)),
		TokenKind::Bool =>
		{
			Ok(Instruction::I32Const((text == "true") as i32))
		}
		other => Err(anyhow!("not a literal token: {:?}", other)),
	}
}

fn mem_arg(align: u32) -> MemArg
{
	MemArg {
		offset: 0,
		align,
		memory_index: 0,
	}
}

fn load_instruction(data_type: &DataType) -> Option<Instruction<'static>>
{
	match data_type
	{
		DataType::Int | DataType::Uint | DataType::Bool =>
		{
			Some(Instruction::I32Load(mem_arg(2)))
		}
		DataType::Long | DataType::Ulong =>
		{
			Some(Instruction::I64Load(mem_arg(3)))
		}
		DataType::Float => Some(Instruction::F32Load(mem_arg(2))),
		DataType::Double => Some(Instruction::F64Load(mem_arg(3))),
		_ => None,
	}
}

fn store_instruction(data_type: &DataType) -> Option<Instruction<'static>>
{
	match data_type
	{
		DataType::Int | DataType::Uint | DataType::Bool =>
		{
			Some(Instruction::I32Store(mem_arg(2)))
		}
		DataType::Long | DataType::Ulong =>
		{
			Some(Instruction::I64Store(mem_arg(3)))
		}
		DataType::Float => Some(Instruction::F32Store(mem_arg(2))),
		DataType::Double => Some(Instruction::F64Store(mem_arg(3))),
		_ => None,
	}
}

fn binary_instruction(
	op: TokenKind,
	operand: &DataType,
) -> Option<Instruction<'static>>
{
	use DataType::{Bool, Double, Float, Int, Long, Uint, Ulong};
	use Instruction as I;
	let instruction = match (op, operand)
	{
		(TokenKind::Plus, Int | Uint) => I::I32Add,
		(TokenKind::Plus, Long | Ulong) => I::I64Add,
		(TokenKind::Plus, Float) => I::F32Add,
		(TokenKind::Plus, Double) => I::F64Add,
		(TokenKind::Minus, Int | Uint) => I::I32Sub,
		(TokenKind::Minus, Long | Ulong) => I::I64Sub,
		(TokenKind::Minus, Float) => I::F32Sub,
		(TokenKind::Minus, Double) => I::F64Sub,
		(TokenKind::Times, Int | Uint) => I::I32Mul,
		(TokenKind::Times, Long | Ulong) => I::I64Mul,
		(TokenKind::Times, Float) => I::F32Mul,
		(TokenKind::Times, Double) => I::F64Mul,
		(TokenKind::Divide, Int) => I::I32DivS,
		(TokenKind::Divide, Uint) => I::I32DivU,
		(TokenKind::Divide, Long) => I::I64DivS,
		(TokenKind::Divide, Ulong) => I::I64DivU,
		(TokenKind::Divide, Float) => I::F32Div,
		(TokenKind::Divide, Double) => I::F64Div,
		(TokenKind::Modulo, Int) => I::I32RemS,
		(TokenKind::Modulo, Uint) => I::I32RemU,
		(TokenKind::Modulo, Long) => I::I64RemS,
		(TokenKind::Modulo, Ulong) => I::I64RemU,
		(TokenKind::Ampersand, Int | Uint) => I::I32And,
		(TokenKind::Ampersand, Long | Ulong) => I::I64And,
		(TokenKind::Pipe, Int | Uint) => I::I32Or,
		(TokenKind::Pipe, Long | Ulong) => I::I64Or,
		(TokenKind::Caret, Int | Uint) => I::I32Xor,
		(TokenKind::Caret, Long | Ulong) => I::I64Xor,
		(TokenKind::ShiftLeft, Int | Uint) => I::I32Shl,
		(TokenKind::ShiftLeft, Long | Ulong) => I::I64Shl,
		(TokenKind::ShiftRight, Int) => I::I32ShrS,
		(TokenKind::ShiftRight, Uint) => I::I32ShrU,
		(TokenKind::ShiftRight, Long) => I::I64ShrS,
		(TokenKind::ShiftRight, Ulong) => I::I64ShrU,
		(TokenKind::RotateLeft, Int | Uint) => I::I32Rotl,
		(TokenKind::RotateLeft, Long | Ulong) => I::I64Rotl,
		(TokenKind::RotateRight, Int | Uint) => I::I32Rotr,
		(TokenKind::RotateRight, Long | Ulong) => I::I64Rotr,
		(TokenKind::Equals, Int | Uint | Bool) => I::I32Eq,
		(TokenKind::Equals, Long | Ulong) => I::I64Eq,
		(TokenKind::Equals, Float) => I::F32Eq,
		(TokenKind::Equals, Double) => I::F64Eq,
		(TokenKind::NotEquals, Int | Uint | Bool) => I::I32Ne,
		(TokenKind::NotEquals, Long | Ulong) => I::I64Ne,
		(TokenKind::NotEquals, Float) => I::F32Ne,
		(TokenKind::NotEquals, Double) => I::F64Ne,
		(TokenKind::Less, Int) => I::I32LtS,
		(TokenKind::Less, Uint) => I::I32LtU,
		(TokenKind::Less, Long) => I::I64LtS,
		(TokenKind::Less, Ulong) => I::I64LtU,
		(TokenKind::Less, Float) => I::F32Lt,
		(TokenKind::Less, Double) => I::F64Lt,
		(TokenKind::LessEquals, Int) => I::I32LeS,
		(TokenKind::LessEquals, Uint) => I::I32LeU,
		(TokenKind::LessEquals, Long) => I::I64LeS,
		(TokenKind::LessEquals, Ulong) => I::I64LeU,
		(TokenKind::LessEquals, Float) => I::F32Le,
		(TokenKind::LessEquals, Double) => I::F64Le,
		(TokenKind::Greater, Int) => I::I32GtS,
		(TokenKind::Greater, Uint) => I::I32GtU,
		(TokenKind::Greater, Long) => I::I64GtS,
		(TokenKind::Greater, Ulong) => I::I64GtU,
		(TokenKind::Greater, Float) => I::F32Gt,
		(TokenKind::Greater, Double) => I::F64Gt,
		(TokenKind::GreaterEquals, Int) => I::I32GeS,
		(TokenKind::GreaterEquals, Uint) => I::I32GeU,
		(TokenKind::GreaterEquals, Long) => I::I64GeS,
		(TokenKind::GreaterEquals, Ulong) => I::I64GeU,
		(TokenKind::GreaterEquals, Float) => I::F32Ge,
		(TokenKind::GreaterEquals, Double) => I::F64Ge,
		// No short-circuit evaluation: logical operators are plain bitwise
		// operations on the i32 backing of bool.
		(TokenKind::AndAnd, Bool) => I::I32And,
		(TokenKind::OrOr, Bool) => I::I32Or,
		_ => return None,
	};
	Some(instruction)
}

/// Conversion instruction for a cast, or `None` when the representation is
/// already the same (the sign-only casts).
fn cast_instruction(
	from: &DataType,
	to: &DataType,
) -> Option<Instruction<'static>>
{
	use DataType::{Double, Float, Int, Long, Uint, Ulong};
	use Instruction as I;
	let instruction = match (from, to)
	{
		// Value casts within the 32-bit class.
		(Int, Uint) | (Uint, Int) => return None,
		(Int, Float) => I::F32ConvertI32S,
		(Uint, Float) => I::F32ConvertI32U,
		(Float, Int) => I::I32TruncF32S,
		(Float, Uint) => I::I32TruncF32U,
		// Value casts within the 64-bit class.
		(Long, Ulong) | (Ulong, Long) => return None,
		(Long, Double) => I::F64ConvertI64S,
		(Ulong, Double) => I::F64ConvertI64U,
		(Double, Long) => I::I64TruncF64S,
		(Double, Ulong) => I::I64TruncF64U,
		// Widening and narrowing casts across the classes.
		(Int, Long) | (Int, Ulong) => I::I64ExtendI32S,
		(Uint, Long) | (Uint, Ulong) => I::I64ExtendI32U,
		(Long, Int) | (Long, Uint) | (Ulong, Int) | (Ulong, Uint) =>
		{
			I::I32WrapI64
		}
		(Float, Double) => I::F64PromoteF32,
		(Double, Float) => I::F32DemoteF64,
		(Int, Double) => I::F64ConvertI32S,
		(Uint, Double) => I::F64ConvertI32U,
		(Double, Int) => I::I32TruncF64S,
		(Double, Uint) => I::I32TruncF64U,
		(Float, Long) => I::I64TruncF32S,
		(Float, Ulong) => I::I64TruncF32U,
		(Long, Float) => I::F32ConvertI64S,
		(Ulong, Float) => I::F32ConvertI64U,
		_ => return None,
	};
	Some(instruction)
}

/// The instruction sequence a builtin call lowers to.
fn builtin_instructions(path: &str)
	-> Option<Vec<Instruction<'static>>>
{
	use Instruction as I;
	let instructions = match path
	{
		"nop" => vec![I::Nop],
		"int.load" | "uint.load" => vec![I::I32Load(mem_arg(2))],
		"long.load" | "ulong.load" => vec![I::I64Load(mem_arg(3))],
		"float.load" => vec![I::F32Load(mem_arg(2))],
		"double.load" => vec![I::F64Load(mem_arg(3))],
		"int.store" | "uint.store" => vec![I::I32Store(mem_arg(2))],
		"long.store" | "ulong.store" => vec![I::I64Store(mem_arg(3))],
		"float.store" => vec![I::F32Store(mem_arg(2))],
		"double.store" => vec![I::F64Store(mem_arg(3))],
		"int.loadSByte" | "uint.loadSByte" =>
		{
			vec![I::I32Load8S(mem_arg(0))]
		}
		"int.loadByte" | "uint.loadByte" => vec![I::I32Load8U(mem_arg(0))],
		"int.loadShort" | "uint.loadShort" =>
		{
			vec![I::I32Load16S(mem_arg(1))]
		}
		"int.loadUShort" | "uint.loadUShort" =>
		{
			vec![I::I32Load16U(mem_arg(1))]
		}
		"int.storeSByte" | "uint.storeSByte" | "int.storeByte"
		| "uint.storeByte" => vec![I::I32Store8(mem_arg(0))],
		"int.storeShort" | "uint.storeShort" | "int.storeUShort"
		| "uint.storeUShort" => vec![I::I32Store16(mem_arg(1))],
		"long.loadSByte" | "ulong.loadSByte" =>
		{
			vec![I::I64Load8S(mem_arg(0))]
		}
		"long.loadByte" | "ulong.loadByte" =>
		{
			vec![I::I64Load8U(mem_arg(0))]
		}
		"long.loadShort" | "ulong.loadShort" =>
		{
			vec![I::I64Load16S(mem_arg(1))]
		}
		"long.loadUShort" | "ulong.loadUShort" =>
		{
			vec![I::I64Load16U(mem_arg(1))]
		}
		"long.loadInt" | "ulong.loadInt" => vec![I::I64Load32S(mem_arg(2))],
		"long.loadUInt" | "ulong.loadUInt" =>
		{
			vec![I::I64Load32U(mem_arg(2))]
		}
		"long.storeSByte" | "ulong.storeSByte" | "long.storeByte"
		| "ulong.storeByte" => vec![I::I64Store8(mem_arg(0))],
		"long.storeShort" | "ulong.storeShort" | "long.storeUShort"
		| "ulong.storeUShort" => vec![I::I64Store16(mem_arg(1))],
		"long.storeInt" | "ulong.storeInt" | "long.storeUInt"
		| "ulong.storeUInt" => vec![I::I64Store32(mem_arg(2))],
		"int.clz" | "uint.clz" => vec![I::I32Clz],
		"int.ctz" | "uint.ctz" => vec![I::I32Ctz],
		"int.popcnt" | "uint.popcnt" => vec![I::I32Popcnt],
		"int.eqz" | "uint.eqz" => vec![I::I32Eqz],
		"long.clz" | "ulong.clz" => vec![I::I64Clz],
		"long.ctz" | "ulong.ctz" => vec![I::I64Ctz],
		"long.popcnt" | "ulong.popcnt" => vec![I::I64Popcnt],
		// Wasm's 64-bit eqz produces an i32, so widen it back.
		"long.eqz" | "ulong.eqz" => vec![I::I64Eqz, I::I64ExtendI32U],
		"float.abs" => vec![I::F32Abs],
		"float.ceil" => vec![I::F32Ceil],
		"float.floor" => vec![I::F32Floor],
		"float.truncate" => vec![I::F32Trunc],
		"float.round" => vec![I::F32Nearest],
		"float.sqrt" => vec![I::F32Sqrt],
		"float.copysign" => vec![I::F32Copysign],
		"float.min" => vec![I::F32Min],
		"float.max" => vec![I::F32Max],
		"double.abs" => vec![I::F64Abs],
		"double.ceil" => vec![I::F64Ceil],
		"double.floor" => vec![I::F64Floor],
		"double.truncate" => vec![I::F64Trunc],
		"double.round" => vec![I::F64Nearest],
		"double.sqrt" => vec![I::F64Sqrt],
		"double.copysign" => vec![I::F64Copysign],
		"double.min" => vec![I::F64Min],
		"double.max" => vec![I::F64Max],
		_ => return None,
	};
	Some(instructions)
}
