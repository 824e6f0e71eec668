//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The parser turns the token stream into the homogeneous syntax tree.
//! It recovers from errors at statement granularity: a malformed line is
//! skipped up to and including its newline, and parsing continues, so that
//! one typo does not hide the rest of the diagnostics.

use crate::ast::{NodeId, NodeKind, Tree};
use crate::error::{Error, Errors};
use crate::lexer::{LexedToken, Location, Token, TokenKind};

pub fn parse(tokens: Vec<LexedToken>, source_filename: &str) -> (Tree, Errors)
{
	let start = Location {
		source_filename: source_filename.to_string(),
		line_number: 1,
		line_offset: 1,
		offset: 0,
		length: 1,
	};
	let mut parser = Parser {
		tokens: tokens.into_iter().peekable(),
		tree: Tree::new(),
		errors: Errors::new(),
		last_location: start.clone(),
	};
	let program = parser.tree.add(
		NodeKind::Program,
		Token {
			kind: TokenKind::Identifier,
			text: source_filename.to_string(),
		},
		start,
		None,
	);
	parser.parse_program(program);
	(parser.tree, parser.errors)
}

/// Marker for statement-level error recovery; the diagnostic itself has
/// already been recorded when this is returned.
struct Recovery;

type ParseResult<T> = Result<T, Recovery>;

struct Parser
{
	tokens: std::iter::Peekable<std::vec::IntoIter<LexedToken>>,
	tree: Tree,
	errors: Errors,
	last_location: Location,
}

impl Parser
{
	/// Peeks past lexical errors, recording them as diagnostics.
	fn peek(&mut self) -> Option<TokenKind>
	{
		loop
		{
			match self.tokens.peek()
			{
				Some(LexedToken {
					result: Ok(token), ..
				}) => return Some(token.kind),
				Some(LexedToken { result: Err(_), .. }) =>
				{
					let lexed = match self.tokens.next()
					{
						Some(lexed) => lexed,
						None => return None,
					};
					match lexed.result
					{
						Err(error) => self.errors.add(Error::Lexical {
							error,
							location: lexed.location,
						}),
						Ok(_) => (),
					}
				}
				None => return None,
			}
		}
	}

	fn pop(&mut self) -> Option<(Token, Location)>
	{
		loop
		{
			let lexed = self.tokens.next()?;
			self.last_location = lexed.location.clone();
			match lexed.result
			{
				Ok(token) => return Some((token, lexed.location)),
				Err(error) => self.errors.add(Error::Lexical {
					error,
					location: lexed.location,
				}),
			}
		}
	}

	fn expect(
		&mut self,
		kind: TokenKind,
		expectation: &str,
	) -> ParseResult<(Token, Location)>
	{
		match self.peek()
		{
			Some(found) if found == kind => match self.pop()
			{
				Some(popped) => Ok(popped),
				None => Err(Recovery),
			},
			Some(_) =>
			{
				let location = match self.pop()
				{
					Some((_, location)) => location,
					None => self.last_location.clone(),
				};
				self.errors.add(Error::UnexpectedToken {
					location,
					expectation: expectation.to_string(),
				});
				Err(Recovery)
			}
			None =>
			{
				self.errors.add(Error::UnexpectedEndOfFile {
					last_location: self.last_location.clone(),
					expectation: expectation.to_string(),
				});
				Err(Recovery)
			}
		}
	}

	fn unexpected(&mut self, expectation: &str) -> Recovery
	{
		match self.pop()
		{
			Some((_, location)) =>
			{
				self.errors.add(Error::UnexpectedToken {
					location,
					expectation: expectation.to_string(),
				});
			}
			None =>
			{
				self.errors.add(Error::UnexpectedEndOfFile {
					last_location: self.last_location.clone(),
					expectation: expectation.to_string(),
				});
			}
		}
		Recovery
	}

	/// Consumes tokens up to and including the next newline, balancing any
	/// blocks that open in between.
	fn skip_line(&mut self)
	{
		let mut depth = 0;
		while let Some((token, _)) = self.pop()
		{
			match token.kind
			{
				TokenKind::Indent => depth += 1,
				TokenKind::Dedent if depth > 0 => depth -= 1,
				TokenKind::Newline if depth == 0 => break,
				_ => (),
			}
		}
	}

	fn parse_program(&mut self, program: NodeId)
	{
		while self.peek().is_some()
		{
			match self.parse_top_level()
			{
				Ok(Some(statement)) =>
				{
					self.tree.adopt(program, statement);
				}
				Ok(None) => (),
				Err(Recovery) => self.skip_line(),
			}
		}
	}

	fn parse_top_level(&mut self) -> ParseResult<Option<NodeId>>
	{
		match self.peek()
		{
			Some(TokenKind::Newline) =>
			{
				self.pop();
				Ok(None)
			}
			Some(TokenKind::Struct) =>
			{
				self.parse_struct_definition().map(Some)
			}
			Some(TokenKind::Const) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let global = self.parse_global_definition()?;
				let node = self.tree.add(
					NodeKind::Const,
					token,
					location,
					None,
				);
				self.tree.adopt(node, global);
				Ok(Some(node))
			}
			Some(TokenKind::Export) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let definition = match self.parse_top_level()?
				{
					Some(definition) => definition,
					None =>
					{
						return Err(self.unexpected("a definition"));
					}
				};
				let node = self.tree.add(
					NodeKind::Export,
					token,
					location,
					None,
				);
				self.tree.adopt(node, definition);
				Ok(Some(node))
			}
			Some(TokenKind::Map) => self.parse_map_definition().map(Some),
			Some(TokenKind::Type) =>
			{
				let (type_token, type_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let (name, name_location) =
					self.expect(TokenKind::Identifier, "a name")?;
				self.parse_function_or_global(
					type_token,
					type_location,
					name,
					name_location,
				)
				.map(Some)
			}
			Some(TokenKind::Identifier) =>
			{
				self.parse_identifier_top_level().map(Some)
			}
			Some(_) => Err(self.unexpected("a definition")),
			None => Err(Recovery),
		}
	}

	/// A top-level line starting with an identifier: a definition with a
	/// struct type (`Point p = ...`), or an assignment to an earlier global
	/// (`x = ...`, `p.x = ...`).
	fn parse_identifier_top_level(&mut self) -> ParseResult<NodeId>
	{
		let (first, first_location) = match self.pop()
		{
			Some(popped) => popped,
			None => return Err(Recovery),
		};
		match self.peek()
		{
			Some(TokenKind::Identifier) =>
			{
				let (name, name_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				self.parse_function_or_global(
					first,
					first_location,
					name,
					name_location,
				)
			}
			Some(TokenKind::Assignment) | Some(TokenKind::Dot) =>
			{
				let first = self.tree.add(
					NodeKind::VariableId,
					first,
					first_location,
					None,
				);
				let target = self.parse_member_chain(first)?;
				let (assign, assign_location) =
					self.expect(TokenKind::Assignment, "'='")?;
				let value = self.parse_expression()?;
				self.expect(TokenKind::Newline, "end of line")?;
				let node = self.tree.add(
					NodeKind::Assignment,
					assign,
					assign_location,
					None,
				);
				self.tree.adopt(node, target);
				self.tree.adopt(node, value);
				Ok(node)
			}
			_ => Err(self.unexpected("a definition or an assignment")),
		}
	}

	/// Extends an already-built identifier node into a dotted access chain.
	fn parse_member_chain(&mut self, first: NodeId) -> ParseResult<NodeId>
	{
		let mut members = vec![first];
		while self.peek() == Some(TokenKind::Dot)
		{
			self.pop();
			let (member, member_location) =
				self.expect(TokenKind::Identifier, "a member name")?;
			members.push(self.tree.add(
				NodeKind::VariableId,
				member,
				member_location,
				None,
			));
		}
		let mut chain = match members.pop()
		{
			Some(node) => node,
			None => return Err(Recovery),
		};
		while let Some(node) = members.pop()
		{
			let access = self.tree.add(
				NodeKind::Access,
				Token {
					kind: TokenKind::Dot,
					text: ".".to_string(),
				},
				self.tree[node].location.clone(),
				None,
			);
			self.tree.adopt(access, node);
			self.tree.adopt(access, chain);
			chain = access;
		}
		Ok(chain)
	}

	fn parse_struct_definition(&mut self) -> ParseResult<NodeId>
	{
		self.expect(TokenKind::Struct, "'struct'")?;
		let (name, name_location) =
			self.expect(TokenKind::Identifier, "a struct name")?;
		let node = self.tree.add(
			NodeKind::StructDef,
			name.clone(),
			name_location.clone(),
			None,
		);
		let name_node = self.tree.add(
			NodeKind::StructId,
			name,
			name_location,
			None,
		);
		self.tree.adopt(node, name_node);
		self.expect(TokenKind::Newline, "end of line")?;
		let (indent, indent_location) =
			self.expect(TokenKind::Indent, "an indented field block")?;
		let fields = self.tree.add(
			NodeKind::Fields,
			indent,
			indent_location,
			None,
		);
		self.tree.adopt(node, fields);
		loop
		{
			match self.peek()
			{
				Some(TokenKind::Dedent) =>
				{
					self.pop();
					break;
				}
				Some(TokenKind::Newline) =>
				{
					self.pop();
				}
				Some(_) => match self.parse_field_line()
				{
					Ok(field) =>
					{
						self.tree.adopt(fields, field);
					}
					Err(Recovery) => self.skip_line(),
				},
				None => break,
			}
		}
		Ok(node)
	}

	fn parse_field_line(&mut self) -> ParseResult<NodeId>
	{
		let field = self.parse_variable_definition()?;
		self.expect(TokenKind::Newline, "end of line")?;
		Ok(field)
	}

	/// A `TYPE NAME` pair, the form shared by fields, parameters and locals.
	fn parse_variable_definition(&mut self) -> ParseResult<NodeId>
	{
		let (type_token, type_location) = match self.peek()
		{
			Some(TokenKind::Type) | Some(TokenKind::Identifier) =>
			{
				match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				}
			}
			_ => return Err(self.unexpected("a type")),
		};
		let (name, name_location) =
			self.expect(TokenKind::Identifier, "a variable name")?;
		let node = self.tree.add(
			NodeKind::VariableDef,
			type_token,
			type_location,
			None,
		);
		let name_node = self.tree.add(
			NodeKind::VariableId,
			name,
			name_location,
			None,
		);
		self.tree.adopt(node, name_node);
		Ok(node)
	}

	fn parse_map_definition(&mut self) -> ParseResult<NodeId>
	{
		let (map, map_location) = self.expect(TokenKind::Map, "'map'")?;
		let definition = self.parse_variable_definition()?;
		let (offset, offset_location) = match self.peek()
		{
			Some(TokenKind::Int) | Some(TokenKind::Uint) => match self.pop()
			{
				Some(popped) => popped,
				None => return Err(Recovery),
			},
			_ => return Err(self.unexpected("a byte offset literal")),
		};
		self.expect(TokenKind::Newline, "end of line")?;
		let node = self.tree.add(NodeKind::Map, map, map_location, None);
		self.tree.adopt(node, definition);
		let offset_node = self.tree.add(
			NodeKind::Literal,
			offset,
			offset_location,
			None,
		);
		self.tree.adopt(node, offset_node);
		Ok(node)
	}

	/// A top-level `TYPE NAME = EXPR` line.
	fn parse_global_definition(&mut self) -> ParseResult<NodeId>
	{
		let definition = self.parse_variable_definition()?;
		let (assign, assign_location) =
			self.expect(TokenKind::Assignment, "'='")?;
		let value = self.parse_expression()?;
		self.expect(TokenKind::Newline, "end of line")?;
		let node = self.tree.add(
			NodeKind::Global,
			assign,
			assign_location,
			None,
		);
		self.tree.adopt(node, definition);
		self.tree.adopt(node, value);
		Ok(node)
	}

	fn parse_function_or_global(
		&mut self,
		type_token: Token,
		type_location: Location,
		name: Token,
		name_location: Location,
	) -> ParseResult<NodeId>
	{
		match self.peek()
		{
			Some(TokenKind::ParenLeft) => self.parse_function_definition(
				type_token,
				type_location,
				name,
				name_location,
			),
			Some(TokenKind::Assignment) =>
			{
				let definition = self.tree.add(
					NodeKind::VariableDef,
					type_token,
					type_location,
					None,
				);
				let name_node = self.tree.add(
					NodeKind::VariableId,
					name,
					name_location,
					None,
				);
				self.tree.adopt(definition, name_node);
				let (assign, assign_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let value = self.parse_expression()?;
				self.expect(TokenKind::Newline, "end of line")?;
				let node = self.tree.add(
					NodeKind::Global,
					assign,
					assign_location,
					None,
				);
				self.tree.adopt(node, definition);
				self.tree.adopt(node, value);
				Ok(node)
			}
			_ => Err(self.unexpected("'(' or '='")),
		}
	}

	fn parse_function_definition(
		&mut self,
		return_type: Token,
		return_type_location: Location,
		name: Token,
		name_location: Location,
	) -> ParseResult<NodeId>
	{
		let node = self.tree.add(
			NodeKind::FunctionDef,
			return_type,
			return_type_location,
			None,
		);
		let name_node = self.tree.add(
			NodeKind::FunctionId,
			name,
			name_location,
			None,
		);
		self.tree.adopt(node, name_node);
		let (paren, paren_location) =
			self.expect(TokenKind::ParenLeft, "'('")?;
		let parameters = self.tree.add(
			NodeKind::Parameters,
			paren,
			paren_location,
			None,
		);
		self.tree.adopt(node, parameters);
		if self.peek() != Some(TokenKind::ParenRight)
		{
			loop
			{
				let parameter = self.parse_variable_definition()?;
				self.tree.adopt(parameters, parameter);
				match self.peek()
				{
					Some(TokenKind::Comma) =>
					{
						self.pop();
					}
					_ => break,
				}
			}
		}
		self.expect(TokenKind::ParenRight, "')'")?;
		let body = self.parse_block()?;
		self.tree.adopt(node, body);
		Ok(node)
	}

	/// A newline followed by an indented statement block.
	fn parse_block(&mut self) -> ParseResult<NodeId>
	{
		self.expect(TokenKind::Newline, "end of line")?;
		let (indent, indent_location) =
			self.expect(TokenKind::Indent, "an indented block")?;
		let block = self.tree.add(
			NodeKind::Block,
			indent,
			indent_location,
			None,
		);
		loop
		{
			match self.peek()
			{
				Some(TokenKind::Dedent) =>
				{
					self.pop();
					break;
				}
				Some(TokenKind::Newline) =>
				{
					self.pop();
				}
				Some(_) => match self.parse_statement()
				{
					Ok(statement) =>
					{
						self.tree.adopt(block, statement);
					}
					Err(Recovery) => self.skip_line(),
				},
				None => break,
			}
		}
		Ok(block)
	}

	fn parse_statement(&mut self) -> ParseResult<NodeId>
	{
		match self.peek()
		{
			Some(TokenKind::Return) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				if self.peek() == Some(TokenKind::Newline)
				{
					self.pop();
					let node = self.tree.add(
						NodeKind::ReturnVoid,
						token,
						location,
						None,
					);
					Ok(node)
				}
				else
				{
					let value = self.parse_expression()?;
					self.expect(TokenKind::Newline, "end of line")?;
					let node = self.tree.add(
						NodeKind::Return,
						token,
						location,
						None,
					);
					self.tree.adopt(node, value);
					Ok(node)
				}
			}
			Some(TokenKind::If) => self.parse_if_statement(),
			Some(TokenKind::While) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let condition = self.parse_expression()?;
				let body = self.parse_block()?;
				let node = self.tree.add(
					NodeKind::While,
					token,
					location,
					None,
				);
				self.tree.adopt(node, condition);
				self.tree.adopt(node, body);
				Ok(node)
			}
			Some(TokenKind::Break) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				self.expect(TokenKind::Newline, "end of line")?;
				Ok(self.tree.add(NodeKind::Break, token, location, None))
			}
			Some(TokenKind::Continue) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				self.expect(TokenKind::Newline, "end of line")?;
				Ok(self.tree.add(NodeKind::Continue, token, location, None))
			}
			Some(TokenKind::Indent) => self.parse_bare_block(),
			Some(TokenKind::Type) => self.parse_local_definition(),
			Some(TokenKind::Identifier) => self.parse_leading_identifier(),
			_ => Err(self.unexpected("a statement")),
		}
	}

	fn parse_bare_block(&mut self) -> ParseResult<NodeId>
	{
		let (indent, indent_location) =
			self.expect(TokenKind::Indent, "an indented block")?;
		let block = self.tree.add(
			NodeKind::Block,
			indent,
			indent_location,
			None,
		);
		loop
		{
			match self.peek()
			{
				Some(TokenKind::Dedent) =>
				{
					self.pop();
					break;
				}
				Some(TokenKind::Newline) =>
				{
					self.pop();
				}
				Some(_) => match self.parse_statement()
				{
					Ok(statement) =>
					{
						self.tree.adopt(block, statement);
					}
					Err(Recovery) => self.skip_line(),
				},
				None => break,
			}
		}
		Ok(block)
	}

	fn parse_if_statement(&mut self) -> ParseResult<NodeId>
	{
		let (token, location) = self.expect(TokenKind::If, "'if'")?;
		let condition = self.parse_expression()?;
		let then_block = self.parse_block()?;
		let node = self.tree.add(NodeKind::If, token, location, None);
		self.tree.adopt(node, condition);
		self.tree.adopt(node, then_block);
		if self.peek() == Some(TokenKind::Else)
		{
			self.pop();
			let else_branch = if self.peek() == Some(TokenKind::If)
			{
				self.parse_if_statement()?
			}
			else
			{
				self.parse_block()?
			};
			self.tree.adopt(node, else_branch);
		}
		Ok(node)
	}

	/// A statement starting with a type keyword: either a local definition
	/// (`int x = 5`) or a builtin call (`int.store(addr, val)`).
	fn parse_local_definition(&mut self) -> ParseResult<NodeId>
	{
		let (type_token, type_location) = match self.pop()
		{
			Some(popped) => popped,
			None => return Err(Recovery),
		};
		if self.peek() == Some(TokenKind::Dot)
		{
			let chain =
				self.parse_name_chain_from(type_token, type_location)?;
			self.expect(TokenKind::Newline, "end of line")?;
			return Ok(chain);
		}
		let (name, name_location) =
			self.expect(TokenKind::Identifier, "a variable name")?;
		let definition = self.tree.add(
			NodeKind::VariableDef,
			type_token,
			type_location,
			None,
		);
		let name_node = self.tree.add(
			NodeKind::VariableId,
			name,
			name_location,
			None,
		);
		self.tree.adopt(definition, name_node);
		match self.peek()
		{
			Some(TokenKind::Assignment) =>
			{
				let (assign, assign_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let value = self.parse_expression()?;
				self.expect(TokenKind::Newline, "end of line")?;
				let node = self.tree.add(
					NodeKind::Assignment,
					assign,
					assign_location,
					None,
				);
				self.tree.adopt(node, definition);
				self.tree.adopt(node, value);
				Ok(node)
			}
			_ =>
			{
				self.expect(TokenKind::Newline, "end of line")?;
				Ok(definition)
			}
		}
	}

	/// A statement starting with an identifier: either an assignment, an
	/// expression statement (a call), or a local of a struct type.
	fn parse_leading_identifier(&mut self) -> ParseResult<NodeId>
	{
		// `NAME NAME` must be a local definition with a struct type.
		let expression = self.parse_expression()?;
		match self.peek()
		{
			Some(TokenKind::Identifier)
				if self.tree[expression].kind == NodeKind::VariableId =>
			{
				let (name, name_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let definition = self.tree.add(
					NodeKind::VariableDef,
					self.tree[expression].token.clone(),
					self.tree[expression].location.clone(),
					None,
				);
				let name_node = self.tree.add(
					NodeKind::VariableId,
					name,
					name_location,
					None,
				);
				self.tree.adopt(definition, name_node);
				match self.peek()
				{
					Some(TokenKind::Assignment) =>
					{
						let (assign, assign_location) = match self.pop()
						{
							Some(popped) => popped,
							None => return Err(Recovery),
						};
						let value = self.parse_expression()?;
						self.expect(TokenKind::Newline, "end of line")?;
						let node = self.tree.add(
							NodeKind::Assignment,
							assign,
							assign_location,
							None,
						);
						self.tree.adopt(node, definition);
						self.tree.adopt(node, value);
						Ok(node)
					}
					_ =>
					{
						self.expect(TokenKind::Newline, "end of line")?;
						Ok(definition)
					}
				}
			}
			Some(TokenKind::Assignment) =>
			{
				let (assign, assign_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let value = self.parse_expression()?;
				self.expect(TokenKind::Newline, "end of line")?;
				let node = self.tree.add(
					NodeKind::Assignment,
					assign,
					assign_location,
					None,
				);
				self.tree.adopt(node, expression);
				self.tree.adopt(node, value);
				Ok(node)
			}
			_ =>
			{
				self.expect(TokenKind::Newline, "end of line")?;
				Ok(expression)
			}
		}
	}

	fn parse_expression(&mut self) -> ParseResult<NodeId>
	{
		self.parse_binary(0)
	}

	/// Precedence climbing over the binary operator tiers.
	fn parse_binary(&mut self, tier: usize) -> ParseResult<NodeId>
	{
		const TIERS: &[&[TokenKind]] = &[
			&[TokenKind::OrOr],
			&[TokenKind::AndAnd],
			&[TokenKind::Equals, TokenKind::NotEquals],
			&[
				TokenKind::Less,
				TokenKind::LessEquals,
				TokenKind::Greater,
				TokenKind::GreaterEquals,
			],
			&[TokenKind::Pipe],
			&[TokenKind::Caret],
			&[TokenKind::Ampersand],
			&[
				TokenKind::ShiftLeft,
				TokenKind::ShiftRight,
				TokenKind::RotateLeft,
				TokenKind::RotateRight,
			],
			&[TokenKind::Plus, TokenKind::Minus],
			&[TokenKind::Times, TokenKind::Divide, TokenKind::Modulo],
		];
		if tier >= TIERS.len()
		{
			return self.parse_cast();
		}
		let mut expression = self.parse_binary(tier + 1)?;
		loop
		{
			let matches = match self.peek()
			{
				Some(kind) => TIERS[tier].contains(&kind),
				None => false,
			};
			if !matches
			{
				return Ok(expression);
			}
			let (op, op_location) = match self.pop()
			{
				Some(popped) => popped,
				None => return Err(Recovery),
			};
			let right = self.parse_binary(tier + 1)?;
			let node = self.tree.add(
				NodeKind::BinaryOp,
				op,
				op_location,
				None,
			);
			self.tree.adopt(node, expression);
			self.tree.adopt(node, right);
			expression = node;
		}
	}

	/// Casts bind tighter than binary operators and looser than unary ones.
	fn parse_cast(&mut self) -> ParseResult<NodeId>
	{
		let mut expression = self.parse_unary()?;
		loop
		{
			match self.peek()
			{
				Some(TokenKind::As) | Some(TokenKind::To) =>
				{
					let (op, op_location) = match self.pop()
					{
						Some(popped) => popped,
						None => return Err(Recovery),
					};
					let target = match self.peek()
					{
						Some(TokenKind::Type) =>
						{
							let (token, location) = match self.pop()
							{
								Some(popped) => popped,
								None => return Err(Recovery),
							};
							self.tree.add(
								NodeKind::Type,
								token,
								location,
								None,
							)
						}
						// Let the analyzer report a non-type right-hand side.
						_ => self.parse_unary()?,
					};
					let node = self.tree.add(
						NodeKind::BinaryOp,
						op,
						op_location,
						None,
					);
					self.tree.adopt(node, expression);
					self.tree.adopt(node, target);
					expression = node;
				}
				_ => return Ok(expression),
			}
		}
	}

	fn parse_unary(&mut self) -> ParseResult<NodeId>
	{
		match self.peek()
		{
			Some(TokenKind::Minus)
			| Some(TokenKind::Not)
			| Some(TokenKind::Tilde) =>
			{
				let (op, op_location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				let operand = self.parse_unary()?;
				let node = self.tree.add(
					NodeKind::UnaryOp,
					op,
					op_location,
					None,
				);
				self.tree.adopt(node, operand);
				Ok(node)
			}
			_ => self.parse_primary(),
		}
	}

	fn parse_primary(&mut self) -> ParseResult<NodeId>
	{
		match self.peek()
		{
			Some(TokenKind::Int)
			| Some(TokenKind::Uint)
			| Some(TokenKind::Long)
			| Some(TokenKind::Ulong)
			| Some(TokenKind::Float)
			| Some(TokenKind::Double)
			| Some(TokenKind::Bool) =>
			{
				let (token, location) = match self.pop()
				{
					Some(popped) => popped,
					None => return Err(Recovery),
				};
				Ok(self.tree.add(NodeKind::Literal, token, location, None))
			}
			Some(TokenKind::ParenLeft) =>
			{
				self.pop();
				let expression = self.parse_expression()?;
				self.expect(TokenKind::ParenRight, "')'")?;
				Ok(expression)
			}
			Some(TokenKind::Identifier) | Some(TokenKind::Type) =>
			{
				self.parse_name_chain()
			}
			_ => Err(self.unexpected("an expression")),
		}
	}

	/// A dotted name chain, optionally called: `a`, `a.b.c`, `f(x)`,
	/// `int.load(p)`. Member chains nest to the right, so the innermost
	/// identifier of `a.b.c` is reached by descending second children.
	fn parse_name_chain(&mut self) -> ParseResult<NodeId>
	{
		let (first, first_location) = match self.pop()
		{
			Some(popped) => popped,
			None => return Err(Recovery),
		};
		self.parse_name_chain_from(first, first_location)
	}

	fn parse_name_chain_from(
		&mut self,
		first: Token,
		first_location: Location,
	) -> ParseResult<NodeId>
	{
		let mut parts = Vec::new();
		parts.push((first, first_location));
		while self.peek() == Some(TokenKind::Dot)
		{
			self.pop();
			let (member, member_location) =
				self.expect(TokenKind::Identifier, "a member name")?;
			parts.push((member, member_location));
		}
		let is_call = self.peek() == Some(TokenKind::ParenLeft);
		let last_index = parts.len() - 1;
		let mut nodes = Vec::new();
		for (i, (token, location)) in parts.into_iter().enumerate()
		{
			let kind = if i == last_index && is_call
			{
				NodeKind::FunctionId
			}
			else if i == 0 && token.kind == TokenKind::Type
			{
				NodeKind::Type
			}
			else
			{
				NodeKind::VariableId
			};
			nodes.push(self.tree.add(kind, token, location, None));
		}
		// Fold right-nested access nodes.
		let mut chain = match nodes.pop()
		{
			Some(node) => node,
			None => return Err(Recovery),
		};
		while let Some(node) = nodes.pop()
		{
			let access = self.tree.add(
				NodeKind::Access,
				Token {
					kind: TokenKind::Dot,
					text: ".".to_string(),
				},
				self.tree[node].location.clone(),
				None,
			);
			self.tree.adopt(access, node);
			self.tree.adopt(access, chain);
			chain = access;
		}
		if is_call
		{
			self.parse_call(chain)
		}
		else
		{
			Ok(chain)
		}
	}

	fn parse_call(&mut self, callee: NodeId) -> ParseResult<NodeId>
	{
		let (paren, paren_location) =
			self.expect(TokenKind::ParenLeft, "'('")?;
		let node = self.tree.add(
			NodeKind::FunctionCall,
			self.tree[callee].token.clone(),
			self.tree[callee].location.clone(),
			None,
		);
		self.tree.adopt(node, callee);
		let arguments = self.tree.add(
			NodeKind::Arguments,
			paren,
			paren_location,
			None,
		);
		self.tree.adopt(node, arguments);
		if self.peek() != Some(TokenKind::ParenRight)
		{
			loop
			{
				let argument = self.parse_expression()?;
				self.tree.adopt(arguments, argument);
				match self.peek()
				{
					Some(TokenKind::Comma) =>
					{
						self.pop();
					}
					_ => break,
				}
			}
		}
		self.expect(TokenKind::ParenRight, "')'")?;
		Ok(node)
	}
}
