//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Schwa is indentation-structured, so on top of the usual tokens the lexer
//! emits `Indent`, `Dedent` and `Newline` tokens that delimit blocks and
//! statements. Each line is lexed independently.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind
{
	// Punctuation.
	ParenLeft,
	ParenRight,
	Comma,
	Dot,

	// Operators.
	Plus,
	Minus,
	Times,
	Divide,
	Modulo,
	Ampersand,
	Pipe,
	Caret,
	Tilde,
	ShiftLeft,
	ShiftRight,
	RotateLeft,  // <|
	RotateRight, // |>
	Equals,
	NotEquals,
	Less,
	LessEquals,
	Greater,
	GreaterEquals,
	AndAnd,
	OrOr,
	Not,
	Assignment, // =

	// Cast operators.
	As,
	To,

	// Keywords.
	Struct,
	Const,
	Export,
	Map,
	Return,
	If,
	Else,
	While,
	Break,
	Continue,

	// A type keyword; the token text is the type name.
	Type,

	// Literals, named after the type of the literal.
	Int,
	Uint,
	Long,
	Ulong,
	Float,
	Double,
	Bool,

	Identifier,

	// Layout.
	Newline,
	Indent,
	Dedent,
}

#[derive(Debug, Clone, Error)]
pub enum Error
{
	#[error("unexpected character {character:?}")]
	UnexpectedCharacter
	{
		character: char
	},
	#[error("invalid integer literal")]
	InvalidIntegerLiteral(#[from] std::num::ParseIntError),
	#[error("invalid number literal")]
	InvalidFloatLiteral(#[from] std::num::ParseFloatError),
	#[error("invalid literal suffix '{suffix}'")]
	InvalidLiteralSuffix
	{
		suffix: String
	},
	#[error("indentation does not match any enclosing block")]
	InconsistentIndentation,
}

#[derive(Debug, Clone)]
pub struct Location
{
	pub source_filename: String,
	/// 1-based row.
	pub line_number: usize,
	/// 1-based column.
	pub line_offset: usize,
	/// Byte offset of the start of the token in the source.
	pub offset: usize,
	/// Length of the token in bytes.
	pub length: usize,
}

impl Location
{
	pub fn format(&self) -> String
	{
		format!(
			"at {}:{}:{}",
			self.source_filename, self.line_number, self.line_offset
		)
	}

	pub fn span(&self) -> std::ops::Range<usize>
	{
		self.offset..(self.offset + self.length.max(1))
	}
}

#[derive(Debug, Clone)]
pub struct Token
{
	pub kind: TokenKind,
	/// The text value: the lexeme for identifiers, keywords and operators,
	/// the digits (without suffix) for number literals.
	pub text: String,
}

#[derive(Debug)]
pub struct LexedToken
{
	pub result: Result<Token, Error>,
	pub location: Location,
}

/// The widths of enclosing indentation levels, innermost last.
struct IndentStack
{
	widths: Vec<usize>,
}

impl IndentStack
{
	fn new() -> IndentStack
	{
		IndentStack { widths: vec![0] }
	}

	fn current(&self) -> usize
	{
		self.widths.last().copied().unwrap_or(0)
	}
}

pub fn lex(source: &str, source_filename: &str) -> Vec<LexedToken>
{
	let mut tokens = Vec::new();
	let mut indentation = IndentStack::new();
	let mut offset = 0;
	let mut last_line_number = 0;
	for (i, full_line) in source.split('\n').enumerate()
	{
		let line = full_line.strip_suffix('\r').unwrap_or(full_line);
		let line_number = i + 1;
		if !is_blank(line)
		{
			last_line_number = line_number;
			lex_indentation(
				line,
				source_filename,
				line_number,
				offset,
				&mut indentation,
				&mut tokens,
			);
			lex_line(line, source_filename, line_number, offset, &mut tokens);
			let end = Location {
				source_filename: source_filename.to_string(),
				line_number,
				line_offset: line.chars().count() + 1,
				offset: offset + line.len(),
				length: 1,
			};
			tokens.push(LexedToken {
				result: Ok(Token {
					kind: TokenKind::Newline,
					text: String::new(),
				}),
				location: end,
			});
		}
		offset += full_line.len() + 1;
	}
	// Close all blocks that are still open at the end of the file.
	while indentation.widths.len() > 1
	{
		indentation.widths.pop();
		let location = Location {
			source_filename: source_filename.to_string(),
			line_number: last_line_number + 1,
			line_offset: 1,
			offset: source.len(),
			length: 1,
		};
		tokens.push(LexedToken {
			result: Ok(Token {
				kind: TokenKind::Dedent,
				text: String::new(),
			}),
			location,
		});
	}
	tokens
}

fn is_blank(line: &str) -> bool
{
	line.chars().all(char::is_whitespace)
		|| line.trim_start().starts_with('#')
}

fn indentation_width(line: &str) -> usize
{
	let mut width = 0;
	for x in line.chars()
	{
		match x
		{
			' ' => width += 1,
			'\t' => width += 4,
			_ => break,
		}
	}
	width
}

fn lex_indentation(
	line: &str,
	source_filename: &str,
	line_number: usize,
	line_start_offset: usize,
	indentation: &mut IndentStack,
	tokens: &mut Vec<LexedToken>,
)
{
	let width = indentation_width(line);
	let location = Location {
		source_filename: source_filename.to_string(),
		line_number,
		line_offset: 1,
		offset: line_start_offset,
		length: width.max(1),
	};
	if width > indentation.current()
	{
		indentation.widths.push(width);
		tokens.push(LexedToken {
			result: Ok(Token {
				kind: TokenKind::Indent,
				text: String::new(),
			}),
			location,
		});
	}
	else if width < indentation.current()
	{
		while width < indentation.current()
		{
			indentation.widths.pop();
			tokens.push(LexedToken {
				result: Ok(Token {
					kind: TokenKind::Dedent,
					text: String::new(),
				}),
				location: location.clone(),
			});
		}
		if width != indentation.current()
		{
			tokens.push(LexedToken {
				result: Err(Error::InconsistentIndentation),
				location,
			});
		}
	}
}

fn lex_line(
	line: &str,
	source_filename: &str,
	line_number: usize,
	line_start_offset: usize,
	tokens: &mut Vec<LexedToken>,
)
{
	let mut iter = line.char_indices().peekable();
	while let Some((byte_offset, x)) = iter.next()
	{
		let location = Location {
			source_filename: source_filename.to_string(),
			line_number,
			line_offset: line[..byte_offset].chars().count() + 1,
			offset: line_start_offset + byte_offset,
			length: x.len_utf8(),
		};
		let result = match x
		{
			' ' | '\t' => continue,
			'#' => break,
			'(' => Ok(symbol(TokenKind::ParenLeft, "(")),
			')' => Ok(symbol(TokenKind::ParenRight, ")")),
			',' => Ok(symbol(TokenKind::Comma, ",")),
			'.' => Ok(symbol(TokenKind::Dot, ".")),
			'+' => Ok(symbol(TokenKind::Plus, "+")),
			'-' => Ok(symbol(TokenKind::Minus, "-")),
			'*' => Ok(symbol(TokenKind::Times, "*")),
			'/' => Ok(symbol(TokenKind::Divide, "/")),
			'%' => Ok(symbol(TokenKind::Modulo, "%")),
			'^' => Ok(symbol(TokenKind::Caret, "^")),
			'~' => Ok(symbol(TokenKind::Tilde, "~")),
			'=' => match iter.peek()
			{
				Some((_, '=')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::Equals, "=="))
				}
				_ => Ok(symbol(TokenKind::Assignment, "=")),
			},
			'!' => match iter.peek()
			{
				Some((_, '=')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::NotEquals, "!="))
				}
				_ => Ok(symbol(TokenKind::Not, "!")),
			},
			'&' => match iter.peek()
			{
				Some((_, '&')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::AndAnd, "&&"))
				}
				_ => Ok(symbol(TokenKind::Ampersand, "&")),
			},
			'|' => match iter.peek()
			{
				Some((_, '|')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::OrOr, "||"))
				}
				Some((_, '>')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::RotateRight, "|>"))
				}
				_ => Ok(symbol(TokenKind::Pipe, "|")),
			},
			'<' => match iter.peek()
			{
				Some((_, '<')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::ShiftLeft, "<<"))
				}
				Some((_, '=')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::LessEquals, "<="))
				}
				Some((_, '|')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::RotateLeft, "<|"))
				}
				_ => Ok(symbol(TokenKind::Less, "<")),
			},
			'>' => match iter.peek()
			{
				Some((_, '>')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::ShiftRight, ">>"))
				}
				Some((_, '=')) =>
				{
					iter.next();
					Ok(symbol(TokenKind::GreaterEquals, ">="))
				}
				_ => Ok(symbol(TokenKind::Greater, ">")),
			},
			'a'..='z' | 'A'..='Z' | '_' =>
			{
				let mut word = x.to_string();
				while let Some(&(_, y)) = iter.peek()
				{
					if is_identifier_continuation(y)
					{
						word.push(y);
						iter.next();
					}
					else
					{
						break;
					}
				}
				Ok(keyword_or_identifier(word))
			}
			'0'..='9' =>
			{
				let (result, length) = lex_number(x, &mut iter);
				let location = Location { length, ..location };
				tokens.push(LexedToken { result, location });
				continue;
			}
			_ => Err(Error::UnexpectedCharacter { character: x }),
		};
		let length = match &result
		{
			Ok(token) => token.text.len().max(x.len_utf8()),
			Err(_) => x.len_utf8(),
		};
		let location = Location { length, ..location };
		tokens.push(LexedToken { result, location });
	}
}

fn symbol(kind: TokenKind, text: &str) -> Token
{
	Token {
		kind,
		text: text.to_string(),
	}
}

fn keyword_or_identifier(word: String) -> Token
{
	let kind = match word.as_str()
	{
		"struct" => TokenKind::Struct,
		"const" => TokenKind::Const,
		"export" => TokenKind::Export,
		"map" => TokenKind::Map,
		"return" => TokenKind::Return,
		"if" => TokenKind::If,
		"else" => TokenKind::Else,
		"while" => TokenKind::While,
		"break" => TokenKind::Break,
		"continue" => TokenKind::Continue,
		"as" => TokenKind::As,
		"to" => TokenKind::To,
		"true" | "false" => TokenKind::Bool,
		"void" | "int" | "uint" | "long" | "ulong" | "float" | "double"
		| "bool" => TokenKind::Type,
		_ => TokenKind::Identifier,
	};
	Token { kind, text: word }
}

fn lex_number(
	first: char,
	iter: &mut std::iter::Peekable<std::str::CharIndices>,
) -> (Result<Token, Error>, usize)
{
	let mut digits = first.to_string();
	let mut is_hex = false;
	let mut is_fractional = false;
	if first == '0'
	{
		if let Some(&(_, 'x')) = iter.peek()
		{
			iter.next();
			is_hex = true;
			digits.clear();
		}
	}
	while let Some(&(_, y)) = iter.peek()
	{
		if is_hex && y.is_ascii_hexdigit()
		{
			digits.push(y);
			iter.next();
		}
		else if !is_hex && y.is_ascii_digit()
		{
			digits.push(y);
			iter.next();
		}
		else if y == '.' && !is_hex && !is_fractional
		{
			// Only consume the dot if a digit follows, so that a dot after a
			// literal still lexes as member access.
			let mut lookahead = iter.clone();
			lookahead.next();
			match lookahead.peek()
			{
				Some(&(_, z)) if z.is_ascii_digit() =>
				{
					is_fractional = true;
					digits.push(y);
					iter.next();
				}
				_ => break,
			}
		}
		else
		{
			break;
		}
	}
	let mut suffix = String::new();
	while let Some(&(_, y)) = iter.peek()
	{
		if y.is_ascii_alphanumeric()
		{
			suffix.push(y);
			iter.next();
		}
		else
		{
			break;
		}
	}
	let length =
		digits.len() + suffix.len() + if is_hex { "0x".len() } else { 0 };
	let kind = match (is_fractional, suffix.as_str())
	{
		(false, "") => TokenKind::Int,
		(false, "u") => TokenKind::Uint,
		(false, "l") => TokenKind::Long,
		(false, "ul") => TokenKind::Ulong,
		(false, "f") | (true, "f") => TokenKind::Float,
		(false, "d") | (true, "d") => TokenKind::Double,
		(true, "") => TokenKind::Double,
		_ =>
		{
			return (Err(Error::InvalidLiteralSuffix { suffix }), length);
		}
	};
	match check_number_range(kind, &digits, is_hex)
	{
		Ok(()) =>
		{
			let text = if is_hex
			{
				format!("0x{}", digits)
			}
			else
			{
				digits
			};
			(Ok(Token { kind, text }), length)
		}
		Err(error) => (Err(error), length),
	}
}

fn check_number_range(
	kind: TokenKind,
	digits: &str,
	is_hex: bool,
) -> Result<(), Error>
{
	let radix = if is_hex { 16 } else { 10 };
	match kind
	{
		// Hex literals may use the full unsigned bit pattern.
		TokenKind::Int if is_hex =>
		{
			u32::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Int =>
		{
			i32::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Uint =>
		{
			u32::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Long if is_hex =>
		{
			u64::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Long =>
		{
			i64::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Ulong =>
		{
			u64::from_str_radix(digits, radix).map(|_| ())?;
			Ok(())
		}
		TokenKind::Float | TokenKind::Double =>
		{
			digits.parse::<f64>().map(|_| ())?;
			Ok(())
		}
		_ => Ok(()),
	}
}

fn is_identifier_continuation(x: char) -> bool
{
	match x
	{
		'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => true,
		_ => false,
	}
}
