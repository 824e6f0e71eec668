//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! Every compiler stage reports through the same diagnostic type. Diagnostics
//! are never fatal: each stage records what it found and keeps going, so that
//! a single run surfaces as many issues as possible. The driver refuses to
//! emit a module only if any diagnostic has error severity.

use crate::data_type::DataType;
use crate::lexer;
use crate::lexer::Location;

use ariadne::{Label, ReportKind};

pub type Report = ariadne::Report<'static, (String, std::ops::Range<usize>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity
{
	Error,
	Warning,
}

#[must_use]
#[derive(Debug, Default)]
pub struct Errors
{
	pub errors: Vec<Error>,
}

impl From<Error> for Errors
{
	fn from(error: Error) -> Self
	{
		Self {
			errors: vec![error],
		}
	}
}

impl Errors
{
	pub fn new() -> Errors
	{
		Errors { errors: Vec::new() }
	}

	pub fn add(&mut self, error: Error)
	{
		self.errors.push(error);
	}

	pub fn append(&mut self, mut more: Errors)
	{
		self.errors.append(&mut more.errors);
	}

	pub fn is_empty(&self) -> bool
	{
		self.errors.is_empty()
	}

	/// True if any diagnostic blocks code generation.
	pub fn has_errors(&self) -> bool
	{
		self.errors
			.iter()
			.any(|x| x.severity() == Severity::Error)
	}

	pub fn codes(&self) -> Vec<u16>
	{
		self.errors.iter().map(|x| x.code()).collect()
	}

	pub fn panic(self) -> Never
	{
		match self.errors.into_iter().next()
		{
			Some(error) => panic!("{:?}", error),
			None => panic!("empty errors"),
		}
	}
}

pub enum Never {}

impl IntoIterator for Errors
{
	type Item = Error;
	type IntoIter = <Vec<Error> as IntoIterator>::IntoIter;

	fn into_iter(self) -> Self::IntoIter
	{
		self.errors.into_iter()
	}
}

#[must_use]
#[derive(Debug, Clone)]
pub enum Error
{
	Lexical
	{
		error: lexer::Error,
		location: Location,
	},
	UnexpectedEndOfFile
	{
		last_location: Location,
		expectation: String,
	},
	UnexpectedToken
	{
		location: Location,
		expectation: String,
	},
	MalformedNode
	{
		location: Location,
		expectation: String,
	},
	DuplicateDeclarationVariable
	{
		name: String,
		location: Location,
		previous: Option<Location>,
	},
	DuplicateDeclarationFunction
	{
		name: String,
		location: Location,
		previous: Option<Location>,
	},
	DuplicateDeclarationStructure
	{
		name: String,
		location: Location,
		previous: Option<Location>,
	},
	UndefinedVariable
	{
		name: String,
		location: Location,
	},
	UndefinedFunction
	{
		name: String,
		location: Location,
	},
	UndefinedStructure
	{
		name: String,
		location: Location,
	},
	UndefinedMember
	{
		name: String,
		location: Location,
	},
	AssignmentTypeMismatch
	{
		left: DataType,
		right: DataType,
		location: Location,
	},
	InvalidOperand
	{
		op: String,
		data_type: DataType,
		location: Location,
	},
	ArgumentTypeMismatch
	{
		ordinal: usize,
		parameter: String,
		function: String,
		expected: DataType,
		actual: DataType,
		location: Location,
	},
	ReturnTypeMismatch
	{
		expected: DataType,
		actual: DataType,
		location: Location,
	},
	MissingReturnValue
	{
		expected: DataType,
		location: Location,
	},
	ConditionTypeMismatch
	{
		actual: DataType,
		location: Location,
	},
	ArgumentCountMismatch
	{
		function: String,
		expected: usize,
		actual: usize,
		location: Location,
	},
	ConstantAssignment
	{
		name: String,
		location: Location,
	},
	InvalidLeftHandSide
	{
		location: Location
	},
	InvalidRightHandSide
	{
		location: Location
	},
	InvalidCast
	{
		op: String,
		from: DataType,
		to: DataType,
		location: Location,
	},
	CastTargetNotType
	{
		location: Location
	},
	MissingReturn
	{
		function: String,
		location: Location,
	},
}

impl Error
{
	pub fn code(&self) -> u16
	{
		match self
		{
			Error::UnexpectedEndOfFile { .. } => 100,
			Error::UnexpectedToken { .. } => 101,
			Error::Lexical {
				error: lexer::Error::UnexpectedCharacter { .. },
				..
			} => 110,
			Error::Lexical {
				error: lexer::Error::InvalidIntegerLiteral(..),
				..
			} => 140,
			Error::Lexical {
				error: lexer::Error::InvalidFloatLiteral(..),
				..
			} => 141,
			Error::Lexical {
				error: lexer::Error::InvalidLiteralSuffix { .. },
				..
			} => 142,
			Error::Lexical {
				error: lexer::Error::InconsistentIndentation,
				..
			} => 150,
			Error::MalformedNode { .. } => 160,
			Error::DuplicateDeclarationVariable { .. } => 400,
			Error::DuplicateDeclarationFunction { .. } => 401,
			Error::DuplicateDeclarationStructure { .. } => 402,
			Error::UndefinedVariable { .. } => 410,
			Error::UndefinedFunction { .. } => 411,
			Error::UndefinedStructure { .. } => 412,
			Error::UndefinedMember { .. } => 413,
			Error::AssignmentTypeMismatch { .. } => 500,
			Error::InvalidOperand { .. } => 501,
			Error::ArgumentTypeMismatch { .. } => 502,
			Error::ReturnTypeMismatch { .. } => 503,
			Error::MissingReturnValue { .. } => 504,
			Error::ConditionTypeMismatch { .. } => 505,
			Error::ArgumentCountMismatch { .. } => 510,
			Error::ConstantAssignment { .. } => 511,
			Error::InvalidLeftHandSide { .. } => 512,
			Error::InvalidRightHandSide { .. } => 513,
			Error::InvalidCast { .. } => 520,
			Error::CastTargetNotType { .. } => 521,
			Error::MissingReturn { .. } => 900,
		}
	}

	pub fn severity(&self) -> Severity
	{
		match self
		{
			Error::MissingReturn { .. } => Severity::Warning,
			_ => Severity::Error,
		}
	}

	/// The stage that produced this diagnostic.
	pub fn stage(&self) -> &'static str
	{
		match self
		{
			Error::Lexical { .. } => "Lexer",
			Error::UnexpectedEndOfFile { .. } => "Parser",
			Error::UnexpectedToken { .. } => "Parser",
			Error::MalformedNode { .. } => "Validator",
			_ => "Analyzer",
		}
	}

	pub fn location(&self) -> &Location
	{
		match self
		{
			Error::Lexical { location, .. } => location,
			Error::UnexpectedEndOfFile { last_location, .. } => last_location,
			Error::UnexpectedToken { location, .. } => location,
			Error::MalformedNode { location, .. } => location,
			Error::DuplicateDeclarationVariable { location, .. } => location,
			Error::DuplicateDeclarationFunction { location, .. } => location,
			Error::DuplicateDeclarationStructure { location, .. } => location,
			Error::UndefinedVariable { location, .. } => location,
			Error::UndefinedFunction { location, .. } => location,
			Error::UndefinedStructure { location, .. } => location,
			Error::UndefinedMember { location, .. } => location,
			Error::AssignmentTypeMismatch { location, .. } => location,
			Error::InvalidOperand { location, .. } => location,
			Error::ArgumentTypeMismatch { location, .. } => location,
			Error::ReturnTypeMismatch { location, .. } => location,
			Error::MissingReturnValue { location, .. } => location,
			Error::ConditionTypeMismatch { location, .. } => location,
			Error::ArgumentCountMismatch { location, .. } => location,
			Error::ConstantAssignment { location, .. } => location,
			Error::InvalidLeftHandSide { location } => location,
			Error::InvalidRightHandSide { location } => location,
			Error::InvalidCast { location, .. } => location,
			Error::CastTargetNotType { location } => location,
			Error::MissingReturn { location, .. } => location,
		}
	}

	pub fn message(&self) -> String
	{
		match self
		{
			Error::Lexical { error, .. } => format!("{}", error),
			Error::UnexpectedEndOfFile { expectation, .. } =>
			{
				format!("Unexpected end of file, expected {}", expectation)
			}
			Error::UnexpectedToken { expectation, .. } =>
			{
				format!("Unexpected token, expected {}", expectation)
			}
			Error::MalformedNode { expectation, .. } =>
			{
				format!("Malformed syntax tree node, expected {}", expectation)
			}
			Error::DuplicateDeclarationVariable { name, .. } =>
			{
				format!("A variable named \"{}\" already exists", name)
			}
			Error::DuplicateDeclarationFunction { name, .. } =>
			{
				format!("A function named \"{}\" already exists", name)
			}
			Error::DuplicateDeclarationStructure { name, .. } =>
			{
				format!("A struct named \"{}\" already exists", name)
			}
			Error::UndefinedVariable { name, .. } =>
			{
				format!("Variable \"{}\" is not defined", name)
			}
			Error::UndefinedFunction { name, .. } =>
			{
				format!("Function \"{}\" is not defined", name)
			}
			Error::UndefinedStructure { name, .. } =>
			{
				format!("Struct \"{}\" is not defined", name)
			}
			Error::UndefinedMember { name, .. } =>
			{
				format!("\"{}\" does not name a scope or struct variable", name)
			}
			Error::AssignmentTypeMismatch { .. } =>
			{
				"Both sides of an assignment must be of the same type"
					.to_string()
			}
			Error::InvalidOperand { op, data_type, .. } =>
			{
				format!(
					"Invalid argument of type {} for operator '{}'",
					data_type, op
				)
			}
			Error::ArgumentTypeMismatch {
				ordinal,
				parameter,
				function,
				expected,
				actual,
				..
			} =>
			{
				format!(
					"Argument {} (\"{}\") of function \"{}\" must be of type \
					 {}, not {}",
					ordinal, parameter, function, expected, actual
				)
			}
			Error::ReturnTypeMismatch {
				expected, actual, ..
			} =>
			{
				format!(
					"Function is declared to return {}, not {}",
					expected, actual
				)
			}
			Error::MissingReturnValue { expected, .. } =>
			{
				format!("Expected a return value of type {}", expected)
			}
			Error::ConditionTypeMismatch { actual, .. } =>
			{
				format!("Condition must be of type bool, not {}", actual)
			}
			Error::ArgumentCountMismatch {
				function,
				expected,
				actual,
				..
			} =>
			{
				format!(
					"Function \"{}\" takes {} arguments, not {}",
					function, expected, actual
				)
			}
			Error::ConstantAssignment { .. } =>
			{
				"Constant globals cannot be assigned to".to_string()
			}
			Error::InvalidLeftHandSide { .. } =>
			{
				"Invalid left-hand side of assignment".to_string()
			}
			Error::InvalidRightHandSide { .. } =>
			{
				"Invalid right-hand side of assignment".to_string()
			}
			Error::InvalidCast { op, from, to, .. } =>
			{
				format!("Invalid cast '{} {} {}'", from, op, to)
			}
			Error::CastTargetNotType { .. } =>
			{
				"The right-hand side of a cast must be a type".to_string()
			}
			Error::MissingReturn { function, .. } =>
			{
				format!(
					"Function \"{}\" may finish without returning a value",
					function
				)
			}
		}
	}

	pub fn build_report(&self, config: ariadne::Config) -> Report
	{
		let location = self.location();
		let kind = match self.severity()
		{
			Severity::Error => ReportKind::Error,
			Severity::Warning => ReportKind::Warning,
		};
		let span = (location.source_filename.clone(), location.span());
		let mut report = Report::build(kind, span.0.clone(), span.1.start)
			.with_config(config)
			.with_code(self.code())
			.with_message(format!("{}: {}", self.stage(), self.message()))
			.with_label(Label::new(span).with_message(self.message()));
		if let Some(previous) = self.previous_location()
		{
			let span = (previous.source_filename.clone(), previous.span());
			report = report.with_label(
				Label::new(span).with_message("first declared here"),
			);
		}
		report.finish()
	}

	fn previous_location(&self) -> Option<&Location>
	{
		match self
		{
			Error::DuplicateDeclarationVariable { previous, .. } =>
			{
				previous.as_ref()
			}
			Error::DuplicateDeclarationFunction { previous, .. } =>
			{
				previous.as_ref()
			}
			Error::DuplicateDeclarationStructure { previous, .. } =>
			{
				previous.as_ref()
			}
			_ => None,
		}
	}
}
