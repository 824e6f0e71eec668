//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

//! The builtin catalog: numeric intrinsics preloaded into the root scope,
//! mirroring the WebAssembly instructions they compile to. Each intrinsic is
//! registered by its dotted path, and the path's prefix components become
//! nested scopes on demand, so that `int.load(p)` resolves like any other
//! member access. This catalog is the sole source of truth for what
//! `<typename>.<op>(...)` names.

use enumset::EnumSet;

use crate::data_type::DataType;
use crate::symbol::{Function, SymbolTable, Variable};

pub fn install(symbols: &mut SymbolTable)
{
	declare(symbols, "nop", &[], DataType::Void);

	let integers =
		[DataType::Int, DataType::Uint, DataType::Long, DataType::Ulong];
	let floats = [DataType::Float, DataType::Double];

	// Aligned loads and stores for every sized type.
	for data_type in integers.iter().chain(floats.iter())
	{
		let path = format!("{}.load", data_type);
		declare(symbols, &path, &[("addr", DataType::Uint)], data_type.clone());
		let path = format!("{}.store", data_type);
		declare(
			symbols,
			&path,
			&[("addr", DataType::Uint), ("val", data_type.clone())],
			DataType::Void,
		);
	}

	// Narrowing variants: sign- and zero-extending byte and short accesses
	// for the 32-bit integers, plus int-sized ones for the 64-bit integers.
	for data_type in &integers
	{
		for op in ["loadSByte", "loadByte", "loadShort", "loadUShort"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("addr", DataType::Uint)],
				data_type.clone(),
			);
		}
		for op in ["storeSByte", "storeByte", "storeShort", "storeUShort"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("addr", DataType::Uint), ("val", data_type.clone())],
				DataType::Void,
			);
		}
	}
	for data_type in [DataType::Long, DataType::Ulong]
	{
		for op in ["loadInt", "loadUInt"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("addr", DataType::Uint)],
				data_type.clone(),
			);
		}
		for op in ["storeInt", "storeUInt"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("addr", DataType::Uint), ("val", data_type.clone())],
				DataType::Void,
			);
		}
	}

	// Bit utilities.
	for data_type in &integers
	{
		for op in ["clz", "ctz", "popcnt", "eqz"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("val", data_type.clone())],
				data_type.clone(),
			);
		}
	}

	// Float utilities.
	for data_type in &floats
	{
		for op in ["abs", "ceil", "floor", "truncate", "round", "sqrt"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("val", data_type.clone())],
				data_type.clone(),
			);
		}
		for op in ["copysign", "min", "max"]
		{
			let path = format!("{}.{}", data_type, op);
			declare(
				symbols,
				&path,
				&[("a", data_type.clone()), ("b", data_type.clone())],
				data_type.clone(),
			);
		}
	}
}

/// Registers one intrinsic under its dotted path, creating the nested
/// prefix scopes as needed.
fn declare(
	symbols: &mut SymbolTable,
	path: &str,
	parameters: &[(&str, DataType)],
	return_type: DataType,
)
{
	let mut components: Vec<&str> = path.split('.').collect();
	let name = match components.pop()
	{
		Some(name) => name,
		None => return,
	};
	let mut scope = symbols.root();
	for component in components
	{
		scope = match symbols.local_scope(scope, component)
		{
			Some(id) => id,
			None => symbols.add_scope(scope, component, None),
		};
	}
	let mut parameter_ids = Vec::new();
	for (parameter_name, parameter_type) in parameters
	{
		let id = symbols.add_detached_variable(Variable {
			name: parameter_name.to_string(),
			data_type: parameter_type.clone(),
			scope,
			node: None,
			offset: 0,
			flags: EnumSet::new(),
		});
		parameter_ids.push(id);
	}
	let _ = symbols.declare_function(Function {
		name: name.to_string(),
		return_type,
		parameters: parameter_ids,
		scope,
		node: None,
		is_export: false,
	});
}
