//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

const WASM_MAGIC: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

fn compile(filename: &str) -> Result<Vec<u8>, anyhow::Error>
{
	let source = std::fs::read_to_string(filename).unwrap();
	schwa::compile_source(&source, filename)
}

fn compile_to_binary(filename: &str) -> Vec<u8>
{
	match compile(filename)
	{
		Ok(binary) => binary,
		Err(error) => panic!("failed to compile {}: {:?}", filename, error),
	}
}

#[test]
fn generate_arithmetic()
{
	let binary = compile_to_binary("tests/samples/valid/arithmetic.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
	assert!(binary.len() > 8);
}

#[test]
fn generate_mapped_struct()
{
	let binary =
		compile_to_binary("tests/samples/valid/mapped_struct.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

#[test]
fn generate_builtins()
{
	let binary = compile_to_binary("tests/samples/valid/builtins.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

#[test]
fn generate_control_flow()
{
	let binary =
		compile_to_binary("tests/samples/valid/control_flow.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

#[test]
fn generate_casts()
{
	let binary = compile_to_binary("tests/samples/valid/casts.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

#[test]
fn generate_exports()
{
	let binary = compile_to_binary("tests/samples/valid/exports.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
	// The export name must appear verbatim in the export section.
	let needle = b"get_answer";
	let found = binary
		.windows(needle.len())
		.any(|window| window == needle);
	assert!(found);
}

#[test]
fn generate_globals()
{
	let binary = compile_to_binary("tests/samples/valid/globals.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

/// Warnings do not block emission.
#[test]
fn generate_despite_warnings()
{
	let binary =
		compile_to_binary("tests/samples/valid/missing_return.schwa");
	assert_eq!(&binary[..8], &WASM_MAGIC);
}

/// Errors do.
#[test]
fn refuse_to_generate_invalid_code()
{
	let result =
		compile("tests/samples/invalid/assignment_type_mismatch.schwa");
	assert!(result.is_err());
}
