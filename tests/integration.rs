//
// Part of schwa
// Copyright (c) 2026 The schwa contributors
// License: MIT
//

use assert_cmd::Command;

#[test]
fn check_valid_source()
{
	let mut command = Command::cargo_bin("schwa").unwrap();
	command
		.arg("tests/samples/valid/arithmetic.schwa")
		.arg("--check")
		.assert()
		.success();
}

#[test]
fn check_invalid_source()
{
	let mut command = Command::cargo_bin("schwa").unwrap();
	command
		.arg("tests/samples/invalid/const_assignment.schwa")
		.arg("--check")
		.assert()
		.failure();
}

#[test]
fn format_valid_source()
{
	let mut command = Command::cargo_bin("schwa").unwrap();
	let assert = command
		.arg("tests/samples/valid/arithmetic.schwa")
		.arg("--format")
		.assert()
		.success();
	let output = assert.get_output();
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("int f(int a, int b)"));
}
