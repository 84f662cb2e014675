use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .nlsrc.json

    ----- stderr -----
    ");

    let content = test.read_file(".nlsrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["accessorName"], "Messages");
    assert_eq!(parsed["accessorPath"], "src/Messages.js");
    assert_eq!(parsed["mode"], "lookup");
    assert_eq!(parsed["tagPrefix"], "$NON-NLS-");
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".nlsrc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .nlsrc.json already exists
    ");

    assert_eq!(test.read_file(".nlsrc.json")?, "{}");
    Ok(())
}

#[test]
fn test_generated_config_is_loaded() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "const n = \"42\";\n")?;
    test.command().arg("init").output()?;

    let output = test.run(&["check"])?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    Ok(())
}
