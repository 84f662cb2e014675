use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "const n = \"42\";\nlabel(\"Hello\"); //$NON-NLS-1$\n")?;

    let output = test.run(&["check"])?;

    assert_eq!(output.code, Some(0));
    assert_eq!(output.stdout, "✓ Checked 1 source file - no issues found\n");
    Ok(())
}

#[test]
fn test_check_reports_hardcoded_string() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "const n = 1;\nlabel(\"Hello world\");\n")?;

    let output = test.run(&["check"])?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("error: \"Hello world\"  non-nls"));
    assert!(output.stdout.contains("--> src/app.js:2:7"));
    assert!(output.stdout.contains("2 | label(\"Hello world\");"));
    assert!(output.stdout.contains("hint: run `nlsctl externalize src/app.js`"));
    assert!(output.stdout.contains("1 problems (1 error, 0 warnings)"));
    Ok(())
}

#[test]
fn test_check_skips_ignored_and_test_files() -> Result<()> {
    let test = CliTest::with_file("src/app.test.js", "expect(\"Hello\");\n")?;
    test.write_file("node_modules/lib/index.js", "say(\"Hello\");\n")?;
    test.write_file("src/app.ts", "const n: number = 1;\n")?;

    let output = test.run(&["check"])?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Checked 1 source file"));
    Ok(())
}

#[test]
fn test_check_given_files_only() -> Result<()> {
    let test = CliTest::with_file("src/a.js", "say(\"Hello\");\n")?;
    test.write_file("src/b.js", "const n = 2;\n")?;

    let output = test.run(&["check", "src/b.js"])?;
    assert_eq!(output.code, Some(0));

    let output = test.run(&["check", "src/a.js", "src/b.js"])?;
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("--> src/a.js:1:5"));
    Ok(())
}

#[test]
fn test_check_parse_error() -> Result<()> {
    let test = CliTest::with_file("src/broken.js", "say(\"Hello\" ;\n")?;

    let output = test.run(&["check"])?;
    assert_eq!(output.code, Some(0));
    assert!(output.stderr.contains("1 file(s) could not be parsed"));

    let output = test.run(&["check", "-v"])?;
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("parse-error"));
    assert!(output.stdout.contains("--> src/broken.js"));
    Ok(())
}

#[test]
fn test_check_reports_missing_key() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "label(\"Hello\");\n")?;
    let output = test.run(&["externalize", "src/app.js", "--apply"])?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);

    let output = test.run(&["check", "src/app.js"])?;
    assert_eq!(output.code, Some(0));

    test.write_file("src/messages.properties", "other=Other\n")?;
    let output = test.run(&["check", "src/app.js"])?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("error: \"0\"  missing-key"));
    assert!(output.stdout.contains("= note: not found in src/messages.properties"));
    Ok(())
}

#[test]
fn test_check_invalid_config() -> Result<()> {
    let test = CliTest::with_file(".nlsrc.json", r#"{ "ignores": ["[invalid"] }"#)?;

    let output = test.run(&["check"])?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("Invalid glob pattern in 'ignores'"));
    Ok(())
}
