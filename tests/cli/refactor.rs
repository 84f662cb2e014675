use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const SOURCE: &str = "label(\"Hello world\");\n";

#[test]
fn test_externalize_dry_run_writes_nothing() -> Result<()> {
    let test = CliTest::with_file("src/app.js", SOURCE)?;

    let output = test.run(&["externalize", "src/app.js"])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("warning: resource file src/messages.properties will be created"));
    assert!(output.stdout.contains("info: accessor src/Messages.js will be created"));
    assert!(output.stdout.contains("create src/Messages.js"));
    assert!(output.stdout.contains(
        "edit src/app.js\n@@ line 1 @@\n-label(\"Hello world\");\n+import { Messages } from \"./Messages.js\";\n+label(Messages.getString(\"0\")); //$NON-NLS-1$\n"
    ));
    assert!(output.stdout.contains("create src/messages.properties\n+0=Hello world\n"));
    assert!(output.stdout.contains("Run with --apply to write these changes."));

    assert_eq!(test.read_file("src/app.js")?, SOURCE);
    assert!(!test.exists("src/Messages.js"));
    assert!(!test.exists("src/messages.properties"));
    Ok(())
}

#[test]
fn test_externalize_rename_internalize_round_trip() -> Result<()> {
    let test = CliTest::with_file("src/app.js", SOURCE)?;

    let output = test.run(&["externalize", "src/app.js", "--apply"])?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ Changed 3 file(s)."));
    assert_eq!(
        test.read_file("src/app.js")?,
        "import { Messages } from \"./Messages.js\";\nlabel(Messages.getString(\"0\")); //$NON-NLS-1$\n"
    );
    assert_eq!(test.read_file("src/messages.properties")?, "0=Hello world\n");
    assert!(test.read_file("src/Messages.js")?.contains("export class Messages"));

    let output = test.run(&["rename-key", "src/app.js", "0", "greeting", "--apply"])?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(test.read_file("src/app.js")?.contains("Messages.getString(\"greeting\")"));
    assert_eq!(test.read_file("src/messages.properties")?, "greeting=Hello world\n");

    let output = test.run(&["internalize", "src/app.js", "--apply"])?;
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(test.read_file("src/app.js")?.contains("label(\"Hello world\");"));
    assert!(!test.read_file("src/messages.properties")?.contains("greeting"));
    Ok(())
}

#[test]
fn test_externalize_selected_ids_with_prefix() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "a(\"One\");\nb(\"Two\");\n")?;

    let output = test.run(&[
        "externalize",
        "src/app.js",
        "--id",
        "1",
        "--key-prefix",
        "app.",
        "--apply",
    ])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let source = test.read_file("src/app.js")?;
    assert!(source.contains("a(\"One\");\n"));
    assert!(source.contains("b(Messages.getString(\"app.0\")); //$NON-NLS-1$\n"));
    assert_eq!(test.read_file("src/messages.properties")?, "app.0=Two\n");
    Ok(())
}

#[test]
fn test_externalize_fields_accessor() -> Result<()> {
    let test = CliTest::with_file("src/app.js", SOURCE)?;

    let output = test.run(&[
        "externalize",
        "src/app.js",
        "--mode",
        "fields",
        "--key-prefix",
        "msg_",
        "--apply",
    ])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(test.read_file("src/app.js")?.contains("label(Messages.msg_0);"));
    assert!(test.read_file("src/Messages.js")?.contains("static msg_0;"));
    assert_eq!(test.read_file("src/messages.properties")?, "msg_0=Hello world\n");
    Ok(())
}

#[test]
fn test_ignore_tags_literals() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "label(\"Hello\", \"World\");\n")?;

    let output = test.run(&["ignore", "src/app.js", "--apply"])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(
        test.read_file("src/app.js")?,
        "label(\"Hello\", \"World\"); //$NON-NLS-1$ //$NON-NLS-2$\n"
    );

    let output = test.run(&["ignore", "src/app.js"])?;
    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Nothing to change in src/app.js"));
    Ok(())
}

#[test]
fn test_apply_plan() -> Result<()> {
    let test = CliTest::with_file("src/app.js", "label(\"Hello\", \"x\");\n")?;
    test.write_file(
        "plan.json",
        r#"{ "substitutions": [
            { "id": 0, "state": "externalized", "key": "greeting" },
            { "id": 1, "state": "ignored" }
        ] }"#,
    )?;

    let output = test.run(&["apply", "src/app.js", "--plan", "plan.json", "--apply"])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(
        test.read_file("src/app.js")?
            .contains("label(Messages.getString(\"greeting\"), \"x\"); //$NON-NLS-1$ //$NON-NLS-2$\n")
    );
    assert_eq!(test.read_file("src/messages.properties")?, "greeting=Hello\n");
    Ok(())
}

#[test]
fn test_invalid_key_is_refused() -> Result<()> {
    let test = CliTest::with_file("src/app.js", SOURCE)?;
    test.write_file(
        "plan.json",
        r#"{ "substitutions": [{ "id": 0, "state": "externalized", "key": "a b" }] }"#,
    )?;

    let output = test.run(&["apply", "src/app.js", "--plan", "plan.json", "--apply"])?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("error: key 'a b' contains invalid character ' '  [#0]"));
    assert!(output.stdout.contains("--> src/app.js:1:7"));
    assert_eq!(test.read_file("src/app.js")?, SOURCE);
    assert!(!test.exists("src/messages.properties"));
    Ok(())
}

#[test]
fn test_rename_unknown_key_fails() -> Result<()> {
    let test = CliTest::with_file("src/app.js", SOURCE)?;

    let output = test.run(&["rename-key", "src/app.js", "nope", "other"])?;

    assert_eq!(output.code, Some(2));
    assert_eq!(
        output.stderr,
        "Error: key 'nope' is not referenced by src/app.js\n"
    );
    Ok(())
}

#[test]
fn test_accessor_from_config() -> Result<()> {
    let test = CliTest::with_file("web/src/app.js", SOURCE)?;
    test.write_file(
        ".nlsrc.json",
        r#"{ "sourceRoot": "web", "accessorName": "Strings", "accessorPath": "i18n/Strings.js", "bundleName": "strings" }"#,
    )?;

    let output = test.run(&["externalize", "web/src/app.js", "--apply"])?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(
        test.read_file("web/src/app.js")?,
        "import { Strings } from \"../i18n/Strings.js\";\nlabel(Strings.getString(\"0\")); //$NON-NLS-1$\n"
    );
    assert_eq!(test.read_file("web/i18n/strings.properties")?, "0=Hello world\n");
    assert!(test.exists("web/i18n/Strings.js"));
    Ok(())
}
