use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_show_lists_substitutions() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.js",
        "label(\"Hello\");\nlog(\"debug\"); //$NON-NLS-1$\n",
    )?;

    let output = test.run(&["show", "src/app.js"])?;

    assert_eq!(output.code, Some(0));
    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines[0], "src/app.js (Messages -> src/messages.properties)");
    assert!(lines[1].starts_with("  #0  internalized  1:7"));
    assert!(lines[1].ends_with("\"Hello\""));
    assert!(lines[2].starts_with("  #1  ignored       2:5"));
    Ok(())
}

#[test]
fn test_show_missing_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["show", "src/nope.js"])?;

    assert_eq!(output.code, Some(2));
    assert_eq!(output.stderr, "Error: src/nope.js is not a file\n");
    Ok(())
}
