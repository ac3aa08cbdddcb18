use std::path::Path;

use console::style;
use miette::Result;

pub fn run(path: String) -> Result<()> {
    let summary = blossom::replace(Path::new(&path))?;

    println!(
        "\n{} Tokens replaced into {}",
        style("✓").green().bold(),
        style(summary.output_dir.display()).cyan()
    );
    println!(
        "  {} files replaced, {} files copied",
        summary.files_replaced, summary.files_copied
    );

    Ok(())
}
