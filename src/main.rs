use anyhow::Context;
use pixelgrid::ExportFormat;

const USAGE: &str = "usage: pixelgrid [png|jpeg|svg|pdf ...]";

fn main() -> anyhow::Result<()> {
    let formats = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<ExportFormat>())
        .collect::<Result<Vec<_>, _>>()
        .context(USAGE)?;

    for path in pixelgrid::run(&formats).context("export failed")? {
        println!("{}", path.display());
    }
    Ok(())
}
