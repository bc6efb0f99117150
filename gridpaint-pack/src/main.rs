mod gradient;
mod text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use gridpaint_core::config::{GridConfig, DEFAULT_FONT_HEIGHT, DEFAULT_FONT_WIDTH};
use gridpaint_core::encode::GridWriter;
use gridpaint_core::format::{Cell, CellBuffer, CodepointLayout, Rgb};

use crate::text::layout_text;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    /// Byte layout existing painters expect
    Legacy,
    /// Plain little-endian u32 codepoints
    Le,
}

impl From<Layout> for CodepointLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Legacy => CodepointLayout::Legacy,
            Layout::Le => CodepointLayout::LittleEndian,
        }
    }
}

#[derive(Parser)]
#[command(name = "gridpaint-pack", about = "Build a cell grid buffer from text and colors")]
struct Cli {
    /// Output path (.grid snapshot, or bare buffer with --raw)
    #[arg(short, long)]
    output: PathBuf,

    /// UTF-8 text file to lay out, one line per row
    #[arg(long)]
    text: Option<PathBuf>,

    /// Grid columns
    #[arg(long, default_value = "1000")]
    cols: usize,

    /// Grid rows
    #[arg(long, default_value = "1000")]
    rows: usize,

    /// Cell width recorded in the snapshot header
    #[arg(long, default_value_t = DEFAULT_FONT_WIDTH)]
    font_width: u32,

    /// Cell height recorded in the snapshot header
    #[arg(long, default_value_t = DEFAULT_FONT_HEIGHT)]
    font_height: u32,

    /// Text color
    #[arg(long, default_value = "#c0c0c0")]
    fg: Rgb,

    /// Background color
    #[arg(long, default_value = "#000000")]
    bg: Rgb,

    /// Background gradient: bilinear:TL,TR,BL,BR | linear:STOPS |
    /// angled:DEGREES:STOPS | radial:CX,CY:STOPS, where STOPS is
    /// START,[COLOR[@POS],...]END
    #[arg(long)]
    gradient: Option<String>,

    /// Codepoint byte layout
    #[arg(long, value_enum, default_value = "legacy")]
    layout: Layout,

    /// Write the bare cell buffer without a snapshot header
    #[arg(long)]
    raw: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = GridConfig {
        cols: cli.cols,
        rows: cli.rows,
        font_width: cli.font_width,
        font_height: cli.font_height,
        layout: cli.layout.into(),
        ..GridConfig::default()
    };
    config.validate()?;

    let mut cells = CellBuffer::filled(config.cols, config.rows, config.layout, Cell::blank(cli.bg));

    if let Some(arg) = &cli.gradient {
        let interp = gradient::parse(arg).context("invalid --gradient")?;
        gradient::apply(interp.as_ref(), &mut cells);
    }

    if let Some(path) = &cli.text {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let placed = layout_text(&text, cli.fg, &mut cells);
        info!("Placed {placed} glyphs from {}", path.display());
    }

    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    let mut out = BufWriter::new(file);

    if cli.raw {
        out.write_all(cells.as_bytes())?;
        out.flush()?;
    } else {
        let header = config.header()?;
        GridWriter::new(out).write(&header, cells.as_bytes())?;
    }

    info!(
        "Wrote {}x{} grid ({} bytes of cells) to {}",
        config.cols,
        config.rows,
        config.buffer_len(),
        cli.output.display()
    );
    Ok(())
}
