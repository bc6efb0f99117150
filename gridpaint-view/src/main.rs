mod render;
mod svg;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use log::{info, warn};

use gridpaint_core::config::GridConfig;
use gridpaint_core::decode::GridReader;
use gridpaint_core::painter::GridPainter;
use gridpaint_core::surface::RecordingSurface;

use crate::render::TerminalSurface;
use crate::svg::SvgSurface;

#[derive(Parser)]
#[command(name = "gridpaint-view", about = "Paint a cell grid buffer")]
struct Cli {
    /// Path to a .grid snapshot (or a bare buffer with --raw)
    input: PathBuf,

    /// Input is a bare cell buffer; geometry comes from flags or --config
    #[arg(long)]
    raw: bool,

    /// JSON grid config used for --raw input
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid columns (overrides config)
    #[arg(long)]
    cols: Option<usize>,

    /// Grid rows (overrides config)
    #[arg(long)]
    rows: Option<usize>,

    /// Cell width in surface units (overrides config)
    #[arg(long)]
    font_width: Option<u32>,

    /// Cell height in surface units (overrides config)
    #[arg(long)]
    font_height: Option<u32>,

    /// Write an SVG document instead of drawing in the terminal
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print every draw command instead of drawing
    #[arg(long)]
    trace: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (config, buffer) = load(&cli)?;
    let painter = GridPainter::new(config)?;

    if cli.trace {
        let mut surface = RecordingSurface::new();
        painter.paint(&buffer, &mut surface)?;
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for cmd in &surface.commands {
            writeln!(out, "{cmd}")?;
        }
        out.flush()?;
        return Ok(());
    }

    if let Some(path) = &cli.svg {
        let cfg = painter.config();
        let mut surface = SvgSurface::new(
            (cfg.cols as u64 * u64::from(cfg.font_width)) as f64,
            (cfg.rows as u64 * u64::from(cfg.font_height)) as f64,
        );
        let stats = painter.paint(&buffer, &mut surface)?;
        std::fs::write(path, surface.finish())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {} cells ({} glyphs) to {}", stats.cells, stats.glyphs, path.display());
        return Ok(());
    }

    let cfg = painter.config();
    let mut surface = TerminalSurface::new(cfg.cols, cfg.rows, cfg.font_width, cfg.font_height);
    painter.paint(&buffer, &mut surface)?;
    view(&surface)
}

/// Read the input and work out the grid geometry it was made for.
fn load(cli: &Cli) -> anyhow::Result<(GridConfig, Vec<u8>)> {
    if !cli.raw {
        if cli.config.is_some()
            || cli.cols.is_some()
            || cli.rows.is_some()
            || cli.font_width.is_some()
            || cli.font_height.is_some()
        {
            warn!("--config, --cols, --rows, --font-width and --font-height are ignored for snapshots; using the snapshot header");
        }
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open {}", cli.input.display()))?;
        let reader = GridReader::new(BufReader::new(file))
            .with_context(|| format!("failed to read snapshot {}", cli.input.display()))?;
        let config = reader.header.config();
        let buffer = reader
            .read_cells()
            .with_context(|| format!("failed to decode snapshot {}", cli.input.display()))?;
        return Ok((config, buffer));
    }

    let mut config = match &cli.config {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };

    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(w) = cli.font_width {
        config.font_width = w;
    }
    if let Some(h) = cli.font_height {
        config.font_height = h;
    }

    let buffer = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    Ok((config, buffer))
}

/// Show the painted grid until a quit key. Arrows (or hjkl) pan when the
/// grid is bigger than the terminal; PageUp/PageDown move a screen at a time.
fn view(surface: &TerminalSurface) -> anyhow::Result<()> {
    // Set up panic hook for terminal cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        cleanup_terminal();
        original_hook(info);
    }));

    terminal::enable_raw_mode()?;
    let stdout = std::io::stdout();
    let mut stdout = BufWriter::with_capacity(256 * 1024, stdout.lock());
    stdout.write_all(b"\x1b[?1049h")?; // enter alternate screen
    stdout.write_all(b"\x1b[?25l")?; // hide cursor
    stdout.flush()?;

    let result = run_view_loop(surface, &mut stdout);

    stdout.write_all(b"\x1b[0m")?; // reset colors
    stdout.write_all(b"\x1b[?25h")?; // show cursor
    stdout.write_all(b"\x1b[?1049l")?; // leave alternate screen
    stdout.flush()?;
    terminal::disable_raw_mode()?;

    result
}

fn run_view_loop(surface: &TerminalSurface, stdout: &mut impl Write) -> anyhow::Result<()> {
    let mut render_buf = Vec::with_capacity(256 * 1024);
    let (mut left, mut top) = (0usize, 0usize);
    let mut dirty = true;

    loop {
        let (term_cols, term_rows) = terminal::size()?;
        let (width, height) = (term_cols as usize, term_rows as usize);
        let max_left = surface.cols().saturating_sub(width);
        let max_top = surface.rows().saturating_sub(height);
        left = left.min(max_left);
        top = top.min(max_top);

        if dirty {
            surface.render(left, top, width, height, &mut render_buf);
            stdout.write_all(&render_buf)?;
            stdout.flush()?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => {
                let before = (left, top);
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Left | KeyCode::Char('h') => left = left.saturating_sub(1),
                    KeyCode::Right | KeyCode::Char('l') => left = (left + 1).min(max_left),
                    KeyCode::Up | KeyCode::Char('k') => top = top.saturating_sub(1),
                    KeyCode::Down | KeyCode::Char('j') => top = (top + 1).min(max_top),
                    KeyCode::PageUp => top = top.saturating_sub(height),
                    KeyCode::PageDown => top = (top + height).min(max_top),
                    KeyCode::Home => {
                        left = 0;
                        top = 0;
                    }
                    _ => {}
                }
                dirty = (left, top) != before;
            }
            Event::Resize(..) => dirty = true,
            _ => {}
        }
    }
}

fn cleanup_terminal() {
    let _ = std::io::stdout().write_all(b"\x1b[0m\x1b[?25h\x1b[?1049l");
    let _ = std::io::stdout().flush();
    let _ = terminal::disable_raw_mode();
}
