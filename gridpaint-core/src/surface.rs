/// The drawing primitives the painter needs from a 2D target.
///
/// Coordinates are surface units with the origin at the top-left corner.
/// `fill_text` positions text by its baseline origin. A surface whose
/// backing output can fail should buffer and report errors when it is
/// flushed or finished, not from these calls.
pub trait DrawSurface {
    /// Color used by subsequent fills, as `#rrggbb`.
    fn set_fill_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// CSS font shorthand, e.g. `24px monospace`.
    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// One call made against a surface.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SetFillStyle(String),
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    SetFont(String),
    FillText { text: String, x: f64, y: f64 },
}

impl std::fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawCommand::SetFillStyle(style) => write!(f, "fillStyle {style}"),
            DrawCommand::FillRect { x, y, width, height } => write!(f, "fillRect {x} {y} {width} {height}"),
            DrawCommand::SetFont(font) => write!(f, "font {font}"),
            DrawCommand::FillText { text, x, y } => write!(f, "fillText {text:?} {x} {y}"),
        }
    }
}

/// Records every call in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangles paired with the fill style in effect when they were drawn.
    pub fn rects(&self) -> Vec<(String, f64, f64)> {
        self.with_style()
            .filter_map(|(style, cmd)| match cmd {
                DrawCommand::FillRect { x, y, .. } => Some((style.to_string(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    /// Text draws paired with the fill style in effect when they were drawn.
    pub fn texts(&self) -> Vec<(String, String, f64, f64)> {
        self.with_style()
            .filter_map(|(style, cmd)| match cmd {
                DrawCommand::FillText { text, x, y } => Some((style.to_string(), text.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    fn with_style(&self) -> impl Iterator<Item = (&str, &DrawCommand)> + '_ {
        let mut style = "";
        self.commands.iter().map(move |cmd| {
            if let DrawCommand::SetFillStyle(s) = cmd {
                style = s.as_str();
            }
            (style, cmd)
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn set_fill_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::SetFillStyle(style.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect { x, y, width, height });
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::SetFont(font.to_string()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::FillText { text: text.to_string(), x, y });
    }
}
