use std::fmt::Write as _;

use gridpaint_core::surface::DrawSurface;

/// Builds an SVG document from draw calls.
pub struct SvgSurface {
    width: f64,
    height: f64,
    fill: String,
    body: String,
    group_open: bool,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            fill: "#000000".to_string(),
            body: String::new(),
            group_open: false,
        }
    }

    /// Close open elements and return the complete document.
    pub fn finish(mut self) -> String {
        if self.group_open {
            self.body.push_str("</g>\n");
        }
        let mut doc = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xml:space="preserve" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        doc.push_str(&self.body);
        doc.push_str("</svg>\n");
        doc
    }
}

impl DrawSurface for SvgSurface {
    fn set_fill_style(&mut self, style: &str) {
        self.fill.clear();
        escape_into(&mut self.fill, style);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"/>"#,
            self.fill
        );
    }

    fn set_font(&mut self, font: &str) {
        if self.group_open {
            self.body.push_str("</g>\n");
        }
        self.body.push_str(r#"<g style="font: "#);
        escape_into(&mut self.body, font);
        self.body.push_str("\">\n");
        self.group_open = true;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = write!(self.body, r#"<text x="{x}" y="{y}" fill="{}">"#, self.fill);
        escape_into(&mut self.body, text);
        self.body.push_str("</text>\n");
    }
}

fn escape_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            // Not allowed anywhere in an XML 1.0 document, even escaped
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => out.push(char::REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpaint_core::config::GridConfig;
    use gridpaint_core::painter::GridPainter;

    #[test]
    fn paints_rects_and_escaped_text() {
        let raw = [
            b'<', 0, 0, 0, 255, 0, 0, 0, 0, 255, 0, 0, //
            b'&', 0, 0, 0, 0, 255, 0, 0, 0, 0, 0, 0,
        ];
        let mut svg = SvgSurface::new(24.0, 24.0);
        GridPainter::new(GridConfig::with_size(2, 1))
            .unwrap()
            .paint(&raw, &mut svg)
            .unwrap();
        let doc = svg.finish();

        assert!(doc.starts_with("<svg "));
        assert!(doc.contains(r#"<g style="font: 24px monospace">"#));
        assert!(doc.contains(r##"<rect x="0" y="0" width="12" height="24" fill="#0000ff"/>"##));
        assert!(doc.contains(r##"fill="#ff0000">&lt;</text>"##));
        let baseline = 0.8 * 24.0;
        assert!(doc.contains(&format!(r##"<text x="12" y="{baseline}" fill="#00ff00">&amp;</text>"##)));
        assert!(doc.trim_end().ends_with("</g>\n</svg>"));
    }

    #[test]
    fn zeroed_buffer_yields_valid_xml_chars() {
        let raw = [0u8; 12];
        let mut svg = SvgSurface::new(12.0, 24.0);
        GridPainter::new(GridConfig::with_size(1, 1))
            .unwrap()
            .paint(&raw, &mut svg)
            .unwrap();
        let doc = svg.finish();

        assert!(!doc.contains('\0'));
        assert!(doc.contains("fill=\"#000000\">\u{fffd}</text>"));
    }

    #[test]
    fn escape_keeps_xml_whitespace_and_drops_noncharacters() {
        let mut out = String::new();
        escape_into(&mut out, "a\tb\u{1b}\u{ffff}\u{fffe}<");
        assert_eq!(out, "a\tb\u{fffd}\u{fffd}\u{fffd}&lt;");
    }
}
