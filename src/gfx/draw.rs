use super::math::{Color, Rect, Vec2};

const FONT_FAMILY: &str = "Times New Roman";

/// Immediate-mode canvas that accumulates one SVG document per frame.
pub struct DrawContext {
    viewport: [f64; 2],
    origin: Vec2,
    defs: Vec<String>,
    elements: Vec<String>,
    next_mask: usize,
}

impl DrawContext {
    pub fn new() -> Self {
        Self {
            viewport: [260.0, 200.0],
            origin: Vec2::new(0.0, 0.0),
            defs: Vec::with_capacity(8),
            elements: Vec::with_capacity(64),
            next_mask: 0,
        }
    }

    pub fn begin(&mut self, viewport: [f64; 2]) {
        self.viewport = viewport;
        self.defs.clear();
        self.elements.clear();
        self.next_mask = 0;
    }

    /// Offset applied to everything drawn after this call.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.round_rect(x, y, w, h, 0.0, color);
    }

    pub fn round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let p = self.origin.offset(x, y);
        self.elements.push(format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" fill-opacity="{:.3}"/>"#,
            p.x,
            p.y,
            w,
            h,
            radius,
            color.to_css(),
            color.a
        ));
    }

    /// Draw `shape`, visible only where it overlaps `window`.
    pub fn masked_rect(&mut self, shape: Rect, window: Rect, color: Color) {
        let id = format!("mask{}", self.next_mask);
        self.next_mask += 1;

        let w = self.origin.offset(window.x, window.y);
        self.defs.push(format!(
            r#"<mask id="{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="white"/></mask>"#,
            id, w.x, w.y, window.width, window.height
        ));

        let s = self.origin.offset(shape.x, shape.y);
        self.elements.push(format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{:.3}" mask="url(#{})"/>"#,
            s.x,
            s.y,
            shape.width,
            shape.height,
            color.to_css(),
            color.a,
            id
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f64, color: Color) {
        let p = self.origin.offset(x, y);
        self.elements.push(format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
            p.x,
            p.y,
            FONT_FAMILY,
            size,
            color.to_css(),
            escape(content)
        ));
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Finish the frame and return the SVG document.
    pub fn flush(&mut self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.viewport[0], self.viewport[1], self.viewport[0], self.viewport[1]
        );
        out.push('\n');
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for def in self.defs.drain(..) {
                out.push_str(&def);
            }
            out.push_str("</defs>\n");
        }
        for el in self.elements.drain(..) {
            out.push_str(&el);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }
}

impl Default for DrawContext {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_produces_document_and_clears() {
        let mut draw = DrawContext::new();
        draw.begin([100.0, 50.0]);
        draw.set_origin(Vec2::new(10.0, 5.0));
        draw.rect(1.0, 2.0, 3.0, 4.0, Color::rgba(255, 0, 0, 255));
        draw.text(0.0, 0.0, "a < b", 12.0, Color::rgba(0, 0, 0, 255));
        assert_eq!(draw.element_count(), 2);

        let svg = draw.flush();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"x="11.00" y="7.00""#), "origin not applied: {}", svg);
        assert!(svg.contains("a &lt; b"));
        assert_eq!(draw.element_count(), 0);
    }

    #[test]
    fn test_masked_rect_emits_mask_def() {
        let mut draw = DrawContext::new();
        draw.begin([10.0, 10.0]);
        draw.masked_rect(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            Rect::new(0.0, 2.0, 5.0, 3.0),
            Color::rgba(255, 255, 255, 255),
        );
        let svg = draw.flush();
        assert!(svg.contains(r#"<mask id="mask0">"#));
        assert!(svg.contains(r#"mask="url(#mask0)""#));
    }

    #[test]
    fn test_degenerate_rect_is_skipped() {
        let mut draw = DrawContext::new();
        draw.begin([10.0, 10.0]);
        draw.rect(0.0, 0.0, 0.0, 4.0, Color::rgba(0, 0, 0, 255));
        assert_eq!(draw.element_count(), 0);
    }
}
