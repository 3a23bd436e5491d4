//! Drawing surface fed by the live sample.
//!
//! Coordinates are logical canvas units with the origin at the top-left
//! corner, one pixel per unit on the [`Surface`]. The GUI scales the
//! finished image to whatever rect it has available.

use crate::config::CanvasConfig;
use crate::session::Sample;

pub const MIDI_MAX: f32 = 127.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    pub size: f32,
    pub background: [u8; 3],
    pub stroke: [u8; 3],
}

impl From<&CanvasConfig> for CanvasSpec {
    fn from(config: &CanvasConfig) -> Self {
        Self {
            size: config.size,
            background: config.background,
            stroke: config.stroke,
        }
    }
}

pub fn map_range(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    out_lo + (value - in_lo) / (in_hi - in_lo) * (out_hi - out_lo)
}

impl CanvasSpec {
    /// One controller step spans one stroke width.
    pub fn stroke_width(&self) -> f32 {
        self.size / MIDI_MAX
    }

    /// Higher values draw further right and further up.
    pub fn to_canvas(&self, sample: Sample) -> Point {
        Point {
            x: map_range(sample.x as f32, 0.0, MIDI_MAX, 0.0, self.size),
            y: map_range(sample.y as f32, 0.0, MIDI_MAX, self.size, 0.0),
        }
    }

    pub fn pixels(&self) -> usize {
        self.size.round().max(1.0) as usize
    }
}

/// Square RGB framebuffer. Its size is fixed at construction no matter how
/// much is drawn into it.
pub struct Surface {
    side: usize,
    rgb: Vec<u8>,
}

impl Surface {
    pub fn new(side: usize, background: [u8; 3]) -> Self {
        let mut surface = Self {
            side,
            rgb: vec![0; side * side * 3],
        };
        surface.fill(background);
        surface
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for px in self.rgb.chunks_exact_mut(3) {
            px.copy_from_slice(&color);
        }
    }

    /// Paints every pixel whose centre lies within `width / 2` of the
    /// segment, which rounds both ends.
    pub fn stroke(&mut self, segment: Segment, width: f32, color: [u8; 3]) {
        if self.side == 0 {
            return;
        }
        let radius = width / 2.0;
        let Segment { from: a, to: b } = segment;
        let max = (self.side - 1) as f32;
        let clamp = |v: f32| v.floor().clamp(0.0, max) as usize;

        let (x0, x1) = (clamp(a.x.min(b.x) - radius), clamp(a.x.max(b.x) + radius));
        let (y0, y1) = (clamp(a.y.min(b.y) - radius), clamp(a.y.max(b.y) + radius));

        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        let radius_sq = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq == 0.0 {
                    0.0
                } else {
                    (((px - a.x) * dx + (py - a.y) * dy) / len_sq).clamp(0.0, 1.0)
                };
                let (ex, ey) = (px - (a.x + t * dx), py - (a.y + t * dy));
                if ex * ex + ey * ey <= radius_sq {
                    let i = (y * self.side + x) * 3;
                    self.rgb[i..i + 3].copy_from_slice(&color);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearSignal {
    #[default]
    None,
    ClearRequested,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    Cleared,
    Idle,
    Drew(Segment),
}

pub struct Renderer {
    spec: CanvasSpec,
    cursor: Point,
    clear: ClearSignal,
    surface: Surface,
    dirty: bool,
}

impl Renderer {
    pub fn new(spec: CanvasSpec, start: Sample) -> Self {
        Self {
            cursor: spec.to_canvas(start),
            surface: Surface::new(spec.pixels(), spec.background),
            spec,
            clear: ClearSignal::None,
            dirty: true,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// True once after every change to the surface.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Takes effect on the next [`Renderer::frame`].
    pub fn request_clear(&mut self) {
        self.clear = ClearSignal::ClearRequested;
    }

    pub fn frame(&mut self, sample: Sample) -> Frame {
        let next = self.spec.to_canvas(sample);

        if std::mem::take(&mut self.clear) == ClearSignal::ClearRequested {
            self.surface.fill(self.spec.background);
            self.cursor = next;
            self.dirty = true;
            return Frame::Cleared;
        }

        if next == self.cursor {
            return Frame::Idle;
        }

        let segment = Segment {
            from: self.cursor,
            to: next,
        };
        self.surface
            .stroke(segment, self.spec.stroke_width(), self.spec.stroke);
        self.cursor = next;
        self.dirty = true;
        Frame::Drew(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 3] = [255, 252, 237];
    const INK: [u8; 3] = [0, 0, 0];

    fn spec() -> CanvasSpec {
        CanvasSpec {
            size: 600.0,
            background: BG,
            stroke: INK,
        }
    }

    fn close(a: Point, x: f32, y: f32) -> bool {
        (a.x - x).abs() < 0.5 && (a.y - y).abs() < 0.5
    }

    impl Surface {
        fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
            let i = (y * self.side + x) * 3;
            [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
        }
    }

    fn is_blank(surface: &Surface) -> bool {
        surface.rgb().chunks_exact(3).all(|px| px == BG)
    }

    #[test]
    fn maps_corners_and_midpoint() {
        let spec = spec();
        assert_eq!(spec.to_canvas(Sample { x: 0, y: 0 }), Point { x: 0.0, y: 600.0 });
        assert_eq!(spec.to_canvas(Sample { x: 127, y: 127 }), Point { x: 600.0, y: 0.0 });
        assert!(close(spec.to_canvas(Sample { x: 63, y: 63 }), 298.0, 302.0));
    }

    #[test]
    fn stroke_spans_one_step() {
        let spec = spec();
        let step = spec.to_canvas(Sample { x: 1, y: 0 }).x - spec.to_canvas(Sample::default()).x;
        assert!((spec.stroke_width() - step).abs() < 1e-4);
    }

    #[test]
    fn draws_from_previous_point() {
        let spec = spec();
        let mut renderer = Renderer::new(spec, Sample::default());
        assert!(renderer.take_dirty());
        assert_eq!(renderer.frame(Sample::default()), Frame::Idle);
        assert!(!renderer.take_dirty());

        let moved = Sample { x: 127, y: 127 };
        assert_eq!(
            renderer.frame(moved),
            Frame::Drew(Segment {
                from: Point { x: 0.0, y: 600.0 },
                to: Point { x: 600.0, y: 0.0 },
            })
        );
        assert!(renderer.take_dirty());

        let surface = renderer.surface();
        assert_eq!(surface.pixel(300, 299), INK);
        assert_eq!(surface.pixel(0, 0), BG);
        assert_eq!(surface.pixel(599, 599), BG);
    }

    #[test]
    fn clear_applies_on_next_frame_only() {
        let spec = spec();
        let mut renderer = Renderer::new(spec, Sample::default());
        renderer.frame(Sample { x: 10, y: 10 });
        renderer.request_clear();
        assert!(!is_blank(renderer.surface()));

        let after = Sample { x: 64, y: 64 };
        assert_eq!(renderer.frame(after), Frame::Cleared);
        assert!(is_blank(renderer.surface()));

        let next = Sample { x: 100, y: 64 };
        assert_eq!(
            renderer.frame(next),
            Frame::Drew(Segment {
                from: spec.to_canvas(after),
                to: spec.to_canvas(next),
            })
        );
        assert!(!is_blank(renderer.surface()));
    }

    #[test]
    fn repeated_clear_requests_collapse() {
        let mut renderer = Renderer::new(spec(), Sample::default());
        renderer.request_clear();
        renderer.request_clear();
        assert_eq!(renderer.frame(Sample::default()), Frame::Cleared);
        assert_eq!(renderer.frame(Sample::default()), Frame::Idle);
    }

    #[test]
    fn storage_does_not_grow_with_strokes() {
        let mut renderer = Renderer::new(spec(), Sample::default());
        let bytes = renderer.surface().rgb().len();
        assert_eq!(bytes, 600 * 600 * 3);

        for i in 0..2_000u32 {
            let x = if i % 2 == 0 { 127 } else { 0 };
            renderer.frame(Sample { x, y: (i % 128) as u8 });
        }
        assert_eq!(renderer.surface().rgb().len(), bytes);
        assert_eq!(renderer.surface().side(), 600);
    }

    #[test]
    fn stroke_ends_are_round() {
        let mut surface = Surface::new(50, BG);
        let segment = Segment {
            from: Point { x: 10.0, y: 20.0 },
            to: Point { x: 30.0, y: 20.0 },
        };
        surface.stroke(segment, 600.0 / 127.0, INK);

        // Just past the end point along the line: inside the cap.
        assert_eq!(surface.pixel(31, 19), INK);
        assert_eq!(surface.pixel(8, 19), INK);
        // Diagonally off the end by more than the radius: outside.
        assert_eq!(surface.pixel(32, 22), BG);
        assert_eq!(surface.pixel(35, 19), BG);
    }

    #[test]
    fn stroke_is_clipped_to_the_surface() {
        let mut surface = Surface::new(10, BG);
        surface.stroke(
            Segment {
                from: Point { x: -5.0, y: 5.0 },
                to: Point { x: 15.0, y: 5.0 },
            },
            2.0,
            INK,
        );
        assert_eq!(surface.pixel(0, 4), INK);
        assert_eq!(surface.pixel(9, 4), INK);
        assert_eq!(surface.pixel(5, 0), BG);
    }
}
