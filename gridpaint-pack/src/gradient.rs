//! Background gradients.
//!
//! Colors are blended in floating point and only rounded back to bytes when
//! written into a cell.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use anyhow::{bail, Context};
use gridpaint_core::format::{CellBuffer, Rgb};

/// An RGB color with float channels in `[0, 255]`.
pub type Rgbf = [f32; 3];

pub fn rgbf(c: Rgb) -> Rgbf {
    [f32::from(c.r), f32::from(c.g), f32::from(c.b)]
}

pub fn to_rgb(c: Rgbf) -> Rgb {
    let byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Rgb::new(byte(c[0]), byte(c[1]), byte(c[2]))
}

fn mix(a: Rgbf, b: Rgbf, t: f32) -> Rgbf {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Something that assigns a color to every position of a rectangle.
pub trait Interpolator {
    /// Color at `pos` in a rectangle spanning `(0, 0)..=size`.
    fn interpolate(&self, pos: (f32, f32), size: (f32, f32)) -> Rgbf;
}

/// A one-dimensional gradient over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Linear {
    pub start: Rgbf,
    /// Intermediate `(position, color)` stops, sorted, positions in `[0, 1]`.
    pub middle: Vec<(f32, Rgbf)>,
    pub end: Rgbf,
}

impl Linear {
    pub fn new(start: Rgbf, end: Rgbf) -> Self {
        Self {
            start,
            middle: Vec::new(),
            end,
        }
    }

    /// Parse comma-separated stops: `START,[COLOR[@POS],...]END`.
    /// Middle stops without a position are spread evenly.
    pub fn parse(stops: &str) -> anyhow::Result<Self> {
        let items: Vec<&str> = stops.split(',').map(str::trim).collect();
        if items.len() < 2 {
            bail!("a gradient needs at least two colors, got {stops:?}");
        }
        let last = items.len() - 1;

        let mut colors = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let (color, pos) = match item.split_once('@') {
                Some((color, pos)) => {
                    if i == 0 || i == last {
                        bail!("the first and last stops sit at 0 and 1 and take no position: {item:?}");
                    }
                    let pos: f32 = pos.parse().with_context(|| format!("invalid stop position in {item:?}"))?;
                    (color, pos)
                }
                None => (*item, i as f32 / last as f32),
            };
            if !(0.0..=1.0).contains(&pos) {
                bail!("stop position {pos} is outside [0, 1]");
            }
            colors.push((pos, rgbf(color.parse::<Rgb>()?)));
        }

        if colors.windows(2).any(|w| w[1].0 < w[0].0) {
            bail!("gradient stops must be in increasing order: {stops:?}");
        }

        Ok(Self {
            start: colors[0].1,
            middle: colors[1..last].to_vec(),
            end: colors[last].1,
        })
    }

    /// Color at `x`; anything at or below 0 (or NaN) is the start color,
    /// anything at or above 1 the end color.
    pub fn interpolate(&self, x: f32) -> Rgbf {
        if !(x > 0.0) {
            return self.start;
        }
        if x >= 1.0 {
            return self.end;
        }

        let mut last = (0.0, self.start);
        for point in self.points() {
            if x > point.0 {
                last = point;
                continue;
            }
            let d = point.0 - last.0;
            let t = if d == 0.0 { 0.0 } else { (x - last.0) / d };
            return mix(last.1, point.1, t);
        }
        self.end
    }

    pub fn points(&self) -> impl Iterator<Item = (f32, Rgbf)> + '_ {
        std::iter::once((0.0, self.start))
            .chain(self.middle.iter().copied())
            .chain(std::iter::once((1.0, self.end)))
    }
}

/// A gradient following the distance from a center point.
#[derive(Clone, Debug, PartialEq)]
pub struct Radial {
    /// Ratio of the rectangle size, each component in `[0, 1]`.
    pub center: (f32, f32),
    pub gradient: Linear,
}

impl Interpolator for Radial {
    fn interpolate(&self, pos: (f32, f32), size: (f32, f32)) -> Rgbf {
        // Distance to the furthest corner maps to 1.
        let to_corner = (
            (0.5 + (self.center.0 - 0.5).abs()) * size.0,
            (0.5 + (self.center.1 - 0.5).abs()) * size.1,
        );
        let max_distance = to_corner.0.hypot(to_corner.1);
        if max_distance == 0.0 {
            return self.gradient.start;
        }
        let dx = self.center.0 * size.0 - pos.0;
        let dy = self.center.1 * size.1 - pos.1;
        self.gradient.interpolate(dx.hypot(dy) / max_distance)
    }
}

/// A linear gradient along a direction. An angle of 0 runs top to bottom,
/// `PI / 2` left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct Angled {
    pub angle_rad: f32,
    pub gradient: Linear,
}

impl Interpolator for Angled {
    fn interpolate(&self, mut pos: (f32, f32), mut size: (f32, f32)) -> Rgbf {
        let mut angle = self.angle_rad.rem_euclid(TAU);

        // Fold every quadrant back onto [0, PI/2[ by mirroring the rectangle.
        match angle {
            _ if angle < FRAC_PI_2 => (),
            _ if angle < PI => {
                pos = (size.1 - pos.1, pos.0);
                size = (size.1, size.0);
                angle -= FRAC_PI_2;
            }
            _ if angle < PI + FRAC_PI_2 => {
                pos = (size.0 - pos.0, size.1 - pos.1);
                angle -= PI;
            }
            _ => {
                pos = (pos.1, size.0 - pos.0);
                size = (size.1, size.0);
                angle -= PI + FRAC_PI_2;
            }
        }

        let along = |v: (f32, f32)| v.0 * angle.sin() + v.1 * angle.cos();
        let max = along(size);
        if max == 0.0 {
            return self.gradient.start;
        }
        self.gradient.interpolate(along(pos) / max)
    }
}

/// Four corner colors, blended along x and then along y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bilinear {
    pub top_left: Rgbf,
    pub top_right: Rgbf,
    pub bottom_left: Rgbf,
    pub bottom_right: Rgbf,
}

impl Bilinear {
    /// Parse `TL,TR,BL,BR` hex colors.
    pub fn parse(corners: &str) -> anyhow::Result<Self> {
        let colors = corners
            .split(',')
            .map(|c| c.trim().parse::<Rgb>().map(rgbf))
            .collect::<Result<Vec<_>, _>>()?;
        match colors[..] {
            [top_left, top_right, bottom_left, bottom_right] => Ok(Self {
                top_left,
                top_right,
                bottom_left,
                bottom_right,
            }),
            _ => bail!("bilinear gradient needs four colors (TL,TR,BL,BR), got {}", colors.len()),
        }
    }
}

impl Interpolator for Bilinear {
    fn interpolate(&self, pos: (f32, f32), size: (f32, f32)) -> Rgbf {
        let ratio = |p: f32, s: f32| if s == 0.0 { 0.0 } else { p / s };
        let (x, y) = (ratio(pos.0, size.0), ratio(pos.1, size.1));

        let top = Linear::new(self.top_left, self.top_right).interpolate(x);
        let bottom = Linear::new(self.bottom_left, self.bottom_right).interpolate(x);
        Linear::new(top, bottom).interpolate(y)
    }
}

/// Parse a `--gradient` argument:
///
/// - `bilinear:TL,TR,BL,BR` (or just the four colors)
/// - `linear:STOPS` top to bottom
/// - `angled:DEGREES:STOPS`
/// - `radial:CX,CY:STOPS` with the center as ratios of the grid size
///
/// `STOPS` is `START,[COLOR[@POS],...]END`.
pub fn parse(arg: &str) -> anyhow::Result<Box<dyn Interpolator>> {
    let Some((kind, rest)) = arg.split_once(':') else {
        return Ok(Box::new(Bilinear::parse(arg)?));
    };

    match kind {
        "bilinear" => Ok(Box::new(Bilinear::parse(rest)?)),
        "linear" => Ok(Box::new(Angled {
            angle_rad: 0.0,
            gradient: Linear::parse(rest)?,
        })),
        "angled" => {
            let (degrees, stops) = rest.split_once(':').context("expected angled:DEGREES:STOPS")?;
            let degrees: f32 = degrees
                .trim()
                .parse()
                .with_context(|| format!("invalid angle {degrees:?}"))?;
            Ok(Box::new(Angled {
                angle_rad: degrees.to_radians(),
                gradient: Linear::parse(stops)?,
            }))
        }
        "radial" => {
            let (center, stops) = rest.split_once(':').context("expected radial:CX,CY:STOPS")?;
            let (cx, cy) = center.split_once(',').context("expected a center as CX,CY")?;
            let ratio = |v: &str| -> anyhow::Result<f32> {
                let v: f32 = v.trim().parse().with_context(|| format!("invalid center {center:?}"))?;
                if !(0.0..=1.0).contains(&v) {
                    bail!("center component {v} is outside [0, 1]");
                }
                Ok(v)
            };
            Ok(Box::new(Radial {
                center: (ratio(cx)?, ratio(cy)?),
                gradient: Linear::parse(stops)?,
            }))
        }
        other => bail!("unknown gradient kind {other:?} (expected bilinear, linear, angled or radial)"),
    }
}

/// Replace every cell background, leaving glyphs and foregrounds alone.
/// The rectangle spans cell indices, so corner cells get the corner colors.
pub fn apply(gradient: &dyn Interpolator, cells: &mut CellBuffer) {
    let (cols, rows) = (cells.cols(), cells.rows());
    let size = (cols.saturating_sub(1) as f32, rows.saturating_sub(1) as f32);
    for y in 0..rows {
        for x in 0..cols {
            let mut cell = cells.get(x, y);
            cell.bg = to_rgb(gradient.interpolate((x as f32, y as f32), size));
            cells.set(x, y, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpaint_core::format::{Cell, CodepointLayout};

    const BLACK: Rgbf = [0.0, 0.0, 0.0];
    const WHITE: Rgbf = [255.0, 255.0, 255.0];

    fn color_at(g: &dyn Interpolator, x: f32, y: f32, w: f32, h: f32) -> Rgb {
        to_rgb(g.interpolate((x, y), (w, h)))
    }

    #[test]
    fn linear_passes_through_middle_stops() {
        let mut g = Linear::new(BLACK, BLACK);
        g.middle.push((0.25, WHITE));

        assert_eq!(g.interpolate(0.0), BLACK);
        assert_eq!(g.interpolate(0.25), WHITE);
        assert_eq!(to_rgb(g.interpolate(0.125)), Rgb::new(128, 128, 128));
        assert_eq!(to_rgb(g.interpolate(0.625)), Rgb::new(128, 128, 128));
        assert_eq!(g.interpolate(1.0), BLACK);
        assert_eq!(g.interpolate(f32::NAN), BLACK);
    }

    #[test]
    fn linear_parse_spreads_unpositioned_stops() {
        let g = Linear::parse("#000000, #ffffff, #ff0000@0.75, #000000").unwrap();
        assert_eq!(g.middle, vec![(1.0 / 3.0, WHITE), (0.75, [255.0, 0.0, 0.0])]);

        assert!(Linear::parse("#000000").is_err());
        assert!(Linear::parse("#000000@0.1,#ffffff").is_err());
        assert!(Linear::parse("#000000,#ffffff@0.8,#ff0000@0.2,#000000").is_err());
        assert!(Linear::parse("#000000,#ffffff@1.5,#000000").is_err());
    }

    #[test]
    fn angled_directions() {
        let down = Angled {
            angle_rad: 0.0,
            gradient: Linear::new(BLACK, WHITE),
        };
        assert_eq!(color_at(&down, 3.0, 0.0, 4.0, 2.0), Rgb::BLACK);
        assert_eq!(color_at(&down, 0.0, 2.0, 4.0, 2.0), Rgb::WHITE);

        let right = Angled {
            angle_rad: FRAC_PI_2,
            gradient: Linear::new(BLACK, WHITE),
        };
        assert_eq!(color_at(&right, 0.0, 2.0, 4.0, 2.0), Rgb::BLACK);
        assert_eq!(color_at(&right, 4.0, 0.0, 4.0, 2.0), Rgb::WHITE);
        assert_eq!(color_at(&right, 2.0, 1.0, 4.0, 2.0), Rgb::new(128, 128, 128));

        let up = Angled {
            angle_rad: PI,
            gradient: Linear::new(BLACK, WHITE),
        };
        assert_eq!(color_at(&up, 1.0, 0.0, 4.0, 2.0), Rgb::WHITE);
        assert_eq!(color_at(&up, 1.0, 2.0, 4.0, 2.0), Rgb::BLACK);

        // Diagonal: opposite corners are the two ends.
        let diagonal = Angled {
            angle_rad: PI / 4.0,
            gradient: Linear::new(BLACK, WHITE),
        };
        assert_eq!(color_at(&diagonal, 0.0, 0.0, 4.0, 4.0), Rgb::BLACK);
        assert_eq!(color_at(&diagonal, 4.0, 4.0, 4.0, 4.0), Rgb::WHITE);
    }

    #[test]
    fn radial_center_and_corners() {
        let g = Radial {
            center: (0.5, 0.5),
            gradient: Linear::new(WHITE, BLACK),
        };
        assert_eq!(color_at(&g, 2.0, 2.0, 4.0, 4.0), Rgb::WHITE);
        assert_eq!(color_at(&g, 0.0, 0.0, 4.0, 4.0), Rgb::BLACK);
        assert_eq!(color_at(&g, 4.0, 4.0, 4.0, 4.0), Rgb::BLACK);

        let corner = Radial {
            center: (0.0, 0.0),
            gradient: Linear::new(WHITE, BLACK),
        };
        assert_eq!(color_at(&corner, 0.0, 0.0, 4.0, 4.0), Rgb::WHITE);
        assert_eq!(color_at(&corner, 4.0, 4.0, 4.0, 4.0), Rgb::BLACK);
        assert_eq!(color_at(&corner, 0.0, 0.0, 0.0, 0.0), Rgb::WHITE);
    }

    #[test]
    fn bilinear_corners_are_exact() {
        let g = Bilinear::parse("#ff0000,#00ff00,#0000ff,#ffffff").unwrap();
        assert_eq!(color_at(&g, 0.0, 0.0, 9.0, 4.0), Rgb::new(255, 0, 0));
        assert_eq!(color_at(&g, 9.0, 0.0, 9.0, 4.0), Rgb::new(0, 255, 0));
        assert_eq!(color_at(&g, 0.0, 4.0, 9.0, 4.0), Rgb::new(0, 0, 255));
        assert_eq!(color_at(&g, 9.0, 4.0, 9.0, 4.0), Rgb::WHITE);
    }

    #[test]
    fn bilinear_midpoint_blends() {
        let g = Bilinear::parse("000000,000000,c8c8c8,c8c8c8").unwrap();
        assert_eq!(color_at(&g, 3.0, 1.0, 6.0, 2.0), Rgb::new(100, 100, 100));
        assert_eq!(color_at(&g, 0.0, 0.0, 0.0, 0.0), Rgb::BLACK);
        assert!(Bilinear::parse("#000000,#ffffff").is_err());
        assert!(Bilinear::parse("#000000,#ffffff,#zzzzzz,#000000").is_err());
    }

    #[test]
    fn parse_dispatches_on_kind() {
        let cases = [
            "#000000,#000000,#ffffff,#ffffff",
            "bilinear:#000000,#000000,#ffffff,#ffffff",
            "linear:#000000,#ffffff",
            "angled:0:#000000,#ffffff",
            "radial:0.5,0:#000000,#808080@0.5,#ffffff",
        ];
        for arg in cases {
            let g = parse(arg).unwrap();
            assert_eq!(color_at(g.as_ref(), 2.0, 0.0, 4.0, 4.0), Rgb::BLACK, "{arg}");
            assert!(color_at(g.as_ref(), 2.0, 4.0, 4.0, 4.0).r > 200, "{arg}");
        }

        assert!(parse("spiral:#000000,#ffffff").is_err());
        assert!(parse("angled:#000000,#ffffff").is_err());
        assert!(parse("radial:2,0:#000000,#ffffff").is_err());
    }

    #[test]
    fn apply_keeps_glyphs() {
        let mut cells = CellBuffer::filled(3, 2, CodepointLayout::Legacy, Cell::blank(Rgb::BLACK));
        cells.set(1, 0, Cell::new('g', Rgb::WHITE, Rgb::BLACK));
        let g = parse("linear:#000000,#ffffff").unwrap();
        apply(g.as_ref(), &mut cells);

        assert_eq!(cells.get(1, 0).glyph(), 'g');
        assert_eq!(cells.get(1, 0).bg, Rgb::BLACK);
        assert_eq!(cells.get(2, 1).bg, Rgb::WHITE);
    }
}
