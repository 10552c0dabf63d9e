//! Retained paint primitive
//!
//! A [`Shape`] is what the update pipeline hands to a renderer: an outline
//! built from path commands, a transform, and optional fill and stroke
//! paint. The renderer itself is outside this crate.

use glam::{Mat3, Vec2};

/// Bezier circle approximation constant, `4/3 · (√2 − 1)`.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    /// Consumes one point.
    MoveTo,
    /// Consumes one point.
    LineTo,
    /// Consumes three points: two controls and the end point.
    CubicTo,
    /// Consumes no points.
    Close,
}

impl PathCommand {
    #[inline]
    #[must_use]
    pub fn point_count(self) -> usize {
        match self {
            Self::MoveTo | Self::LineTo => 1,
            Self::CubicTo => 3,
            Self::Close => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPaint {
    pub rgba: [u8; 4],
    pub rule: FillRule,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePaint {
    pub width: f32,
    pub rgba: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    commands: Vec<PathCommand>,
    points: Vec<Vec2>,
    pub transform: Mat3,
    pub fill: Option<FillPaint>,
    pub stroke: Option<StrokePaint>,
    pub visible: bool,
}

impl Default for Shape {
    fn default() -> Self {
        Self::new()
    }
}

impl Shape {
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            points: Vec::new(),
            transform: Mat3::IDENTITY,
            fill: None,
            stroke: None,
            visible: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Clears the outline. Paint and transform are kept.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.points.clear();
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.commands.push(PathCommand::MoveTo);
        self.points.push(p);
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.commands.push(PathCommand::LineTo);
        self.points.push(p);
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        self.commands.push(PathCommand::CubicTo);
        self.points.extend_from_slice(&[c1, c2, p]);
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    /// Appends a raw command stream. Commands whose points are missing are dropped.
    pub fn append_path(&mut self, commands: &[PathCommand], points: &[Vec2]) {
        let mut cursor = 0;
        for &cmd in commands {
            let n = cmd.point_count();
            if cursor + n > points.len() {
                log::warn!("Path command stream ran out of points at {cmd:?}");
                break;
            }
            self.commands.push(cmd);
            self.points.extend_from_slice(&points[cursor..cursor + n]);
            cursor += n;
        }
    }

    /// Appends an axis-aligned rectangle with corner radii `rx`, `ry`.
    ///
    /// Radii are clamped to half the rectangle's size. A NaN radius counts as
    /// zero.
    pub fn append_rect(&mut self, min: Vec2, size: Vec2, rx: f32, ry: f32) {
        let (x, y, w, h) = (min.x, min.y, size.x, size.y);
        // f32::max/min ignore a NaN operand
        let rx = rx.max(0.0).min(w.abs() * 0.5);
        let ry = ry.max(0.0).min(h.abs() * 0.5);

        if rx == 0.0 && ry == 0.0 {
            self.move_to(Vec2::new(x, y));
            self.line_to(Vec2::new(x + w, y));
            self.line_to(Vec2::new(x + w, y + h));
            self.line_to(Vec2::new(x, y + h));
            self.close();
            return;
        }

        let hrx = rx * KAPPA;
        let hry = ry * KAPPA;

        self.move_to(Vec2::new(x + rx, y));
        self.line_to(Vec2::new(x + w - rx, y));
        self.cubic_to(
            Vec2::new(x + w - rx + hrx, y),
            Vec2::new(x + w, y + ry - hry),
            Vec2::new(x + w, y + ry),
        );
        self.line_to(Vec2::new(x + w, y + h - ry));
        self.cubic_to(
            Vec2::new(x + w, y + h - ry + hry),
            Vec2::new(x + w - rx + hrx, y + h),
            Vec2::new(x + w - rx, y + h),
        );
        self.line_to(Vec2::new(x + rx, y + h));
        self.cubic_to(
            Vec2::new(x + rx - hrx, y + h),
            Vec2::new(x, y + h - ry + hry),
            Vec2::new(x, y + h - ry),
        );
        self.line_to(Vec2::new(x, y + ry));
        self.cubic_to(
            Vec2::new(x, y + ry - hry),
            Vec2::new(x + rx - hrx, y),
            Vec2::new(x + rx, y),
        );
        self.close();
    }

    /// Appends an ellipse as four cubic arcs.
    pub fn append_circle(&mut self, center: Vec2, radius: Vec2) {
        let Vec2 { x: cx, y: cy } = center;
        let Vec2 { x: rx, y: ry } = radius;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(Vec2::new(cx + rx, cy));
        self.cubic_to(
            Vec2::new(cx + rx, cy + ky),
            Vec2::new(cx + kx, cy + ry),
            Vec2::new(cx, cy + ry),
        );
        self.cubic_to(
            Vec2::new(cx - kx, cy + ry),
            Vec2::new(cx - rx, cy + ky),
            Vec2::new(cx - rx, cy),
        );
        self.cubic_to(
            Vec2::new(cx - rx, cy - ky),
            Vec2::new(cx - kx, cy - ry),
            Vec2::new(cx, cy - ry),
        );
        self.cubic_to(
            Vec2::new(cx + kx, cy - ry),
            Vec2::new(cx + rx, cy - ky),
            Vec2::new(cx + rx, cy),
        );
        self.close();
    }

    /// Local-space bounds of every outline point (control points included).
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    /// Corners of the local bounds mapped through `transform`, clockwise from the minimum.
    #[must_use]
    pub fn oriented_bounds(&self) -> Option<[Vec2; 4]> {
        let (min, max) = self.bounds()?;
        Some(
            [
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ]
            .map(|p| self.transform.transform_point2(p)),
        )
    }
}

#[inline]
pub(crate) fn to_rgba(color: glam::Vec3, alpha: f32) -> [u8; 4] {
    let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
    [channel(color.x), channel(color.y), channel(color.z), channel(alpha)]
}
