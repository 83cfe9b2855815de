//! Named shapes rasterized into boolean masks.
//!
//! A mask is row-major with `width * height` cells; `true` marks a cell inside
//! the shape. The same masks seed obstacles and initial density.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::{FluidError, Result};
use crate::state::idx_inner;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
    Ellipse,
    Rectangle,
    Semicircle,
    Custom,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Semicircle => "semicircle",
            ShapeKind::Custom => "custom",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = FluidError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(ShapeKind::Square),
            "circle" => Ok(ShapeKind::Circle),
            "triangle" => Ok(ShapeKind::Triangle),
            "ellipse" => Ok(ShapeKind::Ellipse),
            "rectangle" => Ok(ShapeKind::Rectangle),
            "semicircle" => Ok(ShapeKind::Semicircle),
            "custom" => Ok(ShapeKind::Custom),
            _ => Err(FluidError::UnknownShape(s.to_string())),
        }
    }
}

/// Loose parameter bag, as it arrives from a config file or a request.
/// Only the fields relevant to the chosen shape are read.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    pub size: Option<usize>,
    pub radius: Option<f64>,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub x1: Option<usize>,
    pub y1: Option<usize>,
    pub x2: Option<usize>,
    pub y2: Option<usize>,
    pub mask: Option<Vec<Vec<bool>>>,
}

/// A shape with its parameters. `None` means "use the grid-relative default".
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Centered axis-aligned block. Default side: `min(W, H) / 4`.
    Square { size: Option<usize> },
    /// Disc around the grid center. Default radius: `min(W, H) / 4`.
    Circle { radius: Option<f64> },
    /// Left-aligned taper: row `j` fills `size * (1 - j/H)` columns. Default size: `W`.
    Triangle { size: Option<usize> },
    /// Axis-aligned ellipse around the grid center. Defaults: `rx = W/4`, `ry = H/6`.
    Ellipse { rx: Option<f64>, ry: Option<f64> },
    /// Inclusive corner coordinates, clipped to the grid.
    Rectangle { x1: usize, y1: usize, x2: usize, y2: usize },
    /// Upper half of a circle (rows `y <= cy`).
    Semicircle { radius: Option<f64> },
    /// Caller-supplied rows; must match the grid exactly.
    Custom { mask: Vec<Vec<bool>> },
}

impl Shape {
    /// Build a shape from its name and a parameter bag.
    pub fn from_name(name: &str, params: ShapeParams) -> Result<Self> {
        let kind: ShapeKind = name.parse()?;
        Self::from_kind(kind, params)
    }

    pub fn from_kind(kind: ShapeKind, params: ShapeParams) -> Result<Self> {
        let shape = match kind {
            ShapeKind::Square => Shape::Square { size: params.size },
            ShapeKind::Circle => Shape::Circle { radius: params.radius },
            ShapeKind::Triangle => Shape::Triangle { size: params.size },
            ShapeKind::Ellipse => Shape::Ellipse { rx: params.rx, ry: params.ry },
            ShapeKind::Rectangle => {
                let need = |v: Option<usize>, param| {
                    v.ok_or(FluidError::MissingShapeParam { shape: "rectangle", param })
                };
                Shape::Rectangle {
                    x1: need(params.x1, "x1")?,
                    y1: need(params.y1, "y1")?,
                    x2: need(params.x2, "x2")?,
                    y2: need(params.y2, "y2")?,
                }
            }
            ShapeKind::Semicircle => Shape::Semicircle { radius: params.radius },
            ShapeKind::Custom => Shape::Custom {
                mask: params
                    .mask
                    .ok_or(FluidError::MissingShapeParam { shape: "custom", param: "mask" })?,
            },
        };
        Ok(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Square { .. } => ShapeKind::Square,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Triangle { .. } => ShapeKind::Triangle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Semicircle { .. } => ShapeKind::Semicircle,
            Shape::Custom { .. } => ShapeKind::Custom,
        }
    }

    /// Rasterize into a row-major `width * height` mask.
    pub fn rasterize(&self, width: usize, height: usize) -> Result<Vec<bool>> {
        let short = width.min(height);
        // Integer grid center, shared by every centered shape.
        let cx = (width / 2) as f64;
        let cy = (height / 2) as f64;

        match self {
            Shape::Square { size } => {
                let s = size.unwrap_or(short / 4);
                let x0 = width.saturating_sub(s) / 2;
                let y0 = height.saturating_sub(s) / 2;
                let (x1, y1) = ((x0 + s).min(width), (y0 + s).min(height));
                Ok(mask_from_fn(width, height, |x, y| (x0..x1).contains(&x) && (y0..y1).contains(&y)))
            }
            Shape::Circle { radius } => {
                let r = non_negative("circle", "radius", radius.unwrap_or((short / 4) as f64))?;
                Ok(disc(width, height, cx, cy, r, false))
            }
            Shape::Semicircle { radius } => {
                let r = non_negative("semicircle", "radius", radius.unwrap_or((short / 4) as f64))?;
                Ok(disc(width, height, cx, cy, r, true))
            }
            Shape::Triangle { size } => {
                let s = size.unwrap_or(width) as f64;
                let h = height as f64;
                Ok(mask_from_fn(width, height, |x, y| {
                    let limit = (s * (1.0 - y as f64 / h)).floor() as usize;
                    x < limit
                }))
            }
            Shape::Ellipse { rx, ry } => {
                let rx = positive("ellipse", "rx", rx.unwrap_or(width as f64 / 4.0))?;
                let ry = positive("ellipse", "ry", ry.unwrap_or(height as f64 / 6.0))?;
                Ok(mask_from_fn(width, height, |x, y| {
                    let ex = (x as f64 - cx) / rx;
                    let ey = (y as f64 - cy) / ry;
                    ex * ex + ey * ey <= 1.0
                }))
            }
            Shape::Rectangle { x1, y1, x2, y2 } => {
                let (xa, xb) = (*x1.min(x2), *x1.max(x2));
                let (ya, yb) = (*y1.min(y2), *y1.max(y2));
                Ok(mask_from_fn(width, height, |x, y| x >= xa && x <= xb && y >= ya && y <= yb))
            }
            Shape::Custom { mask } => flatten_mask(mask, width, height),
        }
    }
}

/// Flatten caller-supplied rows into a row-major mask, rejecting any shape
/// other than exactly `height` rows of `width` cells.
pub fn flatten_mask(rows: &[Vec<bool>], width: usize, height: usize) -> Result<Vec<bool>> {
    let bad_row = rows.iter().find(|row| row.len() != width);
    if rows.len() != height || bad_row.is_some() {
        let cols = bad_row.or(rows.first()).map_or(0, |row| row.len());
        return Err(FluidError::MaskShapeMismatch {
            expected: (height, width),
            found: (rows.len(), cols),
        });
    }
    Ok(rows.iter().flatten().copied().collect())
}

fn mask_from_fn(width: usize, height: usize, inside: impl Fn(usize, usize) -> bool) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    for y in 0..height {
        for x in 0..width {
            mask[idx_inner(x, y, width)] = inside(x, y);
        }
    }
    mask
}

fn disc(width: usize, height: usize, cx: f64, cy: f64, r: f64, upper_half: bool) -> Vec<bool> {
    mask_from_fn(width, height, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        dx * dx + dy * dy <= r * r && (!upper_half || y as f64 <= cy)
    })
}

/// A zero radius still marks the center cell, so small grids keep a disc.
fn non_negative(shape: &'static str, param: &'static str, value: f64) -> Result<f64> {
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(FluidError::InvalidShapeParam { shape, param, value })
    }
}

fn positive(shape: &'static str, param: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(FluidError::InvalidShapeParam { shape, param, value })
    }
}
