//! Text serialization of the result scene.
//!
//! Records are bracketed `[OBJECT ...]` blocks: one per matrix, one per
//! polyline set. Coordinates are written with at most eight decimals, without
//! trailing zeros, and anything below `1e-6` in magnitude prints as `0`.

use std::io::Write;

use super::path::Polyline;
use crate::error::{Error, Result};
use crate::math::Mat4;
use crate::scene::LineColor;

/// Values smaller than this in magnitude print as exactly zero.
const ZERO_CUTOFF: f64 = 1e-6;

/// Named group of polylines sharing display attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineSet {
    pub name: String,
    pub color: Option<LineColor>,
    pub width: Option<f64>,
    pub polylines: Vec<Polyline>,
}

impl PolylineSet {
    pub fn total_length(&self) -> f64 {
        self.polylines.iter().map(Polyline::length).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.polylines.iter().map(|line| line.points.len()).sum()
    }
}

/// Formats one real. Non-finite input is an upstream bug and fails the write.
pub fn format_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::NonFiniteCoordinate { value });
    }
    if value.abs() < ZERO_CUTOFF {
        return Ok("0".to_string());
    }

    let mut text = format!("{value:.8}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    Ok(text)
}

/// Writes `[OBJECT <name> [MATRIX ...]]`.
pub fn write_matrix<W: Write>(out: &mut W, name: &str, matrix: &Mat4) -> Result<()> {
    writeln!(out, "[OBJECT {name}")?;
    writeln!(out, "    [MATRIX")?;
    for row in matrix.rows() {
        let cells = row.iter().map(|&v| format_real(v)).collect::<Result<Vec<_>>>()?;
        writeln!(out, "\t{}", cells.join(" "))?;
    }
    writeln!(out, "    ]")?;
    writeln!(out, "]")?;
    Ok(())
}

/// Writes one polyline set as an object of `[POLYLINE n ...]` records.
pub fn write_polyline_set<W: Write>(out: &mut W, set: &PolylineSet) -> Result<()> {
    write!(out, "[OBJECT")?;
    match set.color {
        Some(LineColor::Indexed(index)) => write!(out, " [COLOR {index}]")?,
        Some(LineColor::Rgb([r, g, b])) => write!(out, " [RGB \"{r},{g},{b}\"]")?,
        None => {}
    }
    if let Some(width) = set.width {
        write!(out, " [WIDTH {}]", format_real(width)?)?;
    }
    writeln!(out, " {}", set.name)?;

    for polyline in &set.polylines {
        writeln!(out, "    [POLYLINE {}", polyline.points.len())?;
        for p in &polyline.points {
            writeln!(
                out,
                "\t[{} {} {}]",
                format_real(p.x)?,
                format_real(p.y)?,
                format_real(p.z)?
            )?;
        }
        writeln!(out, "    ]")?;
    }
    writeln!(out, "]")?;
    Ok(())
}
