//! Wavefront OBJ reader
//!
//! Supported subset: `v`, `vn`, `vt` and triangular `f` records. Blank lines
//! and `#` comments are skipped, and `o`/`g`/`s` grouping records are
//! ignored. Anything else (materials, lines, polygons with more than three
//! corners) fails the whole load.

use softgl_math::{Vec3, Vec4};

use crate::mesh::{IndexTriple, Mesh};
use crate::AssetError;

/// Parse OBJ text into a validated mesh
pub(crate) fn parse(source: &str) -> Result<Mesh, AssetError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut textures = Vec::new();
    let mut indices = Vec::new();

    for (number, raw) in source.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut fields = content.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };
        let args: Vec<&str> = fields.collect();

        match keyword {
            "v" => {
                let values = floats(line, &args, 3, 4)?;
                let w = values.get(3).copied().unwrap_or(1.0);
                positions.push(Vec4::new(values[0], values[1], values[2], w));
            }
            "vn" => {
                let values = floats(line, &args, 3, 3)?;
                normals.push(Vec4::direction(values[0], values[1], values[2]));
            }
            "vt" => {
                let values = floats(line, &args, 2, 3)?;
                let w = values.get(2).copied().unwrap_or(1.0);
                textures.push(Vec3::new(values[0], values[1], w));
            }
            "f" => {
                if args.len() != 3 {
                    return Err(AssetError::parse(
                        line,
                        format!("face has {} corners, only triangles are supported", args.len()),
                    ));
                }
                for corner in &args {
                    indices.push(parse_corner(line, corner)?);
                }
            }
            "o" | "g" | "s" => {}
            other => {
                return Err(AssetError::Unsupported(format!(
                    "OBJ record '{}' at line {}",
                    other, line
                )));
            }
        }
    }

    Mesh::from_parts(positions, normals, textures, indices)
}

/// Parse between `min` and `max` floats
fn floats(line: usize, args: &[&str], min: usize, max: usize) -> Result<Vec<f32>, AssetError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(AssetError::parse(
            line,
            format!("expected {} numbers, found {}", expected, args.len()),
        ));
    }
    args.iter()
        .map(|s| {
            s.parse::<f32>()
                .map_err(|_| AssetError::parse(line, format!("invalid number '{}'", s)))
        })
        .collect()
}

/// Parse one `p`, `p/t`, `p//n` or `p/t/n` corner
fn parse_corner(line: usize, corner: &str) -> Result<IndexTriple, AssetError> {
    let parts: Vec<&str> = corner.split('/').collect();
    if parts.len() > 3 {
        return Err(AssetError::parse(line, format!("malformed face corner '{}'", corner)));
    }

    let position = index(line, parts[0])?
        .ok_or_else(|| AssetError::parse(line, format!("face corner '{}' has no position", corner)))?;
    let texture = match parts.get(1) {
        Some(part) => index(line, part)?,
        None => None,
    };
    let normal = match parts.get(2) {
        Some(part) => index(line, part)?,
        None => None,
    };

    Ok(IndexTriple::new(position, texture, normal))
}

/// Convert a 1-based OBJ index to 0-based; an empty slot is `None`
fn index(line: usize, part: &str) -> Result<Option<usize>, AssetError> {
    if part.is_empty() {
        return Ok(None);
    }
    let value: i64 = part
        .parse()
        .map_err(|_| AssetError::parse(line, format!("invalid index '{}'", part)))?;
    if value < 1 {
        return Err(AssetError::parse(
            line,
            format!("index {} is not a positive 1-based index", value),
        ));
    }
    Ok(Some((value - 1) as usize))
}
