//! Reader for NumPy `.npy` array files.
//!
//! Supports format versions 1.0, 2.0 and 3.0 with simple (non-structured)
//! boolean, integer and float dtypes. Values are widened to `f64` and always
//! returned in C (row-major) order.

use std::fs;
use std::path::Path;

use crate::error::RenderError;

const MAGIC: &[u8] = b"\x93NUMPY";

/// A decoded array.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    /// Row-major values.
    pub data: Vec<f64>,
}

impl NpyArray {
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Row `i` of a 2-D array.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        match self.shape.as_slice() {
            [rows, cols] if i < *rows => Some(&self.data[i * cols..(i + 1) * cols]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Int,
    Uint,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dtype {
    kind: Kind,
    size: usize,
    big_endian: bool,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, RenderError> {
        let unsupported = || RenderError::Format(format!("unsupported dtype {descr:?}"));

        let (big_endian, rest) = match descr.chars().next() {
            Some('<') | Some('|') => (false, &descr[1..]),
            Some('>') => (true, &descr[1..]),
            Some('=') => (cfg!(target_endian = "big"), &descr[1..]),
            _ => (cfg!(target_endian = "big"), descr),
        };

        let mut chars = rest.chars();
        let kind = match chars.next() {
            Some('b') | Some('?') => Kind::Bool,
            Some('i') => Kind::Int,
            Some('u') => Kind::Uint,
            Some('f') => Kind::Float,
            _ => return Err(unsupported()),
        };
        let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;

        let valid = match kind {
            Kind::Bool => size == 1,
            Kind::Int | Kind::Uint => matches!(size, 1 | 2 | 4 | 8),
            Kind::Float => matches!(size, 4 | 8),
        };
        if !valid {
            return Err(unsupported());
        }
        Ok(Self {
            kind,
            size,
            big_endian,
        })
    }

    fn decode(&self, bytes: &[u8]) -> f64 {
        let mut buf = [0u8; 8];
        buf[..self.size].copy_from_slice(bytes);
        if self.big_endian {
            buf[..self.size].reverse();
        }
        match (self.kind, self.size) {
            (Kind::Bool, _) => f64::from(u8::from(buf[0] != 0)),
            (Kind::Int, 1) => f64::from(buf[0] as i8),
            (Kind::Int, 2) => f64::from(i16::from_le_bytes([buf[0], buf[1]])),
            (Kind::Int, 4) => f64::from(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            (Kind::Int, _) => i64::from_le_bytes(buf) as f64,
            (Kind::Uint, 1) => f64::from(buf[0]),
            (Kind::Uint, 2) => f64::from(u16::from_le_bytes([buf[0], buf[1]])),
            (Kind::Uint, 4) => f64::from(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            (Kind::Uint, _) => u64::from_le_bytes(buf) as f64,
            (Kind::Float, 4) => f64::from(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
            (Kind::Float, _) => f64::from_le_bytes(buf),
        }
    }
}

/// Parsed header dictionary.
#[derive(Debug, PartialEq)]
struct Header {
    descr: String,
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Text following `'key':` in a header dict literal.
fn dict_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    for quote in ['\'', '"'] {
        let needle = format!("{quote}{key}{quote}");
        if let Some(pos) = header.find(&needle) {
            let rest = header[pos + needle.len()..].trim_start();
            return rest.strip_prefix(':').map(str::trim_start);
        }
    }
    None
}

fn parse_header(text: &str) -> Result<Header, RenderError> {
    let bad = |what: &str| RenderError::Format(format!("malformed npy header: {what}"));

    let descr_raw = dict_value(text, "descr").ok_or_else(|| bad("missing 'descr'"))?;
    let quote = descr_raw
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| RenderError::Format("structured dtypes are not supported".into()))?;
    let descr_end = descr_raw[1..]
        .find(quote)
        .ok_or_else(|| bad("unterminated 'descr'"))?;
    let descr = descr_raw[1..1 + descr_end].to_string();

    let fortran_raw =
        dict_value(text, "fortran_order").ok_or_else(|| bad("missing 'fortran_order'"))?;
    let fortran_order = if fortran_raw.starts_with("True") {
        true
    } else if fortran_raw.starts_with("False") {
        false
    } else {
        return Err(bad("'fortran_order' is not a bool"));
    };

    let shape_raw = dict_value(text, "shape").ok_or_else(|| bad("missing 'shape'"))?;
    let shape_body = shape_raw
        .strip_prefix('(')
        .and_then(|s| s.find(')').map(|end| &s[..end]))
        .ok_or_else(|| bad("'shape' is not a tuple"))?;
    let shape = shape_body
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('L').parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad("'shape' holds a non-integer"))?;

    Ok(Header {
        descr,
        fortran_order,
        shape,
    })
}

/// Decode an in-memory `.npy` file.
pub fn parse_npy(bytes: &[u8]) -> Result<NpyArray, RenderError> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(RenderError::Format("not an npy file (bad magic)".into()));
    }
    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(RenderError::Format("truncated npy header".into()));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => {
            return Err(RenderError::Format(format!(
                "unsupported npy format version {v}.{}",
                bytes[7]
            )))
        }
    };

    let data_start = header_start + header_len;
    let header_bytes = bytes
        .get(header_start..data_start)
        .ok_or_else(|| RenderError::Format("truncated npy header".into()))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|_| RenderError::Format("npy header is not valid text".into()))?;
    let header = parse_header(header_text)?;
    let dtype = Dtype::parse(&header.descr)?;

    let count = header
        .shape
        .iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(*d))
        .ok_or_else(|| RenderError::Format("array shape overflows".into()))?;
    let needed = count
        .checked_mul(dtype.size)
        .ok_or_else(|| RenderError::Format("array shape overflows".into()))?;
    let payload = &bytes[data_start..];
    if payload.len() < needed {
        return Err(RenderError::Format(format!(
            "truncated npy data: expected {needed} bytes, found {}",
            payload.len()
        )));
    }

    let mut data: Vec<f64> = payload[..needed]
        .chunks_exact(dtype.size)
        .map(|chunk| dtype.decode(chunk))
        .collect();
    if header.fortran_order && header.shape.len() > 1 {
        data = fortran_to_c(&data, &header.shape);
    }

    Ok(NpyArray {
        shape: header.shape,
        data,
    })
}

/// Reorder column-major values into row-major order.
fn fortran_to_c(data: &[f64], shape: &[usize]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; shape.len()];
    for _ in 0..data.len() {
        let mut offset = 0;
        let mut stride = 1;
        for (i, dim) in index.iter().zip(shape) {
            offset += i * stride;
            stride *= dim;
        }
        out.push(data[offset]);

        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}

/// Read and decode an `.npy` file.
pub fn read_npy(path: &Path) -> Result<NpyArray, RenderError> {
    let bytes = fs::read(path)?;
    parse_npy(&bytes)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    /// Encode a version 1.0 file with a caller-provided header dict.
    pub fn encode_v1(header_dict: &str, payload: &[u8]) -> Vec<u8> {
        let mut header = header_dict.to_string();
        // Pad so that magic + version + length + header is a multiple of 64.
        let unpadded = 10 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut bytes = super::MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    /// Write a little-endian f8 array in C order.
    pub fn write_npy_f8(path: &Path, shape: &[usize], data: &[f64]) {
        let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
        let shape_text = if dims.len() == 1 {
            format!("({},)", dims[0])
        } else {
            format!("({})", dims.join(", "))
        };
        let header =
            format!("{{'descr': '<f8', 'fortran_order': False, 'shape': {shape_text}, }}");
        let payload: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(path, encode_v1(&header, &payload)).unwrap();
    }
}
