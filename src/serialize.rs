//! Versioned byte layout shared by [`Plaintext`](crate::Plaintext) and
//! [`Ciphertext`](crate::Ciphertext).
//!
//! ```text
//! magic "LHE" | version u8 | kind u8 | fingerprint [u8; 32] | level u32
//! | scale f64 | polynomial count u32 | channel count u32 | degree u32
//! | coefficients u64 × count × channels × degree
//! ```
//!
//! All integers are little-endian.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::{
    errors::KeyMismatchError,
    params::{Fingerprint, ParameterSet},
};

pub const MAGIC: [u8; 3] = *b"LHE";
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 3 + 1 + 1 + Fingerprint::LEN + 4 + 8 + 4 + 4 + 4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("buffer truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported format version {version}")]
    UnsupportedVersion { version: u8 },
    #[error("wrong object kind: expected {expected:#04x}, found {found:#04x}")]
    WrongKind { expected: u8, found: u8 },
    #[error(transparent)]
    ParameterMismatch(#[from] KeyMismatchError),
    #[error("level {level} is not valid here (max level {max_level})")]
    InvalidLevel { level: u32, max_level: usize },
    #[error("shape mismatch: {reason}")]
    ShapeMismatch { reason: String },
    #[error("coefficient {value} not reduced modulo {modulus}")]
    CoefficientOutOfRange { value: u64, modulus: u64 },
    #[error("{extra} trailing bytes after the last coefficient")]
    TrailingBytes { extra: usize },
    #[error("invalid scale {scale}")]
    InvalidScale { scale: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ObjectKind {
    Plaintext = 0x01,
    Ciphertext = 0x02,
}

impl ObjectKind {
    fn poly_count(self) -> usize {
        match self {
            Self::Plaintext => 1,
            Self::Ciphertext => 2,
        }
    }
}

/// A parsed and validated object body.
#[derive(Debug)]
pub(crate) struct DecodedObject {
    pub level: usize,
    pub scale: f64,
    /// `polys[k][channel][coefficient]`
    pub polys: Vec<Vec<Vec<u64>>>,
}

pub(crate) fn write_object(
    kind: ObjectKind,
    fingerprint: Fingerprint,
    level: usize,
    scale: f64,
    polys: &[&[Vec<u64>]],
) -> Vec<u8> {
    let channel_count = polys.first().map_or(0, |p| p.len());
    let degree = polys
        .first()
        .and_then(|p| p.first())
        .map_or(0, |c| c.len());
    let words: usize = polys.iter().flat_map(|p| p.iter()).map(Vec::len).sum();
    let mut out = vec![0u8; HEADER_LEN + words * size_of::<u64>()];

    let (header, body) = out.split_at_mut(HEADER_LEN);
    let (magic, rest) = header.split_at_mut(MAGIC.len());
    magic.copy_from_slice(&MAGIC);
    rest[0] = FORMAT_VERSION;
    rest[1] = kind as u8;
    let (digest, fields) = rest[2..].split_at_mut(Fingerprint::LEN);
    digest.copy_from_slice(fingerprint.as_bytes());
    LittleEndian::write_u32(&mut fields[0..4], level as u32);
    LittleEndian::write_u64(&mut fields[4..12], scale.to_bits());
    LittleEndian::write_u32(&mut fields[12..16], polys.len() as u32);
    LittleEndian::write_u32(&mut fields[16..20], channel_count as u32);
    LittleEndian::write_u32(&mut fields[20..24], degree as u32);

    let mut offset = 0;
    for channel in polys.iter().flat_map(|p| p.iter()) {
        let end = offset + channel.len() * size_of::<u64>();
        LittleEndian::write_u64_into(channel, &mut body[offset..end]);
        offset = end;
    }
    out
}

struct Header {
    version: u8,
    kind: u8,
    fingerprint: Fingerprint,
    level: u32,
    scale: f64,
    poly_count: u32,
    channel_count: u32,
    degree: u32,
}

fn read_header(reader: &mut &[u8]) -> std::io::Result<([u8; 3], Header)> {
    let mut magic = [0u8; 3];
    std::io::Read::read_exact(reader, &mut magic)?;
    let version = reader.read_u8()?;
    let kind = reader.read_u8()?;
    let mut fingerprint = [0u8; Fingerprint::LEN];
    std::io::Read::read_exact(reader, &mut fingerprint)?;
    let header = Header {
        version,
        kind,
        fingerprint: Fingerprint::from_bytes(fingerprint),
        level: reader.read_u32::<LittleEndian>()?,
        scale: f64::from_bits(reader.read_u64::<LittleEndian>()?),
        poly_count: reader.read_u32::<LittleEndian>()?,
        channel_count: reader.read_u32::<LittleEndian>()?,
        degree: reader.read_u32::<LittleEndian>()?,
    };
    Ok((magic, header))
}

/// Parses `bytes` as an object of `kind` belonging to `params`.
///
/// Integer plaintexts must sit at the top level with one channel modulo `t`;
/// everything else carries one channel per active prime of its level.
pub(crate) fn read_object(
    bytes: &[u8],
    kind: ObjectKind,
    params: &ParameterSet,
) -> Result<DecodedObject, FormatError> {
    if bytes.len() < HEADER_LEN {
        return Err(FormatError::Truncated {
            needed: HEADER_LEN,
            available: bytes.len(),
        });
    }
    let mut reader = bytes;
    let (magic, header) = read_header(&mut reader).map_err(|_| FormatError::Truncated {
        needed: HEADER_LEN,
        available: bytes.len(),
    })?;

    if magic != MAGIC {
        return Err(FormatError::BadMagic);
    }
    if header.version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            version: header.version,
        });
    }
    if header.kind != kind as u8 {
        return Err(FormatError::WrongKind {
            expected: kind as u8,
            found: header.kind,
        });
    }
    params.check_fingerprint(header.fingerprint)?;

    let level = header.level as usize;
    let integer_plaintext = kind == ObjectKind::Plaintext && params.scheme().is_integer();
    let moduli: Vec<u64> = match (integer_plaintext, params.plain_modulus()) {
        _ if level > params.max_level() => {
            return Err(FormatError::InvalidLevel {
                level: header.level,
                max_level: params.max_level(),
            });
        }
        (true, _) if level != params.max_level() => {
            return Err(FormatError::InvalidLevel {
                level: header.level,
                max_level: params.max_level(),
            });
        }
        (true, Some(t)) => vec![t],
        _ => params.coeff_modulus()[..=level].to_vec(),
    };

    let scale = header.scale;
    let scale_ok = if params.scheme().is_integer() {
        scale == 1.0
    } else {
        scale.is_finite() && scale >= 1.0
    };
    if !scale_ok {
        return Err(FormatError::InvalidScale { scale });
    }

    let poly_count = kind.poly_count();
    if header.poly_count as usize != poly_count {
        return Err(FormatError::ShapeMismatch {
            reason: format!(
                "expected {poly_count} polynomials, found {}",
                header.poly_count
            ),
        });
    }
    if header.channel_count as usize != moduli.len() {
        return Err(FormatError::ShapeMismatch {
            reason: format!(
                "expected {} channels at level {level}, found {}",
                moduli.len(),
                header.channel_count
            ),
        });
    }
    let degree = params.degree();
    if header.degree as usize != degree {
        return Err(FormatError::ShapeMismatch {
            reason: format!("expected degree {degree}, found {}", header.degree),
        });
    }

    let body_len = poly_count * moduli.len() * degree * size_of::<u64>();
    let available = reader.len();
    if available < body_len {
        return Err(FormatError::Truncated {
            needed: HEADER_LEN + body_len,
            available: bytes.len(),
        });
    }
    if available > body_len {
        return Err(FormatError::TrailingBytes {
            extra: available - body_len,
        });
    }

    let mut polys = Vec::with_capacity(poly_count);
    for _ in 0..poly_count {
        let mut channels = Vec::with_capacity(moduli.len());
        for &modulus in &moduli {
            let mut channel = vec![0u64; degree];
            reader
                .read_u64_into::<LittleEndian>(&mut channel)
                .map_err(|_| FormatError::Truncated {
                    needed: HEADER_LEN + body_len,
                    available: bytes.len(),
                })?;
            if let Some(&value) = channel.iter().find(|&&c| c >= modulus) {
                return Err(FormatError::CoefficientOutOfRange { value, modulus });
            }
            channels.push(channel);
        }
        polys.push(channels);
    }

    Ok(DecodedObject {
        level,
        scale,
        polys,
    })
}
