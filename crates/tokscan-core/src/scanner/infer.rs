//! Speculative identifier recovery.
//!
//! Vocabulary entries are often stored next to an integer index, but the
//! layout is not parsed, so the width and byte order are unknown. Every
//! 4-byte window in front of a token is read both ways and any value small
//! enough to be a vocabulary index is reported. The results are hints for a
//! human reader, not a mapping.

use std::fmt;

const WIDTH: usize = 4;

/// Byte order used to decode a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl Endianness {
    /// Short label used in listings
    pub fn label(self) -> &'static str {
        match self {
            Self::Little => "LE",
            Self::Big => "BE",
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A plausible token identifier found near a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentifierCandidate {
    /// Decoded value
    pub value: u32,
    /// Byte order the value was decoded with
    pub endianness: Endianness,
}

impl IdentifierCandidate {
    /// Creates a new candidate
    pub fn new(value: u32, endianness: Endianness) -> Self {
        Self { value, endianness }
    }
}

impl fmt::Display for IdentifierCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.value, self.endianness)
    }
}

/// Candidates decoded from a single 4-byte window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Neither byte order gave a plausible value
    Empty,
    /// One plausible value (or both orders agreed)
    One(IdentifierCandidate),
    /// Little-endian then big-endian
    Two(IdentifierCandidate, IdentifierCandidate),
}

impl Probe {
    /// Decodes `bytes` in both byte orders, keeping values in `1..ceiling`.
    ///
    /// A big-endian value equal to the little-endian one is dropped.
    pub fn decode(bytes: [u8; WIDTH], ceiling: u32) -> Self {
        let plausible = |value: u32| value > 0 && value < ceiling;
        let le = u32::from_le_bytes(bytes);
        let be = u32::from_be_bytes(bytes);

        let little = plausible(le).then(|| IdentifierCandidate::new(le, Endianness::Little));
        let big = (plausible(be) && be != le).then(|| IdentifierCandidate::new(be, Endianness::Big));

        match (little, big) {
            (Some(l), Some(b)) => Self::Two(l, b),
            (Some(c), None) | (None, Some(c)) => Self::One(c),
            (None, None) => Self::Empty,
        }
    }

    /// Number of candidates in the probe
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
        }
    }

    /// Returns true if the probe holds no candidates
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Iterates the candidates, little-endian first
    pub fn candidates(self) -> impl Iterator<Item = IdentifierCandidate> {
        let (first, second) = match self {
            Self::Empty => (None, None),
            Self::One(c) => (Some(c), None),
            Self::Two(l, b) => (Some(l), Some(b)),
        };
        first.into_iter().chain(second)
    }
}

/// Probes the 4 bytes at `offset`; windows past the buffer yield nothing
pub fn probe_at(data: &[u8], offset: usize, ceiling: u32) -> Probe {
    offset
        .checked_add(WIDTH)
        .and_then(|end| data.get(offset..end))
        .and_then(|window| <[u8; WIDTH]>::try_from(window).ok())
        .map_or(Probe::Empty, |bytes| Probe::decode(bytes, ceiling))
}

/// Suggests identifiers for the token at `token_offset`.
///
/// Every 4-byte window that starts within `window` bytes before the token
/// (but not before `region_start`) and ends at or before the token is
/// probed, in ascending offset order.
pub fn infer(
    data: &[u8],
    token_offset: usize,
    region_start: usize,
    window: usize,
    ceiling: u32,
) -> Vec<IdentifierCandidate> {
    let first = token_offset.saturating_sub(window).max(region_start);

    (first..token_offset)
        .filter(|&i| i + WIDTH <= token_offset)
        .flat_map(|i| probe_at(data, i, ceiling).candidates())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CEILING: u32 = 100_000;

    fn le(value: u32) -> IdentifierCandidate {
        IdentifierCandidate::new(value, Endianness::Little)
    }

    fn be(value: u32) -> IdentifierCandidate {
        IdentifierCandidate::new(value, Endianness::Big)
    }

    #[test]
    fn test_probe_little_endian_only() {
        // BE reading is 0x05000000, far above the ceiling
        assert_eq!(Probe::decode([0x05, 0, 0, 0], CEILING), Probe::One(le(5)));
    }

    #[test]
    fn test_probe_big_endian_only() {
        assert_eq!(Probe::decode([0, 0, 0, 0x01], CEILING), Probe::One(be(1)));
    }

    #[test]
    fn test_probe_both_orders() {
        // LE 0x00000100 = 256, BE 0x00010000 = 65536
        assert_eq!(
            Probe::decode([0, 0x01, 0, 0], CEILING),
            Probe::Two(le(256), be(65_536))
        );
    }

    #[test]
    fn test_probe_symmetric_bytes_reported_once() {
        let probe = Probe::decode([0, 0x01, 0x01, 0], CEILING);
        assert_eq!(probe, Probe::One(le(0x0001_0100)));
        assert_eq!(probe.len(), 1);
    }

    #[test]
    fn test_probe_rejects_zero_and_ceiling() {
        assert!(Probe::decode([0, 0, 0, 0], CEILING).is_empty());
        let at_ceiling = CEILING.to_le_bytes();
        assert_eq!(
            Probe::decode(at_ceiling, CEILING).candidates().count(),
            0
        );
        let below = (CEILING - 1).to_le_bytes();
        assert_eq!(Probe::decode(below, CEILING), Probe::One(le(CEILING - 1)));
    }

    #[test]
    fn test_probe_at_buffer_edge() {
        let data = [0x01, 0x00, 0x00];
        assert_eq!(probe_at(&data, 0, CEILING), Probe::Empty);
        assert_eq!(probe_at(&data, usize::MAX, CEILING), Probe::Empty);
    }

    #[test]
    fn test_infer_scan_order() {
        // [05 00 00 00] [00 00 00 07] then the token
        let data = [0x05, 0, 0, 0, 0, 0, 0, 0x07, 0xE2, 0x96, 0x81, b'a'];
        let ids = infer(&data, 8, 0, 8, CEILING);
        assert_eq!(ids, vec![le(5), be(7)]);
    }

    #[test]
    fn test_infer_respects_region_start() {
        let data = [0x05, 0, 0, 0, 0, 0, 0, 0x07, 0xE2, 0x96, 0x81, b'a'];
        assert_eq!(infer(&data, 8, 4, 8, CEILING), vec![be(7)]);
        assert!(infer(&data, 8, 6, 8, CEILING).is_empty());
    }

    #[test]
    fn test_infer_near_buffer_start() {
        let data = [0x09, 0, 0, 0, 0xE2, 0x96, 0x81, b'a'];
        assert_eq!(infer(&data, 4, 0, 8, CEILING), vec![le(9)]);
        assert!(infer(&data, 2, 0, 8, CEILING).is_empty());
    }

    #[test]
    fn test_infer_candidates_within_bounds() {
        let data: Vec<u8> = (0u8..=255).collect();
        for offset in 0..data.len() {
            let ids = infer(&data, offset, 0, 8, CEILING);
            assert!(ids.iter().all(|c| c.value > 0 && c.value < CEILING));
        }
    }

    #[test]
    fn test_candidate_display() {
        assert_eq!(le(42).to_string(), "42(LE)");
        assert_eq!(be(7).to_string(), "7(BE)");
    }
}
