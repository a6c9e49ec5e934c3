use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// How a display backend numbers its rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformEncoding {
    /// Mutter / Wayland transforms, `0..=3`.
    Ordinal,
    /// RandR rotation bits, `1, 2, 4, 8`. Stored profiles use this one.
    Bitmask,
}

const BITMASK_CODES: [u32; 4] = [1, 2, 4, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum Rotation {
    #[default]
    Normal = 0,
    Left = 1,
    Inverted = 2,
    Right = 3,
}

impl Rotation {
    /// Looks up a backend code. Flipped transforms and anything else outside
    /// the four plain rotations yield `None`.
    pub fn from_code(encoding: TransformEncoding, code: u32) -> Option<Rotation> {
        match encoding {
            TransformEncoding::Ordinal => Rotation::from_u32(code),
            TransformEncoding::Bitmask => BITMASK_CODES
                .iter()
                .position(|&bit| bit == code)
                .and_then(Rotation::from_usize),
        }
    }

    pub fn from_code_or_normal(encoding: TransformEncoding, code: u32) -> Rotation {
        Self::from_code(encoding, code).unwrap_or_default()
    }

    pub fn code(self, encoding: TransformEncoding) -> u32 {
        let ordinal = self as usize;
        match encoding {
            TransformEncoding::Ordinal => ordinal as u32,
            TransformEncoding::Bitmask => BITMASK_CODES[ordinal],
        }
    }

    /// Re-expresses a code from one vocabulary in another.
    pub fn translate(code: u32, from: TransformEncoding, to: TransformEncoding) -> u32 {
        Self::from_code_or_normal(from, code).code(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_and_ordinal_map_onto_each_other() {
        for (ordinal, bit) in [(0, 1), (1, 2), (2, 4), (3, 8)] {
            assert_eq!(
                Rotation::translate(ordinal, TransformEncoding::Ordinal, TransformEncoding::Bitmask),
                bit
            );
            assert_eq!(
                Rotation::translate(bit, TransformEncoding::Bitmask, TransformEncoding::Ordinal),
                ordinal
            );
        }
    }

    #[test]
    fn unknown_codes_fall_back_to_normal() {
        assert_eq!(Rotation::from_code(TransformEncoding::Bitmask, 0), None);
        assert_eq!(Rotation::from_code(TransformEncoding::Ordinal, 5), None);
        assert_eq!(
            Rotation::from_code_or_normal(TransformEncoding::Bitmask, 3),
            Rotation::Normal
        );
        assert_eq!(
            Rotation::translate(6, TransformEncoding::Ordinal, TransformEncoding::Bitmask),
            1
        );
    }

    #[test]
    fn inverted_is_the_third_rotation() {
        assert_eq!(
            Rotation::from_code(TransformEncoding::Bitmask, 4),
            Some(Rotation::Inverted)
        );
        assert_eq!(Rotation::Inverted.code(TransformEncoding::Ordinal), 2);
    }
}
