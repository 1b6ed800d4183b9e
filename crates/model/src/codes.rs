//! Integer wire codes for the rule enumerations.
//!
//! Stored rules carry every enumeration as a bare integer. Decoding an
//! integer that names no variant fails with [`UnknownCode`]; codes are never
//! silently mapped to a fallback variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored integer that does not name a variant of the target enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i64,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code {}", self.kind, self.code)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! wire_codes {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The integer this variant is stored as.
            pub const fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl TryFrom<i64> for $name {
            type Error = UnknownCode;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(UnknownCode { kind: $label, code }),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value.code()
            }
        }
    };
}

wire_codes! {
    /// Selects how both sides of a condition are resolved and compared.
    ConditionKind("condition kind") {
        DayOfWeek = 0,
        Date = 1,
        String = 2,
        Integer = 3,
        /// Always satisfied; used as a filler condition.
        AlwaysTrue = 4,
    }
}

wire_codes! {
    /// Condition comparator.
    Comparator("comparator") {
        Equal = 0,
        Greater = 1,
        Less = 2,
        GreaterOrEqual = 3,
        LessOrEqual = 4,
        In = 5,
        NotEqual = 6,
        /// Reserved. No condition kind assigns it a meaning.
        Package = 7,
        NotIn = 8,
    }
}

wire_codes! {
    /// How a condition or modifier side string is interpreted.
    SideKind("side kind") {
        /// The side names a field of the target record.
        Field = 102,
        /// The side is a literal value.
        Value = 118,
        /// The side is a literal JSON-encoded complex value (modifier right sides only).
        Complex = 99,
    }
}

wire_codes! {
    /// Modifier operand.
    Operand("operand") {
        Set = 0,
        Add = 1,
        Sub = 2,
        Multiply = 3,
        Divide = 4,
        Select = 5,
        Sum = 6,
    }
}

wire_codes! {
    /// Modifier data type. `Jump` and `JumpReturn` are control transfers.
    DataType("data type") {
        String = 0,
        Integer = 1,
        Jump = 90,
        JumpReturn = 91,
    }
}

wire_codes! {
    /// Pricing step a rule setting belongs to, stored in `rule_type`.
    ///
    /// Only used for filtering by authoring tools; the evaluator never
    /// consults it.
    RuleSettingStep("rule setting step") {
        Base = 0,
        RoomType = 1,
        Season = 2,
        Occupancy = 3,
        Package = 4,
        Dc = 5,
        Promo = 6,
    }
}

impl Comparator {
    /// True for `In` and `NotIn`, whose right side is a comma-separated list.
    pub fn is_membership(self) -> bool {
        matches!(self, Comparator::In | Comparator::NotIn)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_kind_codes_are_ascii_letters() {
        assert_eq!(SideKind::Field.code(), b'f' as i64);
        assert_eq!(SideKind::Value.code(), b'v' as i64);
        assert_eq!(SideKind::Complex.code(), b'c' as i64);
    }

    #[test]
    fn jump_codes() {
        assert_eq!(DataType::try_from(90), Ok(DataType::Jump));
        assert_eq!(DataType::try_from(91), Ok(DataType::JumpReturn));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = Comparator::try_from(42).unwrap_err();
        assert_eq!(err.code, 42);
        assert_eq!(err.to_string(), "unknown comparator code 42");
    }

    #[test]
    fn serde_uses_integer_codes() {
        let json = serde_json::to_string(&Comparator::NotIn).unwrap();
        assert_eq!(json, "8");
        let back: Comparator = serde_json::from_str("3").unwrap();
        assert_eq!(back, Comparator::GreaterOrEqual);
        assert!(serde_json::from_str::<Operand>("7").is_err());
    }

    #[test]
    fn membership_comparators() {
        assert!(Comparator::In.is_membership());
        assert!(Comparator::NotIn.is_membership());
        assert!(!Comparator::NotEqual.is_membership());
        assert!(!Comparator::Package.is_membership());
    }
}
