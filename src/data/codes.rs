//! Stable integer codes for enums written to settings files.
//!
//! Codes come from an explicit table per enum, never from declaration order,
//! so variants may be reordered without breaking stored files.

use crate::error::{Result, ScopeError};

pub trait PersistedCode: Copy + PartialEq + std::fmt::Debug + 'static {
    const KIND: &'static str;
    const TABLE: &'static [(Self, i64)];

    fn code(self) -> i64 {
        Self::TABLE
            .iter()
            .find(|(variant, _)| *variant == self)
            .map(|(_, code)| *code)
            .unwrap_or_else(|| unreachable!("{:?} missing from {} code table", self, Self::KIND))
    }

    fn from_code(code: i64) -> Result<Self> {
        Self::TABLE
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(variant, _)| *variant)
            .ok_or_else(|| ScopeError::invariant(format!("unknown {} code {code}", Self::KIND)))
    }
}
