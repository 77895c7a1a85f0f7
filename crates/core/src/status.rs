//! Document-level validity tracking.
//!
//! Well-formedness (the bytes obey the base grammar) is strictly
//! stronger than validity (the document additionally obeys semantic
//! constraints). Both flags start true and can only be downgraded.

use serde::Serialize;

/// Sink for validity downgrades.
///
/// The engine only ever writes these flags; it never reads them back.
pub trait ValiditySink {
    fn set_well_formed(&mut self, well_formed: bool);
    fn set_valid(&mut self, valid: bool);
}

/// Recorded validity state for one document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationStatus {
    well_formed: bool,
    valid: bool,
}

impl ValidationStatus {
    pub const fn new() -> Self {
        Self {
            well_formed: true,
            valid: true,
        }
    }

    pub const fn is_well_formed(&self) -> bool {
        self.well_formed
    }

    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for ValidationStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ValiditySink for ValidationStatus {
    fn set_well_formed(&mut self, well_formed: bool) {
        self.well_formed = self.well_formed && well_formed;
        // Validity is contingent on well-formedness.
        if !self.well_formed {
            self.valid = false;
        }
    }

    fn set_valid(&mut self, valid: bool) {
        self.valid = self.valid && valid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_is_one_way() {
        let mut status = ValidationStatus::new();
        status.set_valid(false);
        status.set_valid(true);
        assert!(!status.is_valid());
        assert!(status.is_well_formed());
    }

    #[test]
    fn losing_well_formedness_loses_validity() {
        let mut status = ValidationStatus::new();
        status.set_well_formed(false);
        assert!(!status.is_well_formed());
        assert!(!status.is_valid());
    }
}
