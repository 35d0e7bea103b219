//! Complexity scoring
//!
//! A node starts with a static score derived from its declaration and, once
//! every edge exists, gains a connectivity bonus in which each dependent
//! counts twice.

use crate::models::{Declaration, DeclarationKind};

const CLASS_BASE: u32 = 5;
const CALLABLE_BASE: u32 = 3;
const PROPERTY_BASE: u32 = 2;
const DEFAULT_BASE: u32 = 1;

const ABSTRACT_BONUS: u32 = 2;
const STATIC_BONUS: u32 = 1;
const DEPENDENT_WEIGHT: u32 = 2;

/// Score from the declaration alone, evaluated at node creation
pub fn static_score(decl: &Declaration) -> u32 {
    match decl.kind {
        DeclarationKind::Class => CLASS_BASE + if decl.is_abstract { ABSTRACT_BONUS } else { 0 },
        DeclarationKind::Function | DeclarationKind::Method => {
            let mut score = CALLABLE_BASE + decl.parameters.len() as u32;
            if decl.is_static {
                score += STATIC_BONUS;
            }
            if decl.is_abstract {
                score += ABSTRACT_BONUS;
            }
            score
        }
        DeclarationKind::Property => PROPERTY_BASE + if decl.is_static { STATIC_BONUS } else { 0 },
        DeclarationKind::Constant => DEFAULT_BASE,
    }
}

/// Bonus added after edge building: fan-out plus double fan-in
pub fn connectivity_bonus(dependencies: usize, dependents: usize) -> u32 {
    dependencies as u32 + DEPENDENT_WEIGHT * dependents as u32
}
