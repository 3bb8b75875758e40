//! Category data model.

/// A named job tag. Names are unique; categories referenced by name are
/// created on first use (find-or-create).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub name: String,
}
