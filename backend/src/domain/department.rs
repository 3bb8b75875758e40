//! Department data model.

/// An organizational unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i32,
    pub title: String,
    /// Id of the colonist running the department; must reference a user.
    pub chief: i32,
    /// Member ids, ascending. Deliberately unvalidated references.
    pub members: Vec<i32>,
    pub email: String,
}

/// Input for creating or fully replacing a department. The browser edit form
/// submits every field, so departments use whole-record updates rather than
/// a patch type.
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub title: String,
    pub chief: i32,
    pub members: Vec<i32>,
    pub email: String,
}
