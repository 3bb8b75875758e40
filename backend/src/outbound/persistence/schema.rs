//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the embedded migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Colonist accounts.
    users (id) {
        id -> Integer,
        surname -> Text,
        name -> Text,
        age -> Integer,
        position -> Text,
        speciality -> Text,
        address -> Text,
        email -> Text,
        city_from -> Nullable<Text>,
        hashed_password -> Text,
        is_admin -> Bool,
        modified_date -> Timestamp,
    }
}

diesel::table! {
    /// Assigned work units.
    jobs (id) {
        id -> Integer,
        team_leader -> Integer,
        job -> Text,
        work_size -> Integer,
        start_date -> Timestamp,
        end_date -> Nullable<Timestamp>,
        is_finished -> Bool,
    }
}

diesel::table! {
    /// Organizational units.
    departments (id) {
        id -> Integer,
        title -> Text,
        chief -> Integer,
        email -> Text,
    }
}

diesel::table! {
    /// Named job tags; names are unique.
    categories (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    /// Jobs-to-categories junction; membership only, set semantics.
    job_categories (job_id, category_id) {
        job_id -> Integer,
        category_id -> Integer,
    }
}

diesel::table! {
    /// Jobs-to-collaborator-ids junction. The user side carries no
    /// foreign key; collaborator ids may outlive their accounts.
    job_collaborators (job_id, user_id) {
        job_id -> Integer,
        user_id -> Integer,
    }
}

diesel::table! {
    /// Departments-to-member-ids junction; same unvalidated user side.
    department_members (department_id, user_id) {
        department_id -> Integer,
        user_id -> Integer,
    }
}

diesel::joinable!(jobs -> users (team_leader));
diesel::joinable!(departments -> users (chief));
diesel::joinable!(job_categories -> jobs (job_id));
diesel::joinable!(job_categories -> categories (category_id));
diesel::joinable!(job_collaborators -> jobs (job_id));
diesel::joinable!(department_members -> departments (department_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    jobs,
    departments,
    categories,
    job_categories,
    job_collaborators,
    department_members,
);
