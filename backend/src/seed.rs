//! Demo roster fixture.
//!
//! Seeds the settlement roster the application shipped with: six colonists,
//! one job, one department, and the three stock categories. Runs only when
//! the user table is empty, so restarts are idempotent.

use tracing::info;

use crate::domain::ports::{
    CategoryRepository, CategoryStoreError, DepartmentRepository, DepartmentStoreError,
    JobRepository, JobStoreError, UserRepository, UserStoreError,
};
use crate::domain::{Error, NewDepartment, NewJob, NewUser, password};

/// Fixture password shared by every seeded colonist.
const FIXTURE_PASSWORD: &str = "hash123";

const CATEGORY_NAMES: [&str; 3] = ["Construction", "Research", "Maintenance"];

/// Failures while applying the fixture.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seeding users failed: {0}")]
    Users(#[from] UserStoreError),
    #[error("seeding jobs failed: {0}")]
    Jobs(#[from] JobStoreError),
    #[error("seeding departments failed: {0}")]
    Departments(#[from] DepartmentStoreError),
    #[error("seeding categories failed: {0}")]
    Categories(#[from] CategoryStoreError),
    #[error(transparent)]
    Password(#[from] Error),
}

struct Colonist {
    id: i32,
    surname: &'static str,
    name: &'static str,
    age: i32,
    position: &'static str,
    speciality: &'static str,
    address: &'static str,
    email: &'static str,
    city_from: &'static str,
    is_admin: bool,
}

const COLONISTS: [Colonist; 6] = [
    Colonist {
        id: 1,
        surname: "Scott",
        name: "Ridley",
        age: 21,
        position: "captain",
        speciality: "research engineer",
        address: "module_1",
        email: "scott_chief@mars.org",
        city_from: "London",
        is_admin: true,
    },
    Colonist {
        id: 2,
        surname: "Theslave",
        name: "Gael",
        age: 25,
        position: "middle engineer",
        speciality: "biotech engineer",
        address: "module_2",
        email: "111@mars.com",
        city_from: "New York",
        is_admin: false,
    },
    Colonist {
        id: 3,
        surname: "Eater",
        name: "Oldrik",
        age: 30,
        position: "geologist",
        speciality: "geologist",
        address: "module_1",
        email: "222@mars.com",
        city_from: "Moscow",
        is_admin: false,
    },
    Colonist {
        id: 4,
        surname: "Gigant",
        name: "Yourm",
        age: 17,
        position: "assistant",
        speciality: "technician",
        address: "module_1",
        email: "333@mars.com",
        city_from: "Paris",
        is_admin: false,
    },
    Colonist {
        id: 5,
        surname: "Fireceper",
        name: "Cute",
        age: 35,
        position: "chief scientist",
        speciality: "astrobiologist",
        address: "module_3",
        email: "444@mars.com",
        city_from: "Tokyo",
        is_admin: false,
    },
    Colonist {
        id: 6,
        surname: "Blackfire",
        name: "Fride",
        age: 28,
        position: "pilot",
        speciality: "aviation engineer",
        address: "module_1",
        email: "555@mars.com",
        city_from: "Sydney",
        is_admin: false,
    },
];

/// Apply the fixture when the store is empty. Returns whether anything was
/// seeded.
pub async fn seed_if_empty(
    users: &dyn UserRepository,
    jobs: &dyn JobRepository,
    departments: &dyn DepartmentRepository,
    categories: &dyn CategoryRepository,
) -> Result<bool, SeedError> {
    if users.count().await? > 0 {
        return Ok(false);
    }

    // Every colonist shares the fixture password; hash it once.
    let hashed_password = password::hash_password(FIXTURE_PASSWORD)?;
    for colonist in &COLONISTS {
        users
            .insert(NewUser {
                id: Some(colonist.id),
                surname: colonist.surname.to_owned(),
                name: colonist.name.to_owned(),
                age: colonist.age,
                position: colonist.position.to_owned(),
                speciality: colonist.speciality.to_owned(),
                address: colonist.address.to_owned(),
                email: colonist.email.to_owned(),
                city_from: Some(colonist.city_from.to_owned()),
                hashed_password: hashed_password.clone(),
                is_admin: colonist.is_admin,
            })
            .await?;
    }

    for name in CATEGORY_NAMES {
        categories.find_or_create(name).await?;
    }

    jobs.insert(NewJob {
        id: Some(1),
        team_leader: 1,
        job: "deployment of residential modules 1 and 2".to_owned(),
        work_size: 15,
        collaborators: vec![2, 3],
        start_date: None,
        end_date: None,
        is_finished: false,
        categories: vec!["Construction".to_owned()],
    })
    .await?;

    departments
        .insert(NewDepartment {
            title: "Geological Survey".to_owned(),
            chief: 3,
            members: vec![2, 3, 5],
            email: "geology@mars.org".to_owned(),
        })
        .await?;

    info!("seeded demo roster");
    Ok(true)
}
