//! Embedded Tera templates.
//!
//! Templates are compiled into the binary with `include_str!` so the server
//! has no runtime dependency on a template directory.

use tera::Tera;

use crate::domain::Error;

/// Build the template registry. Fails only when a template itself is
/// malformed, which is a packaging error rather than a runtime condition.
pub fn build_templates() -> Result<Tera, Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../../../templates/base.html")),
        ("index.html", include_str!("../../../../templates/index.html")),
        ("login.html", include_str!("../../../../templates/login.html")),
        (
            "register.html",
            include_str!("../../../../templates/register.html"),
        ),
        (
            "add_job.html",
            include_str!("../../../../templates/add_job.html"),
        ),
        (
            "edit_job.html",
            include_str!("../../../../templates/edit_job.html"),
        ),
        (
            "departments.html",
            include_str!("../../../../templates/departments.html"),
        ),
        (
            "add_department.html",
            include_str!("../../../../templates/add_department.html"),
        ),
        (
            "edit_department.html",
            include_str!("../../../../templates/edit_department.html"),
        ),
        (
            "users_show.html",
            include_str!("../../../../templates/users_show.html"),
        ),
    ])
    .map_err(|error| Error::internal(format!("invalid embedded template: {error}")))?;
    Ok(tera)
}
