//! Vehicle intake validation. Catalog browsing and CRUD live with the
//! external catalog collaborator.

pub mod validation;
