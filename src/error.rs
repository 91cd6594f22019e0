use thiserror::Error;

/// A required selection or field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no workshop selected")]
    MissingWorkshop,
    #[error("no date selected")]
    MissingDate,
    #[error("full name is required")]
    EmptyName,
    #[error("workshop name is required")]
    EmptyWorkshopName,
}
