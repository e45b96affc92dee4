pub mod builtin;
pub mod schema;
pub mod store;

pub use builtin::default_catalog;
pub use schema::{
    Catalog, Course, Institution, InstitutionType, InstitutionTypeParseError, RequirementSet,
    SubjectKey, SubjectKeyParseError,
};
pub use store::{load_catalog, write_catalog};
