//! Page assembly, form validation and delete integrity over a [`crate::store::CatalogStore`].

mod assembly;
pub mod forms;
mod integrity;
pub mod validation;

pub use assembly::{
    AuthorDetail, BookChoices, BookDetail, BookListEntry, CopyView, Dashboard, GenreChoice,
    GenreDetail, ViewAssembly,
};
pub use forms::{AuthorForm, BookForm, BookInstanceForm, GenreForm, Rejected};
pub use integrity::IntegrityGuard;
pub use validation::{FieldError, FieldErrors};
