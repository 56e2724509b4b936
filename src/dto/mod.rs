mod form_data;
mod requests;
mod responses;

pub use form_data::{FormData, UploadedFile};
pub use requests::*;
pub use responses::*;
