pub mod file_validation;
pub mod lightbox;
pub mod normalize;

pub use file_validation::{
    format_file_size, AcceptSpec, FileReport, FileSelection, FileStatus, FileValidator,
    SelectableFile,
};
pub use lightbox::{categories, filter_by_category, Categorized, Lightbox, LightboxKey};
pub use normalize::{loosely_equal, normalize_text, slugify, strip_accents};
