pub mod error;
pub use error::WindowError;

mod record;
pub use record::WindowRecord;

mod vcf_window;
pub use vcf_window::VcfWindow;

mod restricted_window;
pub use restricted_window::RestrictedVcfWindow;
