mod asset_record;
mod county;
mod cpu_spec;
mod entry;
mod facility;

pub use asset_record::*;
pub use county::*;
pub use cpu_spec::*;
pub use entry::*;
pub(crate) use entry::{bounded, required};
pub use facility::*;
