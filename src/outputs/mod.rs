//! Output planning and writing.
//!
//! # Submodules
//!
//! - [`filename`]: derives a filesystem-safe `.md` name from a result
//! - [`plan`]: decides between stdout, one file, or one file per result
//! - [`write`]: carries out the plan once the batch has settled
//!
//! # Output Layouts
//!
//! ```text
//! article_batch URL                      # content on stdout
//! article_batch URL -o out.md            # out.md (raw content)
//! article_batch -u urls.txt -o all.md    # all.md (combined document)
//! article_batch -u urls.txt -o           # <title-slug>.md per article
//! ```

pub mod filename;
pub mod plan;
pub mod write;

pub use plan::plan;
pub use write::execute;
