//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `replay` | Replay a recorded edit session against a feed dump |
//! | `attribute` | Attribute a commit's diff against a resolved corpus |
//! | `hash` | Print the content digest for one `(file, op, content)` |
//!
//! # Example Usage
//!
//! ```bash
//! # Replay a session and write the resolved corpus
//! linetrace replay --events session.json --feed feed.json --corpus-out corpus.json
//!
//! # Attribute the latest commit
//! linetrace attribute --repo . --rev HEAD --corpus corpus.json
//!
//! # Inspect a digest
//! linetrace hash --file src/main.ts --operation + "const x = 1;"
//! ```

mod attribute;
mod replay;

pub use attribute::cmd_attribute;
pub use replay::cmd_replay;
