// Service layer: page assembly on top of the domain modules.
// Each page returns a tagged result (`success` / `empty` / `error`) so the
// CLI can print it or serialize it with --json.

pub mod dashboard;
pub mod evaluations;
