// Conflict Prompt Port
//
// The resolver's only side-effecting dependency besides the entity client.
// Must be synchronous and return one of the offered option indices, or
// `None` for cancel. This indirection lets the same resolver serve any
// front end.

pub trait ConflictPrompt: Send + Sync {
    /// Ask the user to pick one of `options`; `None` means cancel.
    fn ask(&self, message: &str, options: &[&str]) -> Option<usize>;
}
