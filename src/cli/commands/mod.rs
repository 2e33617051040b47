pub mod forecast;
pub mod rule;
pub mod system;
pub mod transaction;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(transaction::definitions())
        .chain(rule::definitions())
        .chain(forecast::definitions())
    {
        registry.register(entry);
    }
}
