/*!

A "logger" used when the `logging` feature is disabled. It writes nothing anywhere but keeps the
public API and the `log` crate's max level in sync.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        let most_verbose = self
            .module_configurations
            .values()
            .map(|module_config| module_config.level)
            .fold(self.global_log_level, std::cmp::max);
        log::set_max_level(most_verbose);
    }
}
