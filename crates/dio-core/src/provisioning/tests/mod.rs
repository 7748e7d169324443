// Provisioning test module
#[cfg(test)]
mod condition_tests;
#[cfg(test)]
mod queue_tests;
