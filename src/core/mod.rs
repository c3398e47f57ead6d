pub mod browser;
pub mod exclusion;
pub mod expansion;
pub mod targets;
pub mod traversal;

#[cfg(test)]
pub mod fake_host;
