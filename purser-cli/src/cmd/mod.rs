pub mod copy;
pub mod delete;
pub mod drift;
pub mod export;
pub mod mirror_drift;
pub mod put;
pub mod redact;
pub mod run;
pub mod show;
