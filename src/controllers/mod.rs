pub mod extract;
pub mod health;
pub mod jobs;
pub mod legacy;
