pub mod loan;
pub mod optimise;
pub mod schedule;
