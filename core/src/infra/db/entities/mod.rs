//! Database entities

pub mod collar_animal_assignment;
