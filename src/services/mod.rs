pub mod derive;
pub mod posters;
pub mod providers;
