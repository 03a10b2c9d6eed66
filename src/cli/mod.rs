pub mod exclude;
