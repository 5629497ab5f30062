pub mod join_to_create;
