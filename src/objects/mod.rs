//! Object CRUD and batch handlers

pub mod batch;
pub mod crud;

pub use crud::CrudHandler;
