//! Use-case services over the repository layer.

pub mod question_service;
