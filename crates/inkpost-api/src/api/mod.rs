// Public API surface: error taxonomy, response envelope, validation gate,
// and resource routes

pub mod categories;
pub mod common;
pub mod error;
pub mod posts;
pub mod validation;
