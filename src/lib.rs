//! Training and evaluation loop for a handwritten-text recognizer.
//!
//! The core is the dataset iteration protocol ([`data::store`],
//! [`data::cursor`]), the recognition metrics ([`ml::metrics`]) and the
//! epoch controller ([`ml::controller`]). The model and the image
//! preprocessing sit behind the traits in [`domain::traits`].

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
